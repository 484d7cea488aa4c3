//! Vector features and multi-provider aggregation.
//!
//! Features are expressed in meters relative to the owning tile's
//! south-west corner. The [`VectorFeatureAggregator`] produces the final,
//! immutable [`VectorFeatureCollection`] handed to the tile-to-mesh stage.

mod aggregator;
mod descriptors;
mod features;
mod reconcile;

pub use aggregator::{AggregateError, ProviderFailure, VectorFeatureAggregator};
pub use descriptors::{
    AreaKind, BuildingAttributes, FacadeMaterial, IntersectionMaterial, NodeKind, PathKind,
    PathMaterial, PitchKind, PolylineKind, RoofMaterial, RoofOrientation, RoofType, Side,
    VectorAreaDescriptor, VectorNodeDescriptor, VectorPolylineDescriptor,
};
pub use features::{
    OsmElementKind, OsmReference, RingKind, VectorArea, VectorAreaRing, VectorFeature,
    VectorFeatureCollection, VectorNode, VectorPolyline,
};
pub use reconcile::{clip_authoritative, dedupe_outlines, reconcile};

#[cfg(test)]
pub(crate) use aggregator::tests::StaticProvider;
