//! OSM element graph resolution.
//!
//! Providers return flat element lists (nodes, ways, relations). This
//! module dereferences them into an [`OsmGraph`] and runs the element
//! handlers to produce a [`VectorFeatureCollection`](crate::vector::VectorFeatureCollection).
//!
//! Missing references never abort resolution: an unresolved way node is
//! dropped from the way's vertices and an unresolved relation member is
//! skipped.

mod classify;
mod elements;
mod graph;
mod handlers;
mod resolver;
mod rings;
pub mod tags;

pub use classify::{area_descriptor, building_attributes, node_descriptor, polyline_descriptor};
pub use elements::{merge_element_sets, ElementSet, MemberKind, OsmElement, RelationMember};
pub use graph::{GraphMember, GraphNode, GraphRelation, GraphWay, MemberTarget, OsmGraph, WayMembership};
pub use resolver::OsmGraphResolver;
pub use rings::assemble_rings;
pub use tags::Tags;
