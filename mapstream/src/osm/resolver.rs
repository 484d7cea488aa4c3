//! Raw element list to vector features.

use glam::DVec2;
use tracing::debug;

use super::elements::OsmElement;
use super::graph::OsmGraph;
use super::handlers::{node_features, relation_features, way_features};
use crate::coord::{tile_origin_meters, TileCoord};
use crate::vector::VectorFeatureCollection;

/// Turns the raw elements of one fetch into typed vector features.
///
/// Output order is all node-derived features, then way-derived, then
/// relation-derived, each group in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsmGraphResolver;

impl OsmGraphResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves elements for a tile, positioning features relative to the
    /// tile's south-west corner.
    pub fn resolve_tile(
        &self,
        elements: &[OsmElement],
        tile: TileCoord,
        zoom: u8,
    ) -> VectorFeatureCollection {
        self.resolve(elements, tile_origin_meters(tile, zoom))
    }

    /// Resolves elements relative to an arbitrary world origin.
    pub fn resolve(&self, elements: &[OsmElement], origin: DVec2) -> VectorFeatureCollection {
        let graph = OsmGraph::build(elements, origin);
        let mut collection = VectorFeatureCollection::new();

        collection.extend(graph.nodes().iter().flat_map(node_features));
        collection.extend(graph.ways().iter().flat_map(way_features));
        collection.extend((0..graph.relations().len()).flat_map(|i| relation_features(&graph, i)));

        debug!(
            elements = elements.len(),
            nodes = collection.nodes.len(),
            polylines = collection.polylines.len(),
            areas = collection.areas.len(),
            "Resolved element graph"
        );
        collection
    }
}
