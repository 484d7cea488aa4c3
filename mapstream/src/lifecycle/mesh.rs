//! Hand-off to the tile-to-mesh stage.

use std::sync::Arc;

use crate::coord::TileCoord;
use crate::height::ElevationPayload;
use crate::vector::VectorFeatureCollection;

/// Consumer of finished tile data.
///
/// Called on the update path once a tile's elevation claims and vector
/// features are both available. The returned payload is owned by the tile
/// and dropped on eviction.
pub trait MeshStage {
    type Payload;

    fn build(
        &self,
        coord: TileCoord,
        features: VectorFeatureCollection,
        heights: &[Arc<ElevationPayload>],
    ) -> Self::Payload;
}

/// Raw data of a loaded tile, for consumers that do their own meshing.
#[derive(Debug, Clone)]
pub struct TileData {
    pub features: VectorFeatureCollection,
    pub heights: Vec<Arc<ElevationPayload>>,
}

/// Mesh stage that keeps the raw tile data as the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainTileData;

impl MeshStage for RetainTileData {
    type Payload = TileData;

    fn build(
        &self,
        _coord: TileCoord,
        features: VectorFeatureCollection,
        heights: &[Arc<ElevationPayload>],
    ) -> TileData {
        TileData {
            features,
            heights: heights.to_vec(),
        }
    }
}
