//! Resident tile state.

use std::sync::Arc;

use thiserror::Error;

use crate::coord::{HeightTileKey, TileCoord};
use crate::height::{ElevationPayload, HeightClaimError};
use crate::vector::AggregateError;

/// Why a tile failed to load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// One or more elevation claims failed
    #[error("Elevation dependencies failed: {0}")]
    Heights(#[from] HeightClaimError),

    /// One or more vector providers failed
    #[error("Vector features failed: {0}")]
    Features(#[from] AggregateError),

    /// A load task ended without reporting, e.g. by panicking
    #[error("Load task aborted: {0}")]
    Aborted(String),
}

/// Load progress of a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Elevation claims or feature fetch still in flight.
    Pending,
    /// Payload built.
    Loaded,
    /// Load failed; the tile keeps its slot until evicted.
    Failed(LoadError),
}

/// A resident map tile.
#[derive(Debug)]
pub struct Tile<P> {
    pub(crate) coord: TileCoord,
    pub(crate) local_id: u64,
    pub(crate) in_frustum: bool,
    pub(crate) distance: f64,
    pub(crate) state: LoadState,
    pub(crate) height_claims: Vec<HeightTileKey>,
    pub(crate) heights: Vec<Arc<ElevationPayload>>,
    pub(crate) payload: Option<P>,
}

impl<P> Tile<P> {
    pub(crate) fn new(coord: TileCoord, local_id: u64) -> Self {
        Self {
            coord,
            local_id,
            in_frustum: true,
            distance: 0.0,
            state: LoadState::Pending,
            height_claims: Vec::new(),
            heights: Vec::new(),
            payload: None,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Identifier unique over the manager's lifetime. A coordinate that is
    /// evicted and admitted again gets a new id.
    pub fn local_id(&self) -> u64 {
        self.local_id
    }

    pub fn in_frustum(&self) -> bool {
        self.in_frustum
    }

    /// Ground distance from the camera to the tile center, in meters, as of
    /// the last update.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }

    /// Elevation tiles this tile holds an unreleased claim on.
    pub fn height_claims(&self) -> &[HeightTileKey] {
        &self.height_claims
    }

    /// Built payload, present once loaded.
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }
}
