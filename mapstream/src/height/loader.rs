//! Elevation loader contract.

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::HeightTileKey;

/// Errors reported by an elevation loader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElevationError {
    /// The payload could not be fetched
    #[error("Elevation fetch failed: {0}")]
    Fetch(String),

    /// The payload was fetched but is unusable
    #[error("Invalid elevation payload for {key}: {reason}")]
    InvalidPayload { key: HeightTileKey, reason: String },

    /// The key lies outside the tiling at its zoom level
    #[error("Elevation tile {0} is out of range")]
    OutOfRange(HeightTileKey),
}

/// Raw height data of one elevation tile.
///
/// The encoding is owned by the elevation subsystem; this crate only moves
/// the bytes around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationPayload {
    pub key: HeightTileKey,
    pub data: Vec<u8>,
}

impl ElevationPayload {
    pub fn new(key: HeightTileKey, data: Vec<u8>) -> Self {
        Self { key, data }
    }
}

/// External elevation subsystem.
///
/// Every successful `claim` must eventually be matched by exactly one
/// `release` of the same key; failed claims are never released. The loader
/// may drop a payload once all of its claims are released.
pub trait ElevationLoader: Send + Sync {
    /// Claims an elevation tile on behalf of `owner` (a map tile's local id).
    fn claim(
        &self,
        key: HeightTileKey,
        owner: u64,
    ) -> BoxFuture<'_, Result<Arc<ElevationPayload>, ElevationError>>;

    /// Releases one earlier successful claim of `key`.
    fn release(&self, key: HeightTileKey);
}
