//! Provider types and traits

use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::TileCoord;
use crate::vector::VectorFeatureCollection;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Endpoint answered but the payload was unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Zoom level not supported by this provider
    #[error("Zoom level {0} not supported by provider")]
    UnsupportedZoom(u8),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderSpecific(String),
}

/// A request for the vector features of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRequest {
    pub coord: TileCoord,
    pub zoom: u8,
}

impl TileRequest {
    pub fn new(coord: TileCoord, zoom: u8) -> Self {
        Self { coord, zoom }
    }
}

/// Trait for vector feature sources.
///
/// Implementors fetch raw map data for a tile from a remote endpoint and
/// extract features from it. Feature positions are in meters relative to the
/// tile's south-west corner.
///
/// The trait is dyn-compatible so an aggregator can hold a heterogeneous
/// list of providers.
pub trait VectorFeatureProvider: Send + Sync {
    /// Fetches and extracts the features of one tile.
    ///
    /// # Arguments
    ///
    /// * `request` - Tile coordinate and zoom level
    ///
    /// # Returns
    ///
    /// The tile's features or an error.
    fn get_collection(
        &self,
        request: TileRequest,
    ) -> BoxFuture<'_, Result<VectorFeatureCollection, ProviderError>>;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}
