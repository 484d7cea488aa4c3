//! Vector data provider abstraction
//!
//! This module provides the [`VectorFeatureProvider`] trait and its two
//! implementations: a graph-query provider ([`OverpassProvider`]) and a
//! keyed vector tile provider ([`VectorTileProvider`]). Both share an
//! injected [`AsyncHttpClient`].
//!
//! ```ignore
//! use mapstream::provider::{OverpassConfig, OverpassProvider, ReqwestClient};
//!
//! let http = ReqwestClient::new()?;
//! let provider = OverpassProvider::new(http, OverpassConfig::default());
//! ```

mod http;
mod overpass;
mod types;
mod vector_tile;

pub use http::{AsyncHttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use overpass::{OverpassConfig, OverpassProvider, DEFAULT_OVERPASS_URL, DEFAULT_REQUEST_MARGIN};
pub use types::{ProviderError, TileRequest, VectorFeatureProvider};
pub use vector_tile::{VectorTileConfig, VectorTileProvider};

#[cfg(test)]
pub use http::tests::{MockHttpClient, RecordedRequest};
