//! Overpass graph-query provider.
//!
//! Fetches the nodes, ways and multipolygon/building relations inside a
//! tile's bounding box (slightly enlarged so features crossing the tile edge
//! are complete) and resolves them into vector features.
//!
//! When a cached tile server is configured it is tried first; any failure
//! there falls back to a live Overpass query.

use std::collections::HashSet;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::types::{ProviderError, TileRequest, VectorFeatureProvider};
use crate::coord::{tile_to_degrees, validate_zoom, TileCoord};
use crate::osm::{merge_element_sets, ElementSet, MemberKind, OsmElement, OsmGraphResolver};
use crate::vector::VectorFeatureCollection;

/// Default public Overpass endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default bounding box margin, in tiles.
pub const DEFAULT_REQUEST_MARGIN: f64 = 0.05;

/// Server-side query timeout, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 30;

/// Overpass provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassConfig {
    /// Overpass interpreter endpoint.
    pub url: String,
    /// Cached tile server base URL, queried as `{tile_server}/tile/{x}/{y}`.
    pub tile_server: Option<String>,
    /// Whether to try the cached tile server first.
    pub use_cached_tiles: bool,
    /// Bounding box margin around the tile, in tiles.
    pub request_margin: f64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            tile_server: None,
            use_cached_tiles: false,
            request_margin: DEFAULT_REQUEST_MARGIN,
        }
    }
}

/// Graph-query vector feature provider.
pub struct OverpassProvider<C: AsyncHttpClient> {
    http: C,
    config: OverpassConfig,
    resolver: OsmGraphResolver,
}

impl<C: AsyncHttpClient> OverpassProvider<C> {
    /// Creates a new Overpass provider.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client used for all requests
    /// * `config` - Endpoint and query settings
    pub fn new(http: C, config: OverpassConfig) -> Self {
        Self {
            http,
            config,
            resolver: OsmGraphResolver::new(),
        }
    }

    /// Builds the bounding-box query for a tile.
    pub fn tile_query(&self, coord: TileCoord, zoom: u8) -> String {
        let m = self.config.request_margin;
        let south_west = tile_to_degrees(coord.x as f64 - m, (coord.y + 1) as f64 + m, zoom);
        let north_east = tile_to_degrees((coord.x + 1) as f64 + m, coord.y as f64 - m, zoom);
        let bbox = format!(
            "{},{},{},{}",
            south_west.lat, south_west.lon, north_east.lat, north_east.lon
        );

        format!(
            "[out:json][timeout:{timeout}];\n\
             (\n\
             \x20 node({bbox});\n\
             \x20 way({bbox});\n\
             \x20 rel[\"type\"~\"^(multipolygon|building)\"]({bbox});\n\
             );\n\
             out body qt;\n\
             >>;\n\
             out body qt;\n",
            timeout = QUERY_TIMEOUT_SECS,
            bbox = bbox
        )
    }

    /// Builds a query fetching relations by id together with everything they
    /// reference.
    pub fn relations_query(ids: &[i64]) -> String {
        let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
        format!(
            "[out:json][timeout:{}];\n(\n  rel(id:{});\n  >>;\n);\nout body;\n",
            QUERY_TIMEOUT_SECS,
            ids.join(",")
        )
    }

    fn parse(body: &[u8]) -> Result<ElementSet, ProviderError> {
        let set: ElementSet = serde_json::from_slice(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Malformed element JSON: {}", e)))?;
        match set.reported_error() {
            Some(error) => Err(ProviderError::ProviderSpecific(error)),
            None => Ok(set),
        }
    }

    async fn fetch_cached(&self, coord: TileCoord) -> Option<ElementSet> {
        if !self.config.use_cached_tiles {
            return None;
        }
        let server = self.config.tile_server.as_deref()?;
        let url = format!("{}/tile/{}/{}", server.trim_end_matches('/'), coord.x, coord.y);

        match self.http.get(&url).await.and_then(|body| Self::parse(&body)) {
            Ok(set) => Some(set),
            Err(e) => {
                debug!(tile = %coord, error = %e, "Cached tile unavailable, querying Overpass");
                None
            }
        }
    }

    /// Fetches the raw elements of a tile.
    pub async fn fetch_elements(
        &self,
        coord: TileCoord,
        zoom: u8,
    ) -> Result<ElementSet, ProviderError> {
        if let Some(set) = self.fetch_cached(coord).await {
            return Ok(set);
        }

        let body = self.http.post(&self.config.url, self.tile_query(coord, zoom)).await?;
        let set = Self::parse(&body)?;
        Ok(self.complete_nested_relations(set).await)
    }

    /// Fetches relations referenced as members but missing from `set`, and
    /// merges them in. Failures keep the original set.
    async fn complete_nested_relations(&self, set: ElementSet) -> ElementSet {
        let present: HashSet<i64> = set
            .elements
            .iter()
            .filter_map(|e| match e {
                OsmElement::Relation { id, .. } => Some(*id),
                _ => None,
            })
            .collect();

        let mut missing: Vec<i64> = set
            .elements
            .iter()
            .filter_map(|e| match e {
                OsmElement::Relation { members, .. } => Some(members),
                _ => None,
            })
            .flatten()
            .filter(|m| m.kind == MemberKind::Relation && !present.contains(&m.id))
            .map(|m| m.id)
            .collect();
        missing.sort_unstable();
        missing.dedup();

        if missing.is_empty() {
            return set;
        }

        let patch = self
            .http
            .post(&self.config.url, Self::relations_query(&missing))
            .await
            .and_then(|body| Self::parse(&body));

        match patch {
            Ok(patch) => merge_element_sets(set, patch),
            Err(e) => {
                warn!(relations = missing.len(), error = %e, "Failed to fetch nested relations");
                set
            }
        }
    }
}

impl<C: AsyncHttpClient> VectorFeatureProvider for OverpassProvider<C> {
    fn get_collection(
        &self,
        request: TileRequest,
    ) -> BoxFuture<'_, Result<VectorFeatureCollection, ProviderError>> {
        Box::pin(async move {
            validate_zoom(request.zoom).map_err(|_| ProviderError::UnsupportedZoom(request.zoom))?;
            let set = self.fetch_elements(request.coord, request.zoom).await?;
            Ok(self
                .resolver
                .resolve_tile(&set.elements, request.coord, request.zoom))
        })
    }

    fn name(&self) -> &str {
        "overpass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockHttpClient;

    const TREE_TILE: &str = r#"{"elements": [
        {"type": "node", "id": 1, "lat": 0.0001, "lon": 0.0001, "tags": {"natural": "tree"}}
    ]}"#;

    fn config(cached: bool) -> OverpassConfig {
        OverpassConfig {
            url: "http://overpass.test/api".into(),
            tile_server: Some("http://tiles.test/".into()),
            use_cached_tiles: cached,
            request_margin: DEFAULT_REQUEST_MARGIN,
        }
    }

    fn request() -> TileRequest {
        TileRequest::new(TileCoord::new(32768, 32767), 16)
    }

    #[test]
    fn test_query_bbox_includes_margin() {
        let provider = OverpassProvider::new(MockHttpClient::new(Ok(vec![])), config(false));
        let query = provider.tile_query(TileCoord::new(32768, 32767), 16);
        assert!(query.starts_with("[out:json][timeout:30];"));
        assert!(query.contains("rel[\"type\"~\"^(multipolygon|building)\"]"));
        // The south-west corner sits just outside (0°, 0°) because of the margin.
        let bbox = query
            .split("node(")
            .nth(1)
            .and_then(|s| s.split(')').next())
            .unwrap();
        let parts: Vec<f64> = bbox.split(',').map(|p| p.parse().unwrap()).collect();
        assert!(parts[0] < 0.0 && parts[1] < 0.0);
        assert!(parts[2] > 0.0 && parts[3] > 0.0);
    }

    #[tokio::test]
    async fn test_cached_tile_is_used_first() {
        let http = MockHttpClient::new(Err(ProviderError::HttpError("unexpected".into())))
            .route("http://tiles.test/tile/32768/32767", Ok(TREE_TILE.as_bytes().to_vec()));
        let provider = OverpassProvider::new(http, config(true));

        let collection = provider.get_collection(request()).await.unwrap();
        assert_eq!(collection.nodes.len(), 1);
        assert_eq!(provider.http.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_error_falls_back_to_overpass() {
        let http = MockHttpClient::new(Err(ProviderError::HttpError("unexpected".into())))
            .route("http://tiles.test/", Ok(br#"{"error": "not cached"}"#.to_vec()))
            .route("http://overpass.test/", Ok(TREE_TILE.as_bytes().to_vec()));
        let provider = OverpassProvider::new(http, config(true));

        let collection = provider.get_collection(request()).await.unwrap();
        assert_eq!(collection.nodes.len(), 1);

        let recorded = provider.http.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].method, "POST");
        assert!(recorded[1].body.as_deref().unwrap_or("").contains("node("));
    }

    #[tokio::test]
    async fn test_malformed_response_is_invalid() {
        let http = MockHttpClient::new(Ok(b"<html>".to_vec()));
        let provider = OverpassProvider::new(http, config(false));
        let result = provider.get_collection(request()).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_nested_relations_are_fetched() {
        let base = r#"{"elements": [
            {"type": "relation", "id": 10, "members": [{"type": "relation", "ref": 20, "role": ""}],
             "tags": {"type": "multipolygon"}}
        ]}"#;
        let http = MockHttpClient::new(Ok(base.as_bytes().to_vec()));
        let provider = OverpassProvider::new(http, config(false));

        let set = provider
            .fetch_elements(TileCoord::new(0, 0), 16)
            .await
            .unwrap();
        // The patch answer repeats relation 10, which is not duplicated.
        assert_eq!(set.elements.len(), 1);

        let recorded = provider.http.recorded();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[1].body.as_deref().unwrap_or("").contains("rel(id:20)"));
    }
}
