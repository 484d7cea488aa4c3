//! Vector tile endpoint provider.
//!
//! Requests structured element JSON from a `{z}/{x}/{y}` URL template and
//! resolves it exactly like graph-query results.

use futures::future::BoxFuture;

use super::http::AsyncHttpClient;
use super::types::{ProviderError, TileRequest, VectorFeatureProvider};
use crate::coord::validate_zoom;
use crate::osm::{ElementSet, OsmGraphResolver};
use crate::vector::VectorFeatureCollection;

/// Vector tile provider settings.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorTileConfig {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Optional credential appended as `access_token` query parameter.
    pub access_token: Option<String>,
}

/// Keyed vector tile provider.
pub struct VectorTileProvider<C: AsyncHttpClient> {
    http: C,
    config: VectorTileConfig,
    resolver: OsmGraphResolver,
}

impl<C: AsyncHttpClient> VectorTileProvider<C> {
    pub fn new(http: C, config: VectorTileConfig) -> Self {
        Self {
            http,
            config,
            resolver: OsmGraphResolver::new(),
        }
    }

    /// Expands the URL template for a request.
    pub fn tile_url(&self, request: &TileRequest) -> String {
        let url = self
            .config
            .url_template
            .replace("{z}", &request.zoom.to_string())
            .replace("{x}", &request.coord.x.to_string())
            .replace("{y}", &request.coord.y.to_string());

        match &self.config.access_token {
            Some(token) if !token.is_empty() => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}access_token={}", url, separator, token)
            }
            _ => url,
        }
    }
}

impl<C: AsyncHttpClient> VectorFeatureProvider for VectorTileProvider<C> {
    fn get_collection(
        &self,
        request: TileRequest,
    ) -> BoxFuture<'_, Result<VectorFeatureCollection, ProviderError>> {
        Box::pin(async move {
            validate_zoom(request.zoom).map_err(|_| ProviderError::UnsupportedZoom(request.zoom))?;
            let body = self.http.get(&self.tile_url(&request)).await?;
            let set: ElementSet = serde_json::from_slice(&body).map_err(|e| {
                ProviderError::InvalidResponse(format!("Malformed vector tile: {}", e))
            })?;
            if let Some(error) = set.reported_error() {
                return Err(ProviderError::ProviderSpecific(error));
            }
            Ok(self
                .resolver
                .resolve_tile(&set.elements, request.coord, request.zoom))
        })
    }

    fn name(&self) -> &str {
        "vector-tiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::provider::http::tests::MockHttpClient;

    fn provider(token: Option<&str>, http: MockHttpClient) -> VectorTileProvider<MockHttpClient> {
        VectorTileProvider::new(
            http,
            VectorTileConfig {
                url_template: "http://vt.test/{z}/{x}/{y}.json".into(),
                access_token: token.map(String::from),
            },
        )
    }

    #[test]
    fn test_tile_url_expansion() {
        let p = provider(Some("secret"), MockHttpClient::new(Ok(vec![])));
        let url = p.tile_url(&TileRequest::new(TileCoord::new(3, 4), 16));
        assert_eq!(url, "http://vt.test/16/3/4.json?access_token=secret");

        let p = provider(None, MockHttpClient::new(Ok(vec![])));
        let url = p.tile_url(&TileRequest::new(TileCoord::new(3, 4), 16));
        assert_eq!(url, "http://vt.test/16/3/4.json");
    }

    #[tokio::test]
    async fn test_fetch_resolves_features() {
        let body = br#"{"elements": [
            {"type": "node", "id": 5, "lat": 0.0, "lon": 0.0, "tags": {"power": "pole"}}
        ]}"#;
        let p = provider(None, MockHttpClient::new(Ok(body.to_vec())));
        let c = p
            .get_collection(TileRequest::new(TileCoord::new(0, 0), 16))
            .await
            .unwrap();
        assert_eq!(c.nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_zoom_skips_request() {
        let p = provider(None, MockHttpClient::new(Ok(vec![])));
        let result = p.get_collection(TileRequest::new(TileCoord::new(0, 0), 30)).await;
        assert_eq!(result, Err(ProviderError::UnsupportedZoom(30)));
        assert!(p.http.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_propagates() {
        let p = provider(None, MockHttpClient::new(Err(ProviderError::HttpError("503".into()))));
        let result = p.get_collection(TileRequest::new(TileCoord::new(0, 0), 16)).await;
        assert_eq!(result, Err(ProviderError::HttpError("503".into())));
    }
}
