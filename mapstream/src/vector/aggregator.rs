//! Multi-provider fan-out and merge.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use super::features::VectorFeatureCollection;
use super::reconcile::reconcile;
use crate::coord::tile_size_meters;
use crate::provider::{ProviderError, TileRequest, VectorFeatureProvider};

/// One failed provider of an aggregate request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

fn describe(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ProviderFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from aggregated feature requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    /// At least one provider failed; no partial result is returned.
    #[error("{} of {} vector providers failed: {}", .failures.len(), .total, describe(.failures))]
    ProvidersFailed {
        failures: Vec<ProviderFailure>,
        total: usize,
    },
}

impl AggregateError {
    /// Names of the providers that failed, in configuration order.
    pub fn failed_providers(&self) -> Vec<&str> {
        match self {
            AggregateError::ProvidersFailed { failures, .. } => {
                failures.iter().map(|f| f.provider.as_str()).collect()
            }
        }
    }
}

/// Fans tile requests out to every configured provider and merges the
/// results.
///
/// All providers must succeed. Their collections are concatenated per
/// category in provider order, then authoritative outlines are clipped to
/// the tile and deduplicated.
#[derive(Clone)]
pub struct VectorFeatureAggregator {
    providers: Vec<Arc<dyn VectorFeatureProvider>>,
}

impl VectorFeatureAggregator {
    pub fn new(providers: Vec<Arc<dyn VectorFeatureProvider>>) -> Self {
        Self { providers }
    }

    /// Names of the configured providers, in order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Fetches, merges and reconciles the features of one tile.
    pub async fn get_collection(
        &self,
        request: TileRequest,
    ) -> Result<VectorFeatureCollection, AggregateError> {
        let results = join_all(self.providers.iter().map(|p| p.get_collection(request))).await;

        let mut collections = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(collection) => collections.push(collection),
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        tile = %request.coord,
                        error = %error,
                        "Vector provider failed"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(AggregateError::ProvidersFailed {
                failures,
                total: self.providers.len(),
            });
        }

        let merged = VectorFeatureCollection::concat(collections);
        let before = merged.areas.len();
        let collection = reconcile(merged, tile_size_meters(request.zoom));
        debug!(
            tile = %request.coord,
            nodes = collection.nodes.len(),
            polylines = collection.polylines.len(),
            areas = collection.areas.len(),
            dropped_areas = before - collection.areas.len(),
            "Merged vector features"
        );
        Ok(collection)
    }
}

impl fmt::Debug for VectorFeatureAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorFeatureAggregator")
            .field("providers", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::vector::descriptors::{AreaKind, BuildingAttributes, VectorAreaDescriptor};
    use crate::vector::features::{
        OsmElementKind, OsmReference, RingKind, VectorArea, VectorAreaRing,
    };
    use futures::future::BoxFuture;
    use glam::DVec2;

    /// Provider returning a fixed result.
    pub(crate) struct StaticProvider {
        pub name: String,
        pub result: Result<VectorFeatureCollection, ProviderError>,
    }

    impl VectorFeatureProvider for StaticProvider {
        fn get_collection(
            &self,
            _request: TileRequest,
        ) -> BoxFuture<'_, Result<VectorFeatureCollection, ProviderError>> {
            let result = self.result.clone();
            Box::pin(async move { result })
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn building(id: i64, min: f64, max: f64) -> VectorArea {
        VectorArea {
            rings: vec![VectorAreaRing::new(
                RingKind::Outer,
                vec![
                    DVec2::new(min, min),
                    DVec2::new(max, min),
                    DVec2::new(max, max),
                    DVec2::new(min, max),
                    DVec2::new(min, min),
                ],
            )],
            descriptor: VectorAreaDescriptor::building(
                AreaKind::Building,
                BuildingAttributes::default(),
            ),
            osm: Some(OsmReference::new(OsmElementKind::Way, id)),
        }
    }

    fn with_areas(areas: Vec<VectorArea>) -> VectorFeatureCollection {
        VectorFeatureCollection {
            areas,
            ..Default::default()
        }
    }

    fn provider(
        name: &str,
        result: Result<VectorFeatureCollection, ProviderError>,
    ) -> Arc<dyn VectorFeatureProvider> {
        Arc::new(StaticProvider {
            name: name.to_string(),
            result,
        })
    }

    fn request() -> TileRequest {
        TileRequest::new(TileCoord::new(10, 10), 16)
    }

    fn area_ids(c: &VectorFeatureCollection) -> Vec<i64> {
        c.areas.iter().filter_map(|a| a.osm.map(|r| r.id)).collect()
    }

    #[tokio::test]
    async fn test_disjoint_sources_concatenate_in_provider_order() {
        let aggregator = VectorFeatureAggregator::new(vec![
            provider("a", Ok(with_areas(vec![building(1, 10.0, 20.0), building(2, 30.0, 40.0)]))),
            provider("b", Ok(with_areas(vec![building(3, 50.0, 60.0)]))),
        ]);
        let merged = aggregator.get_collection(request()).await.unwrap();
        assert_eq!(area_ids(&merged), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_containing_outline_survives_merge() {
        let aggregator = VectorFeatureAggregator::new(vec![
            provider("a", Ok(with_areas(vec![building(1, 12.0, 18.0)]))),
            provider("b", Ok(with_areas(vec![building(2, 10.0, 20.0)]))),
        ]);
        let merged = aggregator.get_collection(request()).await.unwrap();
        assert_eq!(area_ids(&merged), vec![2]);
    }

    #[tokio::test]
    async fn test_out_of_tile_outline_is_clipped() {
        let aggregator = VectorFeatureAggregator::new(vec![provider(
            "a",
            Ok(with_areas(vec![building(1, -40.0, -20.0), building(2, 10.0, 20.0)])),
        )]);
        let merged = aggregator.get_collection(request()).await.unwrap();
        assert_eq!(area_ids(&merged), vec![2]);
    }

    #[tokio::test]
    async fn test_any_failure_fails_the_request() {
        let aggregator = VectorFeatureAggregator::new(vec![
            provider("a", Ok(with_areas(vec![building(1, 10.0, 20.0)]))),
            provider("b", Err(ProviderError::HttpError("timeout".into()))),
            provider("c", Err(ProviderError::InvalidResponse("bad".into()))),
        ]);
        let err = aggregator.get_collection(request()).await.unwrap_err();
        assert_eq!(err.failed_providers(), vec!["b", "c"]);
        let message = err.to_string();
        assert!(message.starts_with("2 of 3 vector providers failed"), "{}", message);
        assert!(message.contains("b: HTTP error: timeout"));
    }

    #[tokio::test]
    async fn test_no_providers_yields_empty_collection() {
        let aggregator = VectorFeatureAggregator::new(Vec::new());
        assert!(aggregator.get_collection(request()).await.unwrap().is_empty());
    }
}
