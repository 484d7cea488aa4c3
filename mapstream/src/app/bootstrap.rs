//! Application bootstrap implementation.

use std::sync::Arc;

use tracing::info;

use super::error::AppError;
use crate::config::ConfigFile;
use crate::height::{ElevationLoader, HttpElevationLoader};
use crate::lifecycle::{MeshStage, TileLifecycleManager};
use crate::provider::{OverpassProvider, ReqwestClient, VectorFeatureProvider, VectorTileProvider};
use crate::vector::VectorFeatureAggregator;

/// Shared collaborators built from the user configuration.
pub struct MapStreamApp {
    config: ConfigFile,
    aggregator: Arc<VectorFeatureAggregator>,
    elevation: Arc<dyn ElevationLoader>,
}

impl MapStreamApp {
    /// Builds providers, the aggregator and the elevation loader.
    ///
    /// The Overpass provider is always enabled; the vector tile provider is
    /// added when `[vector_tiles] url` is set.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be created.
    pub fn from_config(config: ConfigFile) -> Result<Self, AppError> {
        let http = ReqwestClient::with_timeout(config.http.timeout)?;

        let mut providers: Vec<Arc<dyn VectorFeatureProvider>> = vec![Arc::new(
            OverpassProvider::new(http.clone(), config.overpass_config()),
        )];
        if let Some(vector_tiles) = config.vector_tile_config() {
            providers.push(Arc::new(VectorTileProvider::new(http.clone(), vector_tiles)));
        }

        let aggregator = Arc::new(VectorFeatureAggregator::new(providers));
        let elevation: Arc<dyn ElevationLoader> =
            Arc::new(HttpElevationLoader::new(http, config.elevation.url.clone()));

        info!(
            providers = ?aggregator.provider_names(),
            data_zoom = config.tiles.data_zoom,
            height_zoom = config.tiles.height_zoom,
            max_resident = config.tiles.max_resident,
            "MapStream initialized"
        );

        Ok(Self {
            config,
            aggregator,
            elevation,
        })
    }

    /// Creates a lifecycle manager sharing this app's collaborators.
    ///
    /// # Errors
    ///
    /// Fails if the configured zoom levels are invalid.
    pub fn lifecycle_manager<M: MeshStage>(
        &self,
        mesh: M,
    ) -> Result<TileLifecycleManager<M>, AppError> {
        Ok(TileLifecycleManager::new(
            self.config.lifecycle_config(),
            Arc::clone(&self.elevation),
            Arc::clone(&self.aggregator),
            mesh,
        )?)
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn aggregator(&self) -> Arc<VectorFeatureAggregator> {
        Arc::clone(&self.aggregator)
    }

    pub fn elevation_loader(&self) -> Arc<dyn ElevationLoader> {
        Arc::clone(&self.elevation)
    }
}
