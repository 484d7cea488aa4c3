//! Settings structs, one per `config.ini` section.

use super::defaults::*;
use crate::lifecycle::LifecycleConfig;
use crate::provider::{OverpassConfig, VectorTileConfig};

/// Complete user configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub tiles: TilesSettings,
    pub overpass: OverpassSettings,
    pub vector_tiles: VectorTileSettings,
    pub elevation: ElevationSettings,
    pub http: HttpSettings,
}

/// `[tiles]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesSettings {
    pub max_resident: usize,
    pub data_zoom: u8,
    pub height_zoom: u8,
    /// Far plane clamp in meters.
    pub frustum_far: f64,
}

impl Default for TilesSettings {
    fn default() -> Self {
        Self {
            max_resident: DEFAULT_MAX_RESIDENT,
            data_zoom: DEFAULT_DATA_ZOOM,
            height_zoom: DEFAULT_HEIGHT_ZOOM,
            frustum_far: DEFAULT_FAR_LIMIT,
        }
    }
}

/// `[overpass]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassSettings {
    pub url: String,
    pub use_cached_tiles: bool,
    pub tile_server: Option<String>,
    pub request_margin: f64,
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            use_cached_tiles: false,
            tile_server: None,
            request_margin: DEFAULT_REQUEST_MARGIN,
        }
    }
}

/// `[vector_tiles]` section. The provider is enabled when `url` is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorTileSettings {
    pub url: Option<String>,
    pub access_token: Option<String>,
}

/// `[elevation]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationSettings {
    pub url: String,
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ELEVATION_URL.to_string(),
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConfigFile {
    /// Lifecycle manager settings from `[tiles]`.
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            max_resident: self.tiles.max_resident,
            data_zoom: self.tiles.data_zoom,
            height_zoom: self.tiles.height_zoom,
            far_limit: self.tiles.frustum_far,
        }
    }

    /// Overpass provider settings from `[overpass]`.
    pub fn overpass_config(&self) -> OverpassConfig {
        OverpassConfig {
            url: self.overpass.url.clone(),
            tile_server: self.overpass.tile_server.clone(),
            use_cached_tiles: self.overpass.use_cached_tiles,
            request_margin: self.overpass.request_margin,
        }
    }

    /// Vector tile provider settings, if `[vector_tiles] url` is set.
    pub fn vector_tile_config(&self) -> Option<VectorTileConfig> {
        self.vector_tiles.url.as_ref().map(|url| VectorTileConfig {
            url_template: url.clone(),
            access_token: self.vector_tiles.access_token.clone(),
        })
    }
}
