//! INI serialization: `ConfigFile` → commented `config.ini` text.

use super::settings::ConfigFile;

pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let tile_server = config.overpass.tile_server.as_deref().unwrap_or("");
    let vector_url = config.vector_tiles.url.as_deref().unwrap_or("");
    let access_token = config.vector_tiles.access_token.as_deref().unwrap_or("");

    format!(
        r#"[tiles]
; Maximum number of resident map tiles (default: 256)
max_resident = {}
; Zoom level of map tiles (default: 16)
data_zoom = {}
; Zoom level of elevation tiles, not finer than data_zoom (default: 12)
height_zoom = {}
; Far plane clamp used for tile selection, in meters (default: 5000)
frustum_far = {}

[overpass]
; Overpass API interpreter endpoint
url = {}
; Try the cached tile server before querying Overpass
use_cached_tiles = {}
; Cached tile server base URL, serving <tile_server>/tile/<x>/<y>
tile_server = {}
; Query bounding box margin, in tiles (default: 0.05)
request_margin = {}

[vector_tiles]
; Vector tile endpoint with {{z}}, {{x}} and {{y}} placeholders.
; Leave empty to disable this provider.
url = {}
; Access token appended as a query parameter (optional)
access_token = {}

[elevation]
; Elevation tile endpoint with {{z}}, {{x}} and {{y}} placeholders
url = {}

[http]
; Request timeout in seconds (default: 30)
timeout = {}
"#,
        config.tiles.max_resident,
        config.tiles.data_zoom,
        config.tiles.height_zoom,
        config.tiles.frustum_far,
        config.overpass.url,
        config.overpass.use_cached_tiles,
        tile_server,
        config.overpass.request_margin,
        vector_url,
        access_token,
        config.elevation.url,
        config.http.timeout,
    )
}
