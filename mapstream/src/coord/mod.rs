//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude),
//! Web Mercator world meters and fractional tile space.
//!
//! # Conventions
//!
//! - World ground plane is `(x, z)`: `x` is Mercator easting and `z` is
//!   Mercator northing, both in meters. The vertical world axis is `y`.
//! - Tile space is `(tx, ty)`: `tx` grows eastwards and `ty` grows southwards,
//!   one unit per tile at the given zoom.
//! - A tile's local origin is its south-west corner, so local feature
//!   coordinates of a tile lie in `[0, tile_size) × [0, tile_size)`.

mod types;

pub use types::{CoordError, HeightTileKey, LatLon, TileCoord, HALF_EARTH_METERS, MAX_ZOOM};

use std::f64::consts::PI;

use glam::DVec2;

/// Number of tiles along one axis at `zoom`.
#[inline]
fn tiles_per_axis(zoom: u8) -> f64 {
    2.0_f64.powi(zoom as i32)
}

/// Validates that a zoom level is supported.
pub fn validate_zoom(zoom: u8) -> Result<(), CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(())
}

/// Returns the zoom difference between data tiles and elevation tiles.
///
/// # Errors
///
/// Fails if either zoom is invalid or the elevation zoom is finer than the
/// data zoom.
pub fn zoom_offset(data_zoom: u8, height_zoom: u8) -> Result<u8, CoordError> {
    validate_zoom(data_zoom)?;
    validate_zoom(height_zoom)?;
    if height_zoom > data_zoom {
        return Err(CoordError::HeightZoomTooFine {
            data_zoom,
            height_zoom,
        });
    }
    Ok(data_zoom - height_zoom)
}

/// Edge length of one tile at `zoom`, in Mercator meters.
#[inline]
pub fn tile_size_meters(zoom: u8) -> f64 {
    2.0 * HALF_EARTH_METERS / tiles_per_axis(zoom)
}

/// Converts world ground coordinates to fractional tile space.
///
/// # Arguments
///
/// * `x` - Mercator easting in meters
/// * `z` - Mercator northing in meters
/// * `zoom` - Zoom level
#[inline]
pub fn meters_to_tile(x: f64, z: f64, zoom: u8) -> DVec2 {
    let n = tiles_per_axis(zoom);
    DVec2::new(
        (x + HALF_EARTH_METERS) / (2.0 * HALF_EARTH_METERS) * n,
        (HALF_EARTH_METERS - z) / (2.0 * HALF_EARTH_METERS) * n,
    )
}

/// Converts fractional tile space back to world ground coordinates.
///
/// Returns `(easting, northing)` in meters.
#[inline]
pub fn tile_to_meters(tx: f64, ty: f64, zoom: u8) -> DVec2 {
    let n = tiles_per_axis(zoom);
    DVec2::new(
        tx / n * 2.0 * HALF_EARTH_METERS - HALF_EARTH_METERS,
        HALF_EARTH_METERS - ty / n * 2.0 * HALF_EARTH_METERS,
    )
}

/// World position of a tile's south-west corner (its local origin).
#[inline]
pub fn tile_origin_meters(tile: TileCoord, zoom: u8) -> DVec2 {
    tile_to_meters(tile.x as f64, (tile.y + 1) as f64, zoom)
}

/// World position of a tile's center.
#[inline]
pub fn tile_center_meters(tile: TileCoord, zoom: u8) -> DVec2 {
    let (cx, cy) = tile.center();
    tile_to_meters(cx, cy, zoom)
}

/// Converts WGS84 degrees to Mercator meters `(easting, northing)`.
#[inline]
pub fn degrees_to_meters(lat: f64, lon: f64) -> DVec2 {
    let x = lon * HALF_EARTH_METERS / 180.0;
    let z = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    DVec2::new(x, z * HALF_EARTH_METERS / 180.0)
}

/// Converts fractional tile space to WGS84 degrees.
///
/// Integer inputs give the tile's north-west corner.
#[inline]
pub fn tile_to_degrees(tx: f64, ty: f64, zoom: u8) -> LatLon {
    let n = tiles_per_axis(zoom);
    let lon = tx / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * ty / n)).sinh().atan();
    LatLon::new(lat_rad.to_degrees(), lon)
}

/// Converts WGS84 degrees to fractional tile space.
#[inline]
pub fn degrees_to_tile(lat: f64, lon: f64, zoom: u8) -> DVec2 {
    let m = degrees_to_meters(lat, lon);
    meters_to_tile(m.x, m.y, zoom)
}
