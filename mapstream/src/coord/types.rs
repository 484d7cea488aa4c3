//! Coordinate types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half of the Web Mercator world extent in meters.
pub const HALF_EARTH_METERS: f64 = 20_037_508.34;

/// Maximum zoom level accepted by the conversion functions.
pub const MAX_ZOOM: u8 = 22;

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Zoom level is above [`MAX_ZOOM`].
    #[error("Invalid zoom level: {0} (max {})", MAX_ZOOM)]
    InvalidZoom(u8),

    /// The elevation zoom is finer than the data zoom.
    #[error("Height zoom {height_zoom} must not exceed data zoom {data_zoom}")]
    HeightZoomTooFine { data_zoom: u8, height_zoom: u8 },
}

/// Integer tile coordinate at a fixed zoom level.
///
/// Used as the identity key of resident tiles, so it is `Copy + Hash` and
/// never allocates. `x` grows eastwards and `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Tile column (west to east).
    pub x: i32,
    /// Tile row (north to south).
    pub y: i32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a point given in fractional tile space.
    pub fn containing(tx: f64, ty: f64) -> Self {
        Self {
            x: tx.floor() as i32,
            y: ty.floor() as i32,
        }
    }

    /// Center of this tile in fractional tile space.
    pub fn center(&self) -> (f64, f64) {
        (self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// The tile that contains this one at a coarser zoom.
    ///
    /// `levels` is the zoom difference. Uses floor division so negative
    /// coordinates map consistently.
    pub fn ancestor(&self, levels: u8) -> Self {
        let factor = 1_i32 << levels;
        Self {
            x: self.x.div_euclid(factor),
            y: self.y.div_euclid(factor),
        }
    }

    /// This coordinate shifted by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Identity of an elevation tile: coordinate plus the zoom it lives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeightTileKey {
    /// Tile coordinate at `zoom`.
    pub coord: TileCoord,
    /// Elevation zoom level.
    pub zoom: u8,
}

impl HeightTileKey {
    /// Create a new key.
    pub const fn new(coord: TileCoord, zoom: u8) -> Self {
        Self { coord, zoom }
    }
}

impl fmt::Display for HeightTileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@ZL{}", self.coord, self.zoom)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}
