//! Shared argument types and helpers.

use std::path::{Path, PathBuf};

use clap::Args;
use glam::DVec3;
use mapstream::config::{config_file_path, ConfigFile};
use mapstream::coord::{degrees_to_meters, degrees_to_tile, validate_zoom, TileCoord};
use mapstream::viewport::Camera;

use crate::error::CliError;

/// Camera placement on the command line.
#[derive(Debug, Clone, Args)]
pub struct CameraArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Altitude above ground in meters
    #[arg(long, default_value = "300")]
    pub altitude: f64,

    /// Heading in degrees clockwise from north
    #[arg(long, default_value = "0")]
    pub heading: f64,

    /// Pitch below the horizon in degrees (0 = level, 89 = straight down)
    #[arg(long, default_value = "30")]
    pub pitch: f64,

    /// Vertical field of view in degrees
    #[arg(long, default_value = "60")]
    pub fov: f64,

    /// Viewport aspect ratio (width / height)
    #[arg(long, default_value = "1.7778")]
    pub aspect: f64,
}

impl CameraArgs {
    /// Camera for these arguments.
    pub fn camera(&self) -> Camera {
        let ground = degrees_to_meters(self.lat, self.lon);
        camera_at(
            DVec3::new(ground.x, self.altitude, ground.y),
            self.heading,
            self.pitch,
            self.fov,
            self.aspect,
        )
    }
}

/// Builds a camera at `eye` (world meters, `y` up) looking along `heading`
/// and tilted down by `pitch`, both in degrees.
pub fn camera_at(eye: DVec3, heading: f64, pitch: f64, fov: f64, aspect: f64) -> Camera {
    let heading = heading.to_radians();
    let pitch = pitch.clamp(0.0, 89.0).to_radians();
    let direction = DVec3::new(
        heading.sin() * pitch.cos(),
        -pitch.sin(),
        heading.cos() * pitch.cos(),
    );
    Camera::looking_at(
        fov.to_radians(),
        aspect,
        1.0,
        100_000.0,
        eye,
        eye + direction,
    )
}

/// Tile at `zoom` containing a geographic position.
pub fn tile_at(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CliError> {
    validate_zoom(zoom)?;
    let t = degrees_to_tile(lat, lon, zoom);
    Ok(TileCoord::containing(t.x, t.y))
}

/// Loads the config file given on the command line, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<(ConfigFile, PathBuf), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&path)?;
    Ok((config, path))
}
