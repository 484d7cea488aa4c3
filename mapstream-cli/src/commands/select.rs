//! Select command - print the candidate tiles for a camera.

use mapstream::config::ConfigFile;
use mapstream::coord::tile_center_meters;
use mapstream::viewport::ViewportTileSelector;

use super::common::CameraArgs;
use crate::error::CliError;

/// Run the select command.
pub fn run(config: &ConfigFile, camera: &CameraArgs, limit: Option<usize>) -> Result<(), CliError> {
    let zoom = config.tiles.data_zoom;
    let mut selector = ViewportTileSelector::new(zoom, config.tiles.frustum_far);
    let camera = camera.camera();
    let tiles = selector.select(&camera);
    let ground = camera.ground_position();

    println!(
        "{} candidate tiles at ZL{} (far limit {} m)",
        tiles.len(),
        zoom,
        config.tiles.frustum_far
    );
    for (rank, tile) in tiles.iter().take(limit.unwrap_or(usize::MAX)).enumerate() {
        let distance = tile_center_meters(*tile, zoom).distance(ground);
        println!("{:>5}  {:>8} {:>8}  {:>9.1} m", rank + 1, tile.x, tile.y, distance);
    }
    Ok(())
}
