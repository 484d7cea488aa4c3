//! Run command - drive the lifecycle manager along a straight flight path.

use std::time::Duration;

use glam::DVec3;
use mapstream::app::MapStreamApp;
use mapstream::config::ConfigFile;
use mapstream::coord::degrees_to_meters;
use mapstream::lifecycle::{LifecycleStats, RetainTileData, TileLifecycleManager};
use tracing::info;

use super::common::{camera_at, CameraArgs};
use crate::error::CliError;

/// Flight path settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: u32,
    /// Ground speed in meters per second.
    pub speed: f64,
    /// Frame interval in milliseconds.
    pub frame_ms: u64,
    /// Print progress every this many frames.
    pub report_every: u32,
}

/// Run the run command.
pub async fn run(config: ConfigFile, camera: CameraArgs, options: RunOptions) -> Result<(), CliError> {
    let app = MapStreamApp::from_config(config)?;
    let mut manager = app.lifecycle_manager(RetainTileData)?;

    let ground = degrees_to_meters(camera.lat, camera.lon);
    let start = DVec3::new(ground.x, camera.altitude, ground.y);
    let heading = camera.heading.to_radians();
    let step = DVec3::new(heading.sin(), 0.0, heading.cos())
        * options.speed
        * (options.frame_ms as f64 / 1000.0);

    let mut interval = tokio::time::interval(Duration::from_millis(options.frame_ms.max(1)));
    info!(
        frames = options.frames,
        speed = options.speed,
        heading = camera.heading,
        "Starting flight"
    );

    for frame in 0..options.frames {
        interval.tick().await;
        let eye = start + step * f64::from(frame);
        let view = camera_at(eye, camera.heading, camera.pitch, camera.fov, camera.aspect);
        manager.update(&view);

        if options.report_every > 0 && frame % options.report_every == 0 {
            report(frame, &manager);
        }
    }

    manager.settle().await;
    report(options.frames, &manager);
    print_stats(manager.stats());
    Ok(())
}

fn report(frame: u32, manager: &TileLifecycleManager<RetainTileData>) {
    let loaded = manager.tiles().filter(|t| t.is_loaded()).count();
    let failed = manager.tiles().filter(|t| t.is_failed()).count();
    println!(
        "frame {:>5}  resident {:>4}  loaded {:>4}  failed {:>3}  in-flight {:>3}  elevation {:>3}",
        frame,
        manager.resident_count(),
        loaded,
        failed,
        manager.in_flight(),
        manager.height_tracker().ref_counts().count()
    );
}

fn print_stats(stats: LifecycleStats) {
    println!();
    println!("Admitted: {}", stats.admitted);
    println!("Evicted:  {}", stats.evicted);
    println!("Loaded:   {}", stats.loaded);
    println!("Failed:   {}", stats.failed);
    println!("Stale:    {}", stats.stale);
}
