//! MapStream CLI - Command-line interface
//!
//! Thin front end over the `mapstream` library: loads the configuration,
//! initializes logging and runs one command.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mapstream::logging::{default_log_dir, default_log_file, init_logging};

use commands::common::{load_config, CameraArgs};
use commands::run::RunOptions;
use error::CliError;

#[derive(Parser)]
#[command(name = "mapstream")]
#[command(about = "Stream map tiles around a moving camera", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.mapstream/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the log file (default: ~/.mapstream/logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the tiles a camera would request, nearest first
    Select {
        #[command(flatten)]
        camera: CameraArgs,

        /// Print at most this many tiles
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch the vector features of the tile containing a position
    Fetch {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Print the full collection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fly a straight path and stream tiles along it
    Run {
        #[command(flatten)]
        camera: CameraArgs,

        /// Number of frames to simulate
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Ground speed in meters per second
        #[arg(long, default_value = "70")]
        speed: f64,

        /// Frame interval in milliseconds
        #[arg(long, default_value = "33")]
        frame_ms: u64,

        /// Print progress every N frames
        #[arg(long, default_value = "30")]
        report_every: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Init { force } = cli.command {
        return commands::init::run(cli.config.as_deref(), force);
    }

    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    let _logging = init_logging(&log_dir, default_log_file()).map_err(CliError::LoggingInit)?;

    let (config, config_path) = load_config(cli.config.as_deref())?;
    tracing::debug!(path = %config_path.display(), "Loaded configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Select { camera, limit } => commands::select::run(&config, &camera, limit),
        Command::Fetch { lat, lon, json } => {
            runtime.block_on(commands::fetch::run(config, lat, lon, json))
        }
        Command::Run {
            camera,
            frames,
            speed,
            frame_ms,
            report_every,
        } => runtime.block_on(commands::run::run(
            config,
            camera,
            RunOptions {
                frames,
                speed,
                frame_ms,
                report_every,
            },
        )),
    }
}
