//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use mapstream::app::AppError;
use mapstream::config::ConfigFileError;
use mapstream::coord::CoordError;
use mapstream::vector::AggregateError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// Collaborators could not be built
    Startup(AppError),
    /// Invalid coordinates or zoom on the command line
    Coordinates(CoordError),
    /// Tile fetch failed
    Fetch(AggregateError),
    /// Output could not be produced
    Output(String),
    /// Refused to overwrite an existing file
    AlreadyExists(String),
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Fetch(e) = self {
            eprintln!();
            eprintln!("Failed providers: {}", e.failed_providers().join(", "));
            eprintln!("Check the endpoints in the config file or try again later.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Startup(e) => write!(f, "{}", e),
            CliError::Coordinates(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::Fetch(e) => write!(f, "Failed to fetch tile: {}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::AlreadyExists(path) => {
                write!(f, "'{}' already exists (use --force to overwrite)", path)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Startup(e) => Some(e),
            CliError::Coordinates(e) => Some(e),
            CliError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::Startup(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<AggregateError> for CliError {
    fn from(e: AggregateError) -> Self {
        CliError::Fetch(e)
    }
}
