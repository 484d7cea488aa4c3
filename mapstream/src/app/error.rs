//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::coord::CoordError;
use crate::provider::ProviderError;

/// Errors that can occur while wiring the application together.
#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    Config(ConfigFileError),

    /// HTTP client could not be created.
    HttpClient(ProviderError),

    /// Zoom levels rejected by the lifecycle manager.
    Zoom(CoordError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Zoom(e) => write!(f, "Invalid tile zoom levels: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::Zoom(e) => Some(e),
        }
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::Config(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::HttpClient(e)
    }
}

impl From<CoordError> for AppError {
    fn from(e: CoordError) -> Self {
        AppError::Zoom(e)
    }
}
