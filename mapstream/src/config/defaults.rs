//! Default values for `config.ini` settings.

pub use crate::lifecycle::{DEFAULT_DATA_ZOOM, DEFAULT_HEIGHT_ZOOM, DEFAULT_MAX_RESIDENT};
pub use crate::provider::{DEFAULT_OVERPASS_URL, DEFAULT_REQUEST_MARGIN, DEFAULT_TIMEOUT_SECS};
pub use crate::viewport::DEFAULT_FAR_LIMIT;

/// Default elevation tile endpoint (Terrarium-encoded DEM tiles).
pub const DEFAULT_ELEVATION_URL: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

/// Name of the configuration directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".mapstream";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";
