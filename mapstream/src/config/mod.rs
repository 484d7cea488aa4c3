//! User configuration (`~/.mapstream/config.ini`).
//!
//! Settings structs live in [`settings`], constants in [`defaults`], parsing
//! in `parser` and serialization in `writer`.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_ELEVATION_URL};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, ElevationSettings, HttpSettings, OverpassSettings, TilesSettings,
    VectorTileSettings,
};
