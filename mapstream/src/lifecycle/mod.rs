//! Tile lifecycle management.
//!
//! Decides each frame which map tiles are resident, drives their loading
//! (elevation claims first, then vector features) and evicts tiles that left
//! the view once the resident budget is exceeded.

mod manager;
mod mesh;
mod tile;

pub use manager::{
    LifecycleConfig, LifecycleStats, TileLifecycleManager, DEFAULT_DATA_ZOOM, DEFAULT_HEIGHT_ZOOM,
    DEFAULT_MAX_RESIDENT,
};
pub use mesh::{MeshStage, RetainTileData, TileData};
pub use tile::{LoadError, LoadState, Tile};
