//! Application wiring.
//!
//! [`MapStreamApp`] turns a [`ConfigFile`](crate::config::ConfigFile) into the
//! shared collaborators of the streaming pipeline and builds lifecycle
//! managers on top of them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      MapStreamApp                         │
//! │                                                           │
//! │  ReqwestClient ──┬──► OverpassProvider ─────┐             │
//! │                  ├──► VectorTileProvider ───┼─► Aggregator│
//! │                  └──► HttpElevationLoader   │             │
//! │                                 │           │             │
//! │                                 ▼           ▼             │
//! │                       TileLifecycleManager<M>             │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mapstream::app::MapStreamApp;
//! use mapstream::config::ConfigFile;
//! use mapstream::lifecycle::RetainTileData;
//!
//! let app = MapStreamApp::from_config(ConfigFile::load()?)?;
//! let mut manager = app.lifecycle_manager(RetainTileData)?;
//! manager.update(&camera);
//! ```

mod bootstrap;
mod error;

pub use bootstrap::MapStreamApp;
pub use error::AppError;
