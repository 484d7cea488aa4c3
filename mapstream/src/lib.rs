//! MapStream - camera-driven map tile streaming
//!
//! This library decides which map tiles around a moving camera should be
//! resident, loads their elevation dependencies and vector features, and
//! evicts tiles once they leave the view.
//!
//! # Modules
//!
//! - [`viewport`]: camera frustum to ranked tile candidates
//! - [`lifecycle`]: resident tile set, admission, eviction and load tracking
//! - [`height`]: reference-counted elevation tile claims
//! - [`vector`]: feature model and multi-provider aggregation
//! - [`osm`]: OpenStreetMap element graph to vector features
//! - [`provider`]: HTTP-backed vector feature providers
//! - [`config`], [`logging`], [`app`]: configuration, tracing setup and wiring

pub mod app;
pub mod config;
pub mod coord;
pub mod geometry;
pub mod height;
pub mod lifecycle;
pub mod logging;
pub mod osm;
pub mod provider;
pub mod vector;
pub mod viewport;
