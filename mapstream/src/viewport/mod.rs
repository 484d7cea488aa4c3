//! Camera frustum to tile selection.
//!
//! The [`ViewportTileSelector`] is called once per frame by the tile
//! lifecycle manager and returns the ranked list of tiles that should be
//! resident for the current camera.

mod camera;
mod selector;

pub use camera::{Camera, Frustum};
pub use selector::{tiles_in_convex_hull, ViewportTileSelector, DEFAULT_FAR_LIMIT};
