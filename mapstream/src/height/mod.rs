//! Elevation dependencies of map tiles.
//!
//! Every map tile depends on the elevation tile containing it plus the 8
//! neighbors of that elevation tile, so features crossing an elevation tile
//! edge can still be draped. The [`HeightDependencyTracker`] keeps one
//! reference count per elevation tile equal to the number of resident map
//! tiles holding a claim on it.

mod http;
mod loader;
mod tracker;

pub use http::HttpElevationLoader;
pub use loader::{ElevationError, ElevationLoader, ElevationPayload};
pub use tracker::{CommittedClaims, HeightClaim, HeightClaimError, HeightDependencyTracker};

#[cfg(test)]
pub(crate) use tracker::tests::MockElevationLoader;
