//! Planar geometry helpers.
//!
//! - [`convex_hull`] for the projected camera frustum
//! - [`convex_overlaps_cell`] to keep only tiles sharing area with the hull
//! - [`tiles_on_segment`] supercover rasterization of hull edges
//! - polygon predicates used when reconciling building outlines

mod hull;
mod polygon;
mod raster;

pub use hull::{convex_hull, convex_overlaps_cell, cross};
pub use polygon::{open_ring, point_in_ring, ring_contains_ring, signed_area, Bounds};
pub use raster::tiles_on_segment;
