//! Viewport tile selection.
//!
//! Turns the camera frustum into the ordered list of tiles that should be
//! resident, nearest first:
//!
//! ```text
//! frustum corners (view) ─► world ─► ground (x, z) ─► tile space
//!        ─► convex hull ─► supercover of hull edges ─► row fill
//!        ─► positive-area overlap filter ─► sort
//! ```

use std::collections::{BTreeMap, HashSet};

use glam::DVec2;

use super::camera::{Camera, Frustum};
use crate::coord::{meters_to_tile, TileCoord};
use crate::geometry::{convex_hull, convex_overlaps_cell, tiles_on_segment};

/// Default far distance used when projecting the frustum, in meters.
///
/// Keeps the projected footprint bounded when the camera looks towards the
/// horizon.
pub const DEFAULT_FAR_LIMIT: f64 = 5000.0;

/// Selects candidate tiles for the current camera.
///
/// The selector caches the view-space frustum between frames and rebuilds it
/// only when the camera's projection parameters change.
#[derive(Debug, Clone)]
pub struct ViewportTileSelector {
    zoom: u8,
    far_limit: f64,
    frustum: Option<Frustum>,
}

impl ViewportTileSelector {
    /// Create a selector for tiles at `zoom`, clamping the frustum to
    /// `far_limit` meters.
    pub fn new(zoom: u8, far_limit: f64) -> Self {
        Self {
            zoom,
            far_limit,
            frustum: None,
        }
    }

    /// Zoom level of the produced tile coordinates.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Returns the tiles intersecting the camera's ground footprint,
    /// sorted by distance from the camera, each exactly once.
    pub fn select(&mut self, camera: &Camera) -> Vec<TileCoord> {
        let far = camera.far.min(self.far_limit).max(camera.near);
        let stale = !matches!(
            &self.frustum,
            Some(f) if f.matches(camera.vertical_fov, camera.aspect, camera.near, far)
        );
        if stale {
            self.frustum = Some(Frustum::new(
                camera.vertical_fov,
                camera.aspect,
                camera.near,
                far,
            ));
        }
        let Some(frustum) = self.frustum.as_ref() else {
            return Vec::new();
        };

        let zoom = self.zoom;
        let projected: Vec<DVec2> = frustum
            .world_vertices(&camera.transform)
            .iter()
            .map(|v| meters_to_tile(v.x, v.z, zoom))
            .collect();

        let hull = convex_hull(&projected);
        let ground = camera.ground_position();
        let camera_tile = meters_to_tile(ground.x, ground.y, zoom);

        tiles_in_convex_hull(&hull, camera_tile)
    }
}

/// Returns every tile intersecting a convex polygon given in tile space,
/// sorted by distance from `camera` (tile space) to each tile center.
///
/// Edge cells are collected with a supercover walk of every hull edge, then
/// each row is filled between its leftmost and rightmost edge cell. The walk
/// also yields cells that only touch the hull along a grid line or at a
/// corner, so every candidate must overlap the hull with positive area.
/// Hulls of fewer than three vertices have no area and keep the cells the
/// walk touched. Ties in distance keep discovery order (rows north to south,
/// then west to east).
pub fn tiles_in_convex_hull(hull: &[DVec2], camera: DVec2) -> Vec<TileCoord> {
    if hull.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut rows: BTreeMap<i32, (i32, i32)> = BTreeMap::new();

    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        for cell in tiles_on_segment(a, b) {
            if !seen.insert(cell) {
                continue;
            }
            rows.entry(cell.y)
                .and_modify(|(min, max)| {
                    *min = (*min).min(cell.x);
                    *max = (*max).max(cell.x);
                })
                .or_insert((cell.x, cell.x));
        }
    }

    let has_area = hull.len() >= 3;
    let tiles: Vec<TileCoord> = rows
        .iter()
        .flat_map(|(&y, &(min_x, max_x))| (min_x..=max_x).map(move |x| TileCoord::new(x, y)))
        .filter(|tile| {
            !has_area || convex_overlaps_cell(hull, DVec2::new(tile.x as f64, tile.y as f64))
        })
        .collect();

    sort_by_distance(tiles, camera)
}

/// Stable sort of tiles by distance from `camera` to the tile center.
fn sort_by_distance(tiles: Vec<TileCoord>, camera: DVec2) -> Vec<TileCoord> {
    let mut keyed: Vec<(f64, TileCoord)> = tiles
        .into_iter()
        .map(|tile| {
            let (cx, cy) = tile.center();
            (DVec2::new(cx, cy).distance(camera), tile)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, tile)| tile).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{tile_center_meters, tile_size_meters};
    use glam::DVec3;
    use proptest::prelude::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    fn t(x: i32, y: i32) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn test_square_hull_covers_four_tiles() {
        let hull = convex_hull(&[v(5.2, 5.2), v(6.8, 5.2), v(6.8, 6.8), v(5.2, 6.8)]);
        let tiles = tiles_in_convex_hull(&hull, v(5.0, 6.9));
        assert_eq!(tiles, vec![t(5, 6), t(5, 5), t(6, 6), t(6, 5)]);
    }

    #[test]
    fn test_square_on_grid_lines_excludes_touching_tiles() {
        let hull = convex_hull(&[v(5.0, 5.0), v(7.0, 5.0), v(7.0, 7.0), v(5.0, 7.0)]);
        let tiles: HashSet<TileCoord> = tiles_in_convex_hull(&hull, v(6.0, 6.0))
            .into_iter()
            .collect();
        let expected: HashSet<TileCoord> =
            [t(5, 5), t(6, 5), t(5, 6), t(6, 6)].into_iter().collect();
        assert_eq!(tiles, expected);
    }

    #[test]
    fn test_diagonal_edge_through_grid_corner() {
        let hull = convex_hull(&[v(0.5, 0.5), v(1.5, 1.5), v(0.5, 1.5)]);
        let tiles: HashSet<TileCoord> = tiles_in_convex_hull(&hull, v(0.0, 0.0))
            .into_iter()
            .collect();
        let expected: HashSet<TileCoord> = [t(0, 0), t(0, 1), t(1, 1)].into_iter().collect();
        assert_eq!(tiles, expected);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let hull = convex_hull(&[v(5.2, 5.2), v(6.8, 5.2), v(6.8, 6.8), v(5.2, 6.8)]);
        let tiles = tiles_in_convex_hull(&hull, v(6.0, 6.0));
        assert_eq!(tiles, vec![t(5, 5), t(6, 5), t(5, 6), t(6, 6)]);
    }

    #[test]
    fn test_interior_rows_are_filled() {
        let hull = convex_hull(&[v(0.5, 0.5), v(9.5, 0.5), v(9.5, 9.5), v(0.5, 9.5)]);
        let tiles = tiles_in_convex_hull(&hull, v(5.0, 5.0));
        assert_eq!(tiles.len(), 100);
        assert!(tiles.contains(&t(4, 4)));
        assert_eq!(tiles.iter().collect::<HashSet<_>>().len(), 100);
    }

    #[test]
    fn test_triangle_rows() {
        let hull = convex_hull(&[v(0.5, 0.5), v(4.5, 0.5), v(0.5, 4.5)]);
        let tiles: HashSet<TileCoord> = tiles_in_convex_hull(&hull, v(0.0, 0.0))
            .into_iter()
            .collect();
        // Row 0 spans the whole base, row 4 only the apex cell.
        for x in 0..=4 {
            assert!(tiles.contains(&t(x, 0)));
        }
        assert!(tiles.contains(&t(0, 4)));
        assert!(!tiles.contains(&t(4, 4)));
    }

    #[test]
    fn test_empty_and_point_hulls() {
        assert!(tiles_in_convex_hull(&[], v(0.0, 0.0)).is_empty());
        assert_eq!(tiles_in_convex_hull(&[v(3.5, 2.5)], v(0.0, 0.0)), vec![t(3, 2)]);
    }

    #[test]
    fn test_selector_tilted_camera() {
        let zoom = 16;
        let home = t(35_000, 21_000);
        let center = tile_center_meters(home, zoom);
        let eye = DVec3::new(center.x, 300.0, center.y);
        // Look north-east and down.
        let target = DVec3::new(center.x + 200.0, 0.0, center.y + 200.0);
        let camera = Camera::looking_at(1.0, 16.0 / 9.0, 1.0, 100_000.0, eye, target);

        let mut selector = ViewportTileSelector::new(zoom, DEFAULT_FAR_LIMIT);
        let tiles = selector.select(&camera);

        assert_eq!(tiles.first(), Some(&home), "camera tile comes first");
        assert_eq!(tiles.iter().collect::<HashSet<_>>().len(), tiles.len());

        // Footprint is bounded by the far limit.
        let max_span = (2.0 * DEFAULT_FAR_LIMIT / tile_size_meters(zoom)).ceil() as i32 + 2;
        for tile in &tiles {
            assert!((tile.x - home.x).abs() <= max_span);
            assert!((tile.y - home.y).abs() <= max_span);
        }

        // Looking north-east means tiles north (smaller y) and east dominate.
        let east = tiles.iter().filter(|c| c.x > home.x).count();
        let west = tiles.iter().filter(|c| c.x < home.x).count();
        assert!(east > west);
    }

    #[test]
    fn test_selector_reuses_frustum() {
        let camera = Camera::looking_at(
            1.0,
            1.5,
            1.0,
            1000.0,
            DVec3::new(0.0, 100.0, 0.0),
            DVec3::new(0.0, 0.0, 100.0),
        );
        let mut selector = ViewportTileSelector::new(16, DEFAULT_FAR_LIMIT);
        let first = selector.select(&camera);
        let second = selector.select(&camera);
        assert_eq!(first, second);
        assert_eq!(selector.frustum.as_ref().map(|f| f.far()), Some(1000.0));
    }

    /// Separating-axis overlap between a convex polygon and a unit cell.
    fn cell_overlaps_hull(cell: TileCoord, hull: &[DVec2]) -> bool {
        let corners = [
            v(cell.x as f64, cell.y as f64),
            v(cell.x as f64 + 1.0, cell.y as f64),
            v(cell.x as f64 + 1.0, cell.y as f64 + 1.0),
            v(cell.x as f64, cell.y as f64 + 1.0),
        ];
        let mut axes = vec![v(1.0, 0.0), v(0.0, 1.0)];
        for i in 0..hull.len() {
            let e = hull[(i + 1) % hull.len()] - hull[i];
            axes.push(v(-e.y, e.x));
        }
        axes.iter().all(|axis| {
            let project = |pts: &[DVec2]| {
                pts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    let d = p.dot(*axis);
                    (lo.min(d), hi.max(d))
                })
            };
            let (a_lo, a_hi) = project(hull);
            let (b_lo, b_hi) = project(&corners);
            a_hi > b_lo && b_hi > a_lo
        })
    }

    proptest! {
        #[test]
        fn prop_selected_tiles_match_exact_intersection(
            pts in prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), 3..9),
            cam in (-20.0f64..20.0, -20.0f64..20.0),
        ) {
            let points: Vec<DVec2> = pts.iter().map(|&(x, y)| v(x, y)).collect();
            let hull = convex_hull(&points);
            prop_assume!(hull.len() >= 3);

            let selected = tiles_in_convex_hull(&hull, v(cam.0, cam.1));
            let unique: HashSet<TileCoord> = selected.iter().copied().collect();
            prop_assert_eq!(unique.len(), selected.len());

            let mut expected = HashSet::new();
            for y in -21..21 {
                for x in -21..21 {
                    if cell_overlaps_hull(t(x, y), &hull) {
                        expected.insert(t(x, y));
                    }
                }
            }
            prop_assert_eq!(unique, expected);

            let camera = v(cam.0, cam.1);
            for pair in selected.windows(2) {
                let (ax, ay) = pair[0].center();
                let (bx, by) = pair[1].center();
                prop_assert!(v(ax, ay).distance(camera) <= v(bx, by).distance(camera));
            }
        }

        #[test]
        fn prop_grid_aligned_hulls_skip_touching_tiles(
            pts in prop::collection::vec((-10i32..10, -10i32..10), 3..9),
        ) {
            let points: Vec<DVec2> = pts.iter().map(|&(x, y)| v(x as f64, y as f64)).collect();
            let hull = convex_hull(&points);
            prop_assume!(hull.len() >= 3);

            let selected: HashSet<TileCoord> =
                tiles_in_convex_hull(&hull, v(0.0, 0.0)).into_iter().collect();

            let mut expected = HashSet::new();
            for y in -11..11 {
                for x in -11..11 {
                    if cell_overlaps_hull(t(x, y), &hull) {
                        expected.insert(t(x, y));
                    }
                }
            }
            prop_assert_eq!(selected, expected);
        }
    }
}
