//! Grid rasterization in tile space.

use glam::DVec2;

use crate::coord::TileCoord;

/// Tolerance used to detect a segment passing exactly through a grid corner.
const CORNER_EPSILON: f64 = 1e-9;

/// Returns every tile cell a segment passes through (supercover).
///
/// Walks the grid from the cell containing `a` to the cell containing `b`
/// one boundary crossing at a time. When the segment crosses a grid corner,
/// both cells adjacent to that corner are included as well, so the result
/// covers every unit cell the segment touches. Cells are returned in
/// traversal order and may contain no duplicates.
pub fn tiles_on_segment(a: DVec2, b: DVec2) -> Vec<TileCoord> {
    let mut x = a.x.floor() as i32;
    let mut y = a.y.floor() as i32;
    let end_x = b.x.floor() as i32;
    let end_y = b.y.floor() as i32;

    let d = b - a;
    let step_x = axis_step(d.x);
    let step_y = axis_step(d.y);

    let t_delta_x = if step_x != 0 { 1.0 / d.x.abs() } else { f64::INFINITY };
    let t_delta_y = if step_y != 0 { 1.0 / d.y.abs() } else { f64::INFINITY };

    let mut t_max_x = first_crossing(a.x, x, step_x, d.x);
    let mut t_max_y = first_crossing(a.y, y, step_y, d.y);

    let mut cells = vec![TileCoord::new(x, y)];
    let mut remaining = (end_x - x).unsigned_abs() + (end_y - y).unsigned_abs();

    while remaining > 0 {
        if (t_max_x - t_max_y).abs() < CORNER_EPSILON && remaining >= 2 {
            // Through a corner: the two side cells are touched too.
            cells.push(TileCoord::new(x + step_x, y));
            cells.push(TileCoord::new(x, y + step_y));
            x += step_x;
            y += step_y;
            t_max_x += t_delta_x;
            t_max_y += t_delta_y;
            remaining -= 2;
        } else if t_max_x < t_max_y {
            x += step_x;
            t_max_x += t_delta_x;
            remaining -= 1;
        } else {
            y += step_y;
            t_max_y += t_delta_y;
            remaining -= 1;
        }
        cells.push(TileCoord::new(x, y));
    }

    cells
}

#[inline]
fn axis_step(delta: f64) -> i32 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// Parametric distance along the segment to the first grid line crossing.
#[inline]
fn first_crossing(start: f64, cell: i32, step: i32, delta: f64) -> f64 {
    match step {
        1 => ((cell + 1) as f64 - start) / delta,
        -1 => (cell as f64 - start) / delta,
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    fn t(x: i32, y: i32) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn test_single_cell() {
        assert_eq!(tiles_on_segment(v(0.2, 0.3), v(0.8, 0.9)), vec![t(0, 0)]);
    }

    #[test]
    fn test_horizontal_segment() {
        assert_eq!(
            tiles_on_segment(v(0.5, 2.5), v(3.5, 2.5)),
            vec![t(0, 2), t(1, 2), t(2, 2), t(3, 2)]
        );
    }

    #[test]
    fn test_reverse_direction() {
        assert_eq!(
            tiles_on_segment(v(2.5, 0.5), v(0.5, 0.5)),
            vec![t(2, 0), t(1, 0), t(0, 0)]
        );
    }

    #[test]
    fn test_diagonal_through_corner_is_supercover() {
        let cells = tiles_on_segment(v(0.5, 0.5), v(1.5, 1.5));
        assert_eq!(cells.len(), 4);
        for c in [t(0, 0), t(1, 0), t(0, 1), t(1, 1)] {
            assert!(cells.contains(&c), "missing {}", c);
        }
    }

    #[test]
    fn test_shallow_diagonal() {
        let cells = tiles_on_segment(v(0.1, 0.1), v(3.9, 0.9));
        assert_eq!(cells, vec![t(0, 0), t(1, 0), t(2, 0), t(3, 0)]);

        let cells = tiles_on_segment(v(0.1, 0.3), v(3.9, 1.8));
        assert_eq!(cells.first(), Some(&t(0, 0)));
        assert_eq!(cells.last(), Some(&t(3, 1)));
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn test_negative_coordinates() {
        let cells = tiles_on_segment(v(-1.5, -0.5), v(0.5, -0.5));
        assert_eq!(cells, vec![t(-2, -1), t(-1, -1), t(0, -1)]);
    }
}
