//! Planar convex hull.

use glam::DVec2;

/// Z component of the cross product `(a - o) × (b - o)`.
///
/// Positive when `o → a → b` turns counter-clockwise.
#[inline]
pub fn cross(o: DVec2, a: DVec2, b: DVec2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Computes the convex hull of a point set (monotone chain).
///
/// Returns hull vertices in counter-clockwise order without repeating the
/// first vertex. Collinear points on hull edges are dropped, so a square
/// always yields exactly four vertices. Degenerate inputs return what is
/// left after removing duplicates: one point, or the two extreme points of a
/// collinear set.
pub fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut sorted: Vec<DVec2> = points
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<DVec2> = Vec::with_capacity(sorted.len() * 2);

    // Lower chain
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper chain
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    // Last point equals the first one.
    hull.pop();
    hull
}

/// Whether a convex polygon and the unit cell with minimum corner `cell`
/// overlap with positive area.
///
/// Separating-axis test over the two grid axes and every hull edge normal.
/// Shapes that only share an edge or a corner do not overlap. `hull` must be
/// convex with at least three vertices.
pub fn convex_overlaps_cell(hull: &[DVec2], cell: DVec2) -> bool {
    let corners = [
        cell,
        cell + DVec2::X,
        cell + DVec2::ONE,
        cell + DVec2::Y,
    ];
    let separated = |axis: DVec2| {
        let (hull_lo, hull_hi) = project(hull, axis);
        let (cell_lo, cell_hi) = project(&corners, axis);
        hull_hi <= cell_lo || cell_hi <= hull_lo
    };

    if separated(DVec2::X) || separated(DVec2::Y) {
        return false;
    }
    !(0..hull.len()).any(|i| {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        separated(edge.perp())
    })
}

#[inline]
fn project(points: &[DVec2], axis: DVec2) -> (f64, f64) {
    points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            let d = p.dot(axis);
            (lo.min(d), hi.max(d))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_square_with_interior_points() {
        let points = [
            v(0.0, 0.0),
            v(1.0, 1.0),
            v(2.0, 0.0),
            v(0.5, 0.5),
            v(2.0, 2.0),
            v(0.0, 2.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        for corner in [v(0.0, 0.0), v(2.0, 0.0), v(2.0, 2.0), v(0.0, 2.0)] {
            assert!(hull.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn test_hull_is_counter_clockwise() {
        let hull = convex_hull(&[v(0.0, 0.0), v(4.0, 0.0), v(4.0, 3.0), v(0.0, 3.0)]);
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            let c = hull[(i + 2) % hull.len()];
            assert!(cross(a, b, c) > 0.0);
        }
    }

    #[test]
    fn test_collinear_points_are_dropped() {
        let hull = convex_hull(&[v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(1.0, 1.0)]);
        assert_eq!(hull.len(), 3);
        assert!(!hull.contains(&v(1.0, 0.0)));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&[v(1.0, 1.0), v(1.0, 1.0)]), vec![v(1.0, 1.0)]);

        let line = convex_hull(&[v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)]);
        assert_eq!(line, vec![v(0.0, 0.0), v(2.0, 2.0)]);
    }

    #[test]
    fn test_cell_overlap_excludes_shared_edges_and_corners() {
        let square = convex_hull(&[v(5.0, 5.0), v(7.0, 5.0), v(7.0, 7.0), v(5.0, 7.0)]);
        assert!(convex_overlaps_cell(&square, v(5.0, 5.0)));
        assert!(convex_overlaps_cell(&square, v(6.0, 6.0)));
        assert!(!convex_overlaps_cell(&square, v(7.0, 5.0)), "shares an edge");
        assert!(!convex_overlaps_cell(&square, v(7.0, 7.0)), "shares a corner");

        let triangle = convex_hull(&[v(0.5, 0.5), v(1.5, 1.5), v(0.5, 1.5)]);
        assert!(convex_overlaps_cell(&triangle, v(0.0, 0.0)));
        assert!(convex_overlaps_cell(&triangle, v(1.0, 1.0)));
        assert!(!convex_overlaps_cell(&triangle, v(1.0, 0.0)), "touches at (1, 1) only");
    }

    #[test]
    fn test_non_finite_points_are_ignored() {
        let hull = convex_hull(&[
            v(0.0, 0.0),
            v(f64::NAN, 1.0),
            v(1.0, 0.0),
            v(0.0, 1.0),
        ]);
        assert_eq!(hull.len(), 3);
    }
}
