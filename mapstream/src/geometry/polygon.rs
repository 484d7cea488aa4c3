//! Polygon predicates used by feature reconciliation.

use glam::DVec2;

/// Distance under which a point counts as lying on a polygon edge.
const EDGE_EPSILON: f64 = 1e-6;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Bounding box of a point set, `None` when empty.
    pub fn of(points: &[DVec2]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            bounds.min = bounds.min.min(*p);
            bounds.max = bounds.max.max(*p);
        }
        Some(bounds)
    }

    /// Whether `other` lies fully inside this box (inclusive).
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min.x >= self.min.x - EDGE_EPSILON
            && other.min.y >= self.min.y - EDGE_EPSILON
            && other.max.x <= self.max.x + EDGE_EPSILON
            && other.max.y <= self.max.y + EDGE_EPSILON
    }
}

/// Strips the closing vertex of a ring if it repeats the first one.
pub fn open_ring(ring: &[DVec2]) -> &[DVec2] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Whether `p` lies on the segment `a`–`b`.
fn on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a) <= EDGE_EPSILON;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t) <= EDGE_EPSILON
}

/// Point-in-polygon test that treats the boundary as inside.
///
/// `ring` may be open or closed; orientation does not matter.
pub fn point_in_ring(p: DVec2, ring: &[DVec2]) -> bool {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return ring.iter().any(|v| v.distance(p) <= EDGE_EPSILON);
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if on_segment(p, a, b) {
            return true;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether every vertex of `inner` lies inside or on `outer`.
///
/// Identical rings contain each other.
pub fn ring_contains_ring(outer: &[DVec2], inner: &[DVec2]) -> bool {
    let inner = open_ring(inner);
    if inner.is_empty() {
        return false;
    }
    match (Bounds::of(outer), Bounds::of(inner)) {
        (Some(ob), Some(ib)) if ob.contains(&ib) => {}
        _ => return false,
    }
    inner.iter().all(|p| point_in_ring(*p, outer))
}

/// Signed area of a ring (positive when counter-clockwise).
pub fn signed_area(ring: &[DVec2]) -> f64 {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}
