//! Closed ring assembly from way fragments.
//!
//! Multipolygon members frequently split one ring across several ways. The
//! fragments are joined end to end (reversing them where needed) until each
//! chain closes on itself.

use glam::DVec2;

/// Endpoints closer than this are considered the same point, in meters.
const JOIN_EPSILON: f64 = 1e-3;

fn same_point(a: DVec2, b: DVec2) -> bool {
    a.distance_squared(b) <= JOIN_EPSILON * JOIN_EPSILON
}

/// Whether a vertex chain is a closed ring (first vertex repeated last).
pub fn is_closed(vertices: &[DVec2]) -> bool {
    vertices.len() >= 4
        && matches!((vertices.first(), vertices.last()), (Some(&a), Some(&b)) if same_point(a, b))
}

/// Joins fragments into closed rings.
///
/// Already closed fragments are returned as they are. Open fragments are
/// greedily chained by matching endpoints; chains that never close are
/// dropped.
pub fn assemble_rings(fragments: Vec<Vec<DVec2>>) -> Vec<Vec<DVec2>> {
    let mut rings = Vec::new();
    let mut open: Vec<Vec<DVec2>> = Vec::new();

    for fragment in fragments {
        if fragment.len() < 2 {
            continue;
        }
        if is_closed(&fragment) {
            rings.push(fragment);
        } else {
            open.push(fragment);
        }
    }

    while let Some(mut chain) = open.pop() {
        loop {
            if is_closed(&chain) {
                rings.push(chain);
                break;
            }

            let Some(&tail) = chain.last() else {
                break;
            };
            let next = open.iter().position(|f| {
                matches!(f.first(), Some(&p) if same_point(p, tail))
                    || matches!(f.last(), Some(&p) if same_point(p, tail))
            });

            let Some(index) = next else {
                break;
            };
            let mut fragment = open.swap_remove(index);
            if !matches!(fragment.first(), Some(&p) if same_point(p, tail)) {
                fragment.reverse();
            }
            chain.extend(fragment.into_iter().skip(1));
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_closed_fragment_passes_through() {
        let square = vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 0.0)];
        let rings = assemble_rings(vec![square.clone()]);
        assert_eq!(rings, vec![square]);
    }

    #[test]
    fn test_joins_fragments_with_reversal() {
        let a = vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)];
        // Stored backwards relative to `a`.
        let b = vec![v(0.0, 0.0), v(0.0, 10.0), v(10.0, 10.0)];
        let rings = assemble_rings(vec![a, b]);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert!(is_closed(ring));
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn test_unclosable_chain_is_dropped() {
        let a = vec![v(0.0, 0.0), v(10.0, 0.0)];
        let b = vec![v(10.0, 0.0), v(10.0, 10.0)];
        assert!(assemble_rings(vec![a, b]).is_empty());
    }

    #[test]
    fn test_degenerate_fragments_ignored() {
        assert!(assemble_rings(vec![vec![], vec![v(1.0, 1.0)]]).is_empty());
    }
}
