//! Post-merge cleanup of area features.
//!
//! Only categories with authoritative outlines (see
//! [`AreaKind::requires_authoritative_outline`]) are touched; every other
//! area passes through unchanged and in order.

use glam::DVec2;
use tracing::trace;

use super::descriptors::AreaKind;
use super::features::{VectorArea, VectorFeatureCollection};
use crate::geometry::{ring_contains_ring, Bounds};

/// Clipping then outline deduplication.
pub fn reconcile(mut collection: VectorFeatureCollection, tile_size: f64) -> VectorFeatureCollection {
    let areas = clip_authoritative(std::mem::take(&mut collection.areas), tile_size);
    collection.areas = dedupe_outlines(areas);
    collection
}

fn inside_tile(p: &DVec2, tile_size: f64) -> bool {
    p.x >= 0.0 && p.x < tile_size && p.y >= 0.0 && p.y < tile_size
}

/// Drops authoritative areas with no vertex inside `[0, tile_size)²`.
///
/// Such areas belong to a neighboring tile and were only returned because
/// the provider's query overlaps it.
pub fn clip_authoritative(areas: Vec<VectorArea>, tile_size: f64) -> Vec<VectorArea> {
    areas
        .into_iter()
        .filter(|area| {
            let keep = !area.descriptor.kind.requires_authoritative_outline()
                || area.vertices().any(|p| inside_tile(p, tile_size));
            if !keep {
                trace!(osm = ?area.osm, "Clipping area outside tile bounds");
            }
            keep
        })
        .collect()
}

struct Outline<'a> {
    kind: AreaKind,
    rings: Vec<&'a [DVec2]>,
    bounds: Bounds,
}

impl<'a> Outline<'a> {
    fn of(area: &'a VectorArea) -> Option<Self> {
        let kind = area.descriptor.kind;
        if !kind.requires_authoritative_outline() {
            return None;
        }
        let rings: Vec<&[DVec2]> = area
            .outer_rings()
            .map(|r| r.vertices.as_slice())
            .filter(|r| !r.is_empty())
            .collect();
        let points: Vec<DVec2> = rings.iter().flat_map(|r| r.iter().copied()).collect();
        let bounds = Bounds::of(&points)?;
        Some(Self {
            kind,
            rings,
            bounds,
        })
    }

    /// Whether every outer ring of `other` lies inside one of ours.
    fn contains(&self, other: &Outline<'_>) -> bool {
        self.kind == other.kind
            && self.bounds.contains(&other.bounds)
            && other
                .rings
                .iter()
                .all(|inner| self.rings.iter().any(|outer| ring_contains_ring(outer, inner)))
    }
}

/// Removes authoritative areas whose outline lies within another area of the
/// same category.
///
/// When two outlines contain each other (identical footprints) the earlier
/// one is kept. Partial overlaps are left alone.
pub fn dedupe_outlines(areas: Vec<VectorArea>) -> Vec<VectorArea> {
    let discard: Vec<bool> = {
        let outlines: Vec<Option<Outline<'_>>> = areas.iter().map(Outline::of).collect();
        outlines
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let Some(candidate) = candidate else {
                    return false;
                };
                outlines.iter().enumerate().any(|(j, other)| {
                    let Some(other) = other else {
                        return false;
                    };
                    i != j
                        && other.contains(candidate)
                        && !(j > i && candidate.contains(other))
                })
            })
            .collect()
    };

    areas
        .into_iter()
        .zip(discard)
        .filter_map(|(area, discard)| {
            if discard {
                trace!(osm = ?area.osm, "Dropping duplicate outline");
                None
            } else {
                Some(area)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::descriptors::{BuildingAttributes, VectorAreaDescriptor};
    use crate::vector::features::{OsmElementKind, OsmReference, RingKind, VectorAreaRing};

    fn square(min: f64, max: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(min, min),
            DVec2::new(max, min),
            DVec2::new(max, max),
            DVec2::new(min, max),
            DVec2::new(min, min),
        ]
    }

    fn area(id: i64, kind: AreaKind, ring: Vec<DVec2>) -> VectorArea {
        let descriptor = if kind.requires_authoritative_outline() {
            VectorAreaDescriptor::building(kind, BuildingAttributes::default())
        } else {
            VectorAreaDescriptor::new(kind)
        };
        VectorArea {
            rings: vec![VectorAreaRing::new(RingKind::Outer, ring)],
            descriptor,
            osm: Some(OsmReference::new(OsmElementKind::Way, id)),
        }
    }

    fn ids(areas: &[VectorArea]) -> Vec<i64> {
        areas.iter().filter_map(|a| a.osm.map(|r| r.id)).collect()
    }

    #[test]
    fn test_clip_drops_outside_buildings_only() {
        let areas = vec![
            area(1, AreaKind::Building, square(-50.0, -10.0)),
            area(2, AreaKind::Building, square(-10.0, 10.0)),
            area(3, AreaKind::Water, square(-50.0, -10.0)),
            area(4, AreaKind::Building, square(100.0, 120.0)),
        ];
        let kept = clip_authoritative(areas, 100.0);
        assert_eq!(ids(&kept), vec![2, 3]);
    }

    #[test]
    fn test_clip_upper_bound_is_exclusive() {
        let areas = vec![area(1, AreaKind::Building, square(100.0, 110.0))];
        assert!(clip_authoritative(areas, 100.0).is_empty());
    }

    #[test]
    fn test_contained_outline_is_dropped() {
        let areas = vec![
            area(1, AreaKind::Building, square(2.0, 4.0)),
            area(2, AreaKind::Building, square(0.0, 10.0)),
        ];
        assert_eq!(ids(&dedupe_outlines(areas)), vec![2]);
    }

    #[test]
    fn test_identical_outlines_keep_first() {
        let areas = vec![
            area(1, AreaKind::Building, square(0.0, 10.0)),
            area(2, AreaKind::Building, square(0.0, 10.0)),
            area(3, AreaKind::Building, square(0.0, 10.0)),
        ];
        assert_eq!(ids(&dedupe_outlines(areas)), vec![1]);
    }

    #[test]
    fn test_partial_overlap_keeps_both() {
        let areas = vec![
            area(1, AreaKind::Building, square(0.0, 10.0)),
            area(2, AreaKind::Building, square(5.0, 15.0)),
        ];
        assert_eq!(ids(&dedupe_outlines(areas)), vec![1, 2]);
    }

    #[test]
    fn test_different_categories_are_independent() {
        let areas = vec![
            area(1, AreaKind::Building, square(0.0, 10.0)),
            area(2, AreaKind::BuildingPart, square(2.0, 4.0)),
            area(3, AreaKind::Water, square(2.0, 4.0)),
            area(4, AreaKind::Water, square(2.0, 4.0)),
        ];
        assert_eq!(ids(&dedupe_outlines(areas)), vec![1, 2, 3, 4]);
    }
}
