//! Per-element feature extraction.
//!
//! Each handler looks at one resolved element and emits zero or more
//! features. Handlers never fail: elements they cannot interpret simply
//! produce nothing.

use glam::DVec2;
use tracing::trace;

use super::classify::{area_descriptor, node_descriptor, polyline_descriptor};
use super::graph::{GraphNode, GraphWay, OsmGraph};
use super::rings::{assemble_rings, is_closed};
use crate::geometry::signed_area;
use crate::vector::{
    OsmElementKind, OsmReference, RingKind, VectorArea, VectorAreaDescriptor, VectorAreaRing,
    VectorFeature, VectorNode, VectorPolyline,
};

/// Orients a closed ring: counter-clockwise for outer rings, clockwise for
/// inner rings.
fn oriented(mut vertices: Vec<DVec2>, kind: RingKind) -> Vec<DVec2> {
    let ccw = signed_area(&vertices) > 0.0;
    if ccw != (kind == RingKind::Outer) {
        vertices.reverse();
    }
    vertices
}

/// Features of a standalone node.
pub fn node_features(node: &GraphNode) -> Vec<VectorFeature> {
    let Some(descriptor) = node_descriptor(&node.tags) else {
        return Vec::new();
    };
    vec![VectorFeature::Node(VectorNode {
        position: node.position,
        descriptor,
        osm: Some(OsmReference::new(OsmElementKind::Node, node.id)),
    })]
}

/// Features of a way: an area when the way is closed and its tags describe
/// one, otherwise a polyline when its tags describe a line.
pub fn way_features(way: &GraphWay) -> Vec<VectorFeature> {
    let vertices = way.resolved_vertices();
    if vertices.len() < 2 {
        return Vec::new();
    }
    if !way.is_complete() {
        trace!(way = way.id, "Way has unresolved nodes");
    }
    let osm = Some(OsmReference::new(OsmElementKind::Way, way.id));

    if is_closed(&vertices) {
        if let Some(descriptor) = area_descriptor(&way.tags) {
            return vec![VectorFeature::Area(VectorArea {
                rings: vec![VectorAreaRing::new(
                    RingKind::Outer,
                    oriented(vertices, RingKind::Outer),
                )],
                descriptor,
                osm,
            })];
        }
    }

    match polyline_descriptor(&way.tags) {
        Some(descriptor) => vec![VectorFeature::Polyline(VectorPolyline {
            vertices,
            descriptor,
            osm,
        })],
        None => Vec::new(),
    }
}

fn role_ring_kind(relation_type: &str, role: &str) -> Option<RingKind> {
    match (relation_type, role) {
        ("multipolygon", "outer" | "") => Some(RingKind::Outer),
        ("multipolygon", "inner") => Some(RingKind::Inner),
        ("building", "outline") => Some(RingKind::Outer),
        _ => None,
    }
}

/// Features of a relation.
///
/// Multipolygon relations and building relations (through their `outline`
/// members) become one area whose rings are assembled from the member ways,
/// including ways of nested relations.
pub fn relation_features(graph: &OsmGraph, index: usize) -> Vec<VectorFeature> {
    let Some(relation) = graph.relations().get(index) else {
        return Vec::new();
    };
    let relation_type = relation.tags.get("type").map(String::as_str).unwrap_or("");
    if !matches!(relation_type, "multipolygon" | "building") {
        return Vec::new();
    }

    let mut descriptor: Option<VectorAreaDescriptor> = area_descriptor(&relation.tags);
    let mut outer = Vec::new();
    let mut inner = Vec::new();

    for membership in graph.member_ways(index) {
        let Some(kind) = role_ring_kind(relation_type, membership.role) else {
            continue;
        };
        // Old-style multipolygons keep their tags on the single outer way.
        if descriptor.is_none() && kind == RingKind::Outer {
            descriptor = area_descriptor(&membership.way.tags);
        }
        let vertices = membership.way.resolved_vertices();
        match kind {
            RingKind::Outer => outer.push(vertices),
            RingKind::Inner => inner.push(vertices),
        }
    }

    let Some(descriptor) = descriptor else {
        return Vec::new();
    };

    let mut rings: Vec<VectorAreaRing> = assemble_rings(outer)
        .into_iter()
        .map(|r| VectorAreaRing::new(RingKind::Outer, oriented(r, RingKind::Outer)))
        .collect();
    if rings.is_empty() {
        trace!(relation = relation.id, "Relation has no closed outer ring");
        return Vec::new();
    }
    rings.extend(
        assemble_rings(inner)
            .into_iter()
            .map(|r| VectorAreaRing::new(RingKind::Inner, oriented(r, RingKind::Inner))),
    );

    vec![VectorFeature::Area(VectorArea {
        rings,
        descriptor,
        osm: Some(OsmReference::new(OsmElementKind::Relation, relation.id)),
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::tags::Tags;
    use crate::vector::{AreaKind, PolylineKind};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn square_way(id: i64, tags: Tags, clockwise: bool) -> GraphWay {
        let mut pts = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(0.0, 0.0),
        ];
        if clockwise {
            pts.reverse();
        }
        GraphWay {
            id,
            vertices: pts.into_iter().map(Some).collect(),
            tags,
        }
    }

    #[test]
    fn test_closed_building_way_becomes_ccw_area() {
        let way = square_way(1, tags(&[("building", "yes")]), true);
        let features = way_features(&way);
        assert_eq!(features.len(), 1);
        let VectorFeature::Area(area) = &features[0] else {
            panic!("expected area");
        };
        assert_eq!(area.descriptor.kind, AreaKind::Building);
        assert!(signed_area(&area.rings[0].vertices) > 0.0);
        assert_eq!(area.osm, Some(OsmReference::new(OsmElementKind::Way, 1)));
    }

    #[test]
    fn test_closed_road_stays_polyline() {
        let way = square_way(1, tags(&[("highway", "residential")]), false);
        let features = way_features(&way);
        assert!(matches!(
            &features[..],
            [VectorFeature::Polyline(p)] if p.descriptor.kind == PolylineKind::Path
        ));
    }

    #[test]
    fn test_unresolved_vertices_are_filtered() {
        let way = GraphWay {
            id: 7,
            vertices: vec![Some(DVec2::ZERO), None, Some(DVec2::new(5.0, 0.0))],
            tags: tags(&[("barrier", "hedge")]),
        };
        let features = way_features(&way);
        let [VectorFeature::Polyline(p)] = &features[..] else {
            panic!("expected one polyline");
        };
        assert_eq!(p.vertices.len(), 2);
    }

    #[test]
    fn test_untagged_node_emits_nothing() {
        let node = GraphNode {
            id: 1,
            position: DVec2::ZERO,
            tags: Tags::new(),
        };
        assert!(node_features(&node).is_empty());
    }
}
