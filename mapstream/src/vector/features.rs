//! Vector feature model.

use glam::DVec2;
use serde::Serialize;

use super::descriptors::{VectorAreaDescriptor, VectorNodeDescriptor, VectorPolylineDescriptor};

/// Kind of raw map element a feature was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmElementKind {
    Node,
    Way,
    Relation,
}

/// Back-reference from a feature to its source element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OsmReference {
    pub kind: OsmElementKind,
    pub id: i64,
}

impl OsmReference {
    pub fn new(kind: OsmElementKind, id: i64) -> Self {
        Self { kind, id }
    }
}

/// A point feature in tile-local meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorNode {
    pub position: DVec2,
    pub descriptor: VectorNodeDescriptor,
    pub osm: Option<OsmReference>,
}

/// A line feature in tile-local meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPolyline {
    pub vertices: Vec<DVec2>,
    pub descriptor: VectorPolylineDescriptor,
    pub osm: Option<OsmReference>,
}

/// Role of an area ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingKind {
    Outer,
    Inner,
}

/// A closed ring of an area. The first vertex is repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorAreaRing {
    pub kind: RingKind,
    pub vertices: Vec<DVec2>,
}

impl VectorAreaRing {
    pub fn new(kind: RingKind, vertices: Vec<DVec2>) -> Self {
        Self { kind, vertices }
    }
}

/// An area feature in tile-local meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorArea {
    pub rings: Vec<VectorAreaRing>,
    pub descriptor: VectorAreaDescriptor,
    pub osm: Option<OsmReference>,
}

impl VectorArea {
    /// Outer rings of this area.
    pub fn outer_rings(&self) -> impl Iterator<Item = &VectorAreaRing> {
        self.rings.iter().filter(|r| r.kind == RingKind::Outer)
    }

    /// Every vertex of every ring.
    pub fn vertices(&self) -> impl Iterator<Item = &DVec2> {
        self.rings.iter().flat_map(|r| r.vertices.iter())
    }
}

/// A single feature emitted by an element handler.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorFeature {
    Node(VectorNode),
    Polyline(VectorPolyline),
    Area(VectorArea),
}

/// Point, line and area features of one tile, each in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VectorFeatureCollection {
    pub nodes: Vec<VectorNode>,
    pub polylines: Vec<VectorPolyline>,
    pub areas: Vec<VectorArea>,
}

impl VectorFeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature to the sequence of its category.
    pub fn push(&mut self, feature: VectorFeature) {
        match feature {
            VectorFeature::Node(n) => self.nodes.push(n),
            VectorFeature::Polyline(p) => self.polylines.push(p),
            VectorFeature::Area(a) => self.areas.push(a),
        }
    }

    /// Appends every category of `other` after this collection's features.
    pub fn append(&mut self, other: VectorFeatureCollection) {
        self.nodes.extend(other.nodes);
        self.polylines.extend(other.polylines);
        self.areas.extend(other.areas);
    }

    /// Concatenates collections category by category, in iteration order.
    pub fn concat(collections: impl IntoIterator<Item = VectorFeatureCollection>) -> Self {
        collections
            .into_iter()
            .fold(Self::default(), |mut merged, c| {
                merged.append(c);
                merged
            })
    }

    /// Total number of features.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.polylines.len() + self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<VectorFeature> for VectorFeatureCollection {
    fn extend<I: IntoIterator<Item = VectorFeature>>(&mut self, iter: I) {
        for feature in iter {
            self.push(feature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::descriptors::{AreaKind, NodeKind};

    fn node(id: i64) -> VectorNode {
        VectorNode {
            position: DVec2::ZERO,
            descriptor: VectorNodeDescriptor {
                kind: Some(NodeKind::Tree),
                ..Default::default()
            },
            osm: Some(OsmReference::new(OsmElementKind::Node, id)),
        }
    }

    #[test]
    fn test_push_routes_by_category() {
        let mut c = VectorFeatureCollection::new();
        c.push(VectorFeature::Node(node(1)));
        c.push(VectorFeature::Area(VectorArea {
            rings: vec![],
            descriptor: VectorAreaDescriptor::new(AreaKind::Water),
            osm: None,
        }));
        assert_eq!(c.nodes.len(), 1);
        assert_eq!(c.areas.len(), 1);
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
    }

    #[test]
    fn test_concat_preserves_order() {
        let mut a = VectorFeatureCollection::new();
        a.nodes.push(node(1));
        a.nodes.push(node(2));
        let mut b = VectorFeatureCollection::new();
        b.nodes.push(node(3));

        let merged = VectorFeatureCollection::concat([a, b]);
        let ids: Vec<i64> = merged.nodes.iter().filter_map(|n| n.osm.map(|r| r.id)).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
