//! Raw map elements as returned by graph-query and vector-tile endpoints.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::tags::Tags;
use crate::vector::OsmElementKind;

/// A member reference of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub kind: MemberKind,
    #[serde(rename = "ref")]
    pub id: i64,
    #[serde(default)]
    pub role: String,
}

/// Kind of element a relation member points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Node,
    Way,
    Relation,
}

/// A raw map element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: Tags,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: Tags,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RelationMember>,
        #[serde(default)]
        tags: Tags,
    },
}

impl OsmElement {
    pub fn id(&self) -> i64 {
        match self {
            OsmElement::Node { id, .. } | OsmElement::Way { id, .. } | OsmElement::Relation { id, .. } => {
                *id
            }
        }
    }

    pub fn kind(&self) -> OsmElementKind {
        match self {
            OsmElement::Node { .. } => OsmElementKind::Node,
            OsmElement::Way { .. } => OsmElementKind::Way,
            OsmElement::Relation { .. } => OsmElementKind::Relation,
        }
    }
}

/// Response body of a graph query or cached tile request.
///
/// Endpoints report failures in-band through `error` (cached tile server)
/// or `remark` (Overpass runtime errors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    #[serde(default)]
    pub elements: Vec<OsmElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ElementSet {
    pub fn new(elements: Vec<OsmElement>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// Whether the endpoint reported an in-band error.
    pub fn reported_error(&self) -> Option<String> {
        match (&self.error, &self.remark) {
            (Some(err), _) if !err.is_null() && err != &serde_json::Value::Bool(false) => {
                Some(err.to_string())
            }
            (_, Some(remark)) if remark.contains("error") => Some(remark.clone()),
            _ => None,
        }
    }
}

/// Merges `patch` into `base`, appending only elements whose `(kind, id)` is
/// not already present in `base`.
pub fn merge_element_sets(mut base: ElementSet, patch: ElementSet) -> ElementSet {
    let mut known: HashSet<(OsmElementKind, i64)> =
        base.elements.iter().map(|e| (e.kind(), e.id())).collect();

    for element in patch.elements {
        if known.insert((element.kind(), element.id())) {
            base.elements.push(element);
        }
    }
    base
}
