//! Identity-keyed element graph.
//!
//! Nodes, ways and relations are stored in input order in flat tables with
//! an id index each. An id repeated within its kind keeps its first
//! occurrence only. Way vertices and relation members are dereferenced once
//! when the graph is built; relation-to-relation membership is stored as an
//! edge and only walked on demand, with a visited set so that cyclic
//! membership terminates.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use tracing::debug;

use super::elements::{MemberKind, OsmElement, RelationMember};
use super::tags::Tags;
use crate::coord::degrees_to_meters;

/// A node with its position relative to the tile origin.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: i64,
    pub position: DVec2,
    pub tags: Tags,
}

/// A way with its vertices resolved.
///
/// A vertex is `None` when the way references a node missing from the
/// fetched data.
#[derive(Debug, Clone)]
pub struct GraphWay {
    pub id: i64,
    pub vertices: Vec<Option<DVec2>>,
    pub tags: Tags,
}

impl GraphWay {
    /// Resolved vertices, with missing nodes filtered out.
    pub fn resolved_vertices(&self) -> Vec<DVec2> {
        self.vertices.iter().flatten().copied().collect()
    }

    /// Whether every vertex resolved.
    pub fn is_complete(&self) -> bool {
        self.vertices.iter().all(Option::is_some)
    }
}

/// Target of a resolved relation member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTarget {
    Way(usize),
    Relation(usize),
}

/// A resolved relation member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphMember {
    pub target: MemberTarget,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct GraphRelation {
    pub id: i64,
    pub members: Vec<GraphMember>,
    pub tags: Tags,
}

/// A way reached from a relation, with the role it was referenced by.
#[derive(Debug, Clone, Copy)]
pub struct WayMembership<'a> {
    pub way: &'a GraphWay,
    pub role: &'a str,
}

/// Resolved element graph of one fetch.
#[derive(Debug, Default)]
pub struct OsmGraph {
    nodes: Vec<GraphNode>,
    ways: Vec<GraphWay>,
    relations: Vec<GraphRelation>,
    node_index: HashMap<i64, usize>,
    way_index: HashMap<i64, usize>,
    relation_index: HashMap<i64, usize>,
}

impl OsmGraph {
    /// Builds the graph from a flat element list.
    ///
    /// # Arguments
    ///
    /// * `elements` - Raw elements of one fetch, in any order
    /// * `origin` - World position (Mercator meters) of the tile's local origin
    pub fn build(elements: &[OsmElement], origin: DVec2) -> Self {
        let mut graph = Self::default();
        let mut pending_ways: Vec<(&i64, &Vec<i64>, &Tags)> = Vec::new();
        let mut pending_relations: Vec<(i64, Vec<&RelationMember>, &Tags)> = Vec::new();
        let mut seen_ways: HashSet<i64> = HashSet::new();
        let mut seen_relations: HashSet<i64> = HashSet::new();

        for element in elements {
            match element {
                OsmElement::Node { id, lat, lon, tags } => {
                    if graph.node_index.contains_key(id) {
                        continue;
                    }
                    let position = degrees_to_meters(*lat, *lon) - origin;
                    graph.node_index.insert(*id, graph.nodes.len());
                    graph.nodes.push(GraphNode {
                        id: *id,
                        position,
                        tags: tags.clone(),
                    });
                }
                OsmElement::Way { id, nodes, tags } => {
                    if seen_ways.insert(*id) {
                        pending_ways.push((id, nodes, tags));
                    }
                }
                OsmElement::Relation { id, members, tags } => {
                    if !seen_relations.insert(*id) {
                        continue;
                    }
                    let members: Vec<&RelationMember> = members
                        .iter()
                        .filter(|m| matches!(m.kind, MemberKind::Way | MemberKind::Relation))
                        .collect();
                    if members.is_empty() {
                        continue;
                    }
                    pending_relations.push((*id, members, tags));
                }
            }
        }

        for (id, node_ids, tags) in pending_ways {
            let vertices = node_ids
                .iter()
                .map(|node_id| graph.node_index.get(node_id).map(|&i| graph.nodes[i].position))
                .collect();
            graph.way_index.insert(*id, graph.ways.len());
            graph.ways.push(GraphWay {
                id: *id,
                vertices,
                tags: tags.clone(),
            });
        }

        for (index, (id, _, tags)) in pending_relations.iter().enumerate() {
            graph.relation_index.insert(*id, index);
            graph.relations.push(GraphRelation {
                id: *id,
                members: Vec::new(),
                tags: (*tags).clone(),
            });
        }

        for (index, (id, members, _)) in pending_relations.iter().enumerate() {
            let resolved: Vec<GraphMember> = members
                .iter()
                .filter_map(|member| {
                    let target = match member.kind {
                        MemberKind::Way => graph.way_index.get(&member.id).map(|&i| MemberTarget::Way(i)),
                        MemberKind::Relation => graph
                            .relation_index
                            .get(&member.id)
                            .map(|&i| MemberTarget::Relation(i)),
                        MemberKind::Node => None,
                    };
                    if target.is_none() {
                        debug!(
                            relation = id,
                            member = member.id,
                            kind = ?member.kind,
                            "Skipping unresolved relation member"
                        );
                    }
                    target.map(|target| GraphMember {
                        target,
                        role: member.role.clone(),
                    })
                })
                .collect();
            graph.relations[index].members = resolved;
        }

        graph
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn ways(&self) -> &[GraphWay] {
        &self.ways
    }

    pub fn relations(&self) -> &[GraphRelation] {
        &self.relations
    }

    pub fn node(&self, id: i64) -> Option<&GraphNode> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn way(&self, id: i64) -> Option<&GraphWay> {
        self.way_index.get(&id).map(|&i| &self.ways[i])
    }

    pub fn relation(&self, id: i64) -> Option<&GraphRelation> {
        self.relation_index.get(&id).map(|&i| &self.relations[i])
    }

    /// Ways reachable from a relation, in member order.
    ///
    /// Nested relations are walked depth first. Each relation is entered at
    /// most once, so cyclic membership (including a relation listing itself)
    /// terminates and contributes only the ways reachable without revisiting.
    pub fn member_ways(&self, relation: usize) -> Vec<WayMembership<'_>> {
        let mut out = Vec::new();
        if relation >= self.relations.len() {
            return out;
        }

        let mut visited: HashSet<usize> = HashSet::new();
        // (relation, next member position)
        let mut stack: Vec<(usize, usize)> = vec![(relation, 0)];
        visited.insert(relation);

        while let Some((current, position)) = stack.pop() {
            let members = &self.relations[current].members;
            let Some(member) = members.get(position) else {
                continue;
            };
            stack.push((current, position + 1));

            match member.target {
                MemberTarget::Way(way) => out.push(WayMembership {
                    way: &self.ways[way],
                    role: &member.role,
                }),
                MemberTarget::Relation(nested) => {
                    if visited.insert(nested) {
                        stack.push((nested, 0));
                    } else {
                        debug!(
                            relation = self.relations[current].id,
                            nested = self.relations[nested].id,
                            "Skipping already visited relation member"
                        );
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::elements::RelationMember;

    fn node(id: i64, lat: f64, lon: f64) -> OsmElement {
        OsmElement::Node {
            id,
            lat,
            lon,
            tags: Tags::new(),
        }
    }

    fn way(id: i64, nodes: Vec<i64>) -> OsmElement {
        OsmElement::Way {
            id,
            nodes,
            tags: Tags::new(),
        }
    }

    fn member(kind: MemberKind, id: i64, role: &str) -> RelationMember {
        RelationMember {
            kind,
            id,
            role: role.to_string(),
        }
    }

    fn relation(id: i64, members: Vec<RelationMember>) -> OsmElement {
        OsmElement::Relation {
            id,
            members,
            tags: Tags::new(),
        }
    }

    #[test]
    fn test_positions_are_relative_to_origin() {
        let origin = degrees_to_meters(0.0, 0.0);
        let graph = OsmGraph::build(&[node(1, 0.0, 0.001)], origin);
        let p = graph.node(1).unwrap().position;
        assert!((p.x - 111.319_490_8).abs() < 1e-3, "got {}", p.x);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn test_missing_node_yields_absent_vertex() {
        let graph = OsmGraph::build(&[node(1, 0.0, 0.0), way(10, vec![1, 99, 1])], DVec2::ZERO);
        let w = graph.way(10).unwrap();
        assert_eq!(w.vertices.len(), 3);
        assert!(w.vertices[1].is_none());
        assert!(!w.is_complete());
        assert_eq!(w.resolved_vertices().len(), 2);
    }

    #[test]
    fn test_way_before_nodes_in_input_still_resolves() {
        let graph = OsmGraph::build(&[way(10, vec![1]), node(1, 0.0, 0.0)], DVec2::ZERO);
        assert!(graph.way(10).unwrap().is_complete());
    }

    #[test]
    fn test_unresolved_members_skipped() {
        let graph = OsmGraph::build(
            &[
                way(10, vec![]),
                relation(
                    100,
                    vec![
                        member(MemberKind::Way, 10, "outer"),
                        member(MemberKind::Way, 11, "outer"),
                        member(MemberKind::Relation, 555, ""),
                    ],
                ),
            ],
            DVec2::ZERO,
        );
        assert_eq!(graph.relation(100).unwrap().members.len(), 1);
    }

    #[test]
    fn test_relation_without_way_members_is_dropped() {
        let graph = OsmGraph::build(
            &[node(1, 0.0, 0.0), relation(100, vec![member(MemberKind::Node, 1, "label")])],
            DVec2::ZERO,
        );
        assert!(graph.relation(100).is_none());
        assert!(graph.relations().is_empty());
    }

    #[test]
    fn test_repeated_elements_keep_first_occurrence() {
        let graph = OsmGraph::build(
            &[
                node(1, 0.0, 0.0),
                way(10, vec![1]),
                relation(100, vec![member(MemberKind::Way, 10, "outer")]),
                node(1, 1.0, 1.0),
                way(10, vec![1, 1]),
                relation(100, vec![member(MemberKind::Way, 10, "inner")]),
            ],
            DVec2::ZERO,
        );
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.ways().len(), 1);
        assert_eq!(graph.relations().len(), 1);
        assert_eq!(graph.node(1).unwrap().position, DVec2::ZERO);
        assert_eq!(graph.way(10).unwrap().vertices.len(), 1);
        assert_eq!(graph.member_ways(0)[0].role, "outer");
    }

    #[test]
    fn test_self_reference_terminates() {
        let graph = OsmGraph::build(
            &[
                way(10, vec![]),
                relation(
                    100,
                    vec![
                        member(MemberKind::Way, 10, "outer"),
                        member(MemberKind::Relation, 100, ""),
                    ],
                ),
            ],
            DVec2::ZERO,
        );
        let ways = graph.member_ways(0);
        assert_eq!(ways.len(), 1);
        assert_eq!(ways[0].way.id, 10);
        assert_eq!(ways[0].role, "outer");
    }

    #[test]
    fn test_nested_cycle_visits_each_relation_once() {
        let graph = OsmGraph::build(
            &[
                way(10, vec![]),
                way(11, vec![]),
                relation(
                    100,
                    vec![
                        member(MemberKind::Way, 10, "outer"),
                        member(MemberKind::Relation, 200, ""),
                    ],
                ),
                relation(
                    200,
                    vec![
                        member(MemberKind::Relation, 100, ""),
                        member(MemberKind::Way, 11, "inner"),
                    ],
                ),
            ],
            DVec2::ZERO,
        );
        let ids: Vec<(i64, &str)> = graph
            .member_ways(0)
            .iter()
            .map(|m| (m.way.id, m.role))
            .collect();
        assert_eq!(ids, vec![(10, "outer"), (11, "inner")]);
    }
}
