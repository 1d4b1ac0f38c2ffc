//! Matching graphs explaining why two frames align.
//!
//! Every variant starts from two node corpora (the LUs or FEs of the left and right frame). LU
//! variants route them through intermediate nodes (synsets or vector neighbors) built by
//! [`connect`]; the FE variant links same-name elements directly.

use crate::document::{Frame, FrameElement, LexicalUnit, Resources};
use crate::scoring::{NeighborFilter, ScoringKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Left,
    Right,
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// LU gid, FE name, synset id or vector id.
    pub key: String,
    pub name: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub is_matching_node: bool,
    pub is_reference_node: bool,
    pub has_left_source: bool,
    pub has_right_source: bool,
    /// Only set on intermediate nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_intersection: Option<bool>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GraphNode {
    fn new(kind: NodeKind, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            name: name.into(),
            in_degree: 0,
            out_degree: 0,
            is_matching_node: false,
            is_reference_node: false,
            has_left_source: false,
            has_right_source: false,
            is_intersection: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn from_lexical_unit(kind: NodeKind, lu: &LexicalUnit) -> Self {
        Self::new(kind, lu.gid.as_str(), lu.name.as_str())
    }

    pub fn from_frame_element(kind: NodeKind, fe: &FrameElement) -> Self {
        Self::new(kind, fe.name.as_str(), fe.name.as_str())
    }

    pub fn intermediate(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Intermediate, key, name)
    }

    pub fn is_intersection(&self) -> bool {
        self.is_intersection.unwrap_or(false)
    }
}

/// A link between two nodes, by index into [`MatchingGraph::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    pub is_directed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchingGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// `matching / (matching + reference)` over the nodes of a matching graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub matching: usize,
    /// Reference nodes that are not matching.
    pub reference: usize,
    pub score: f64,
}

impl MatchingGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn summary(&self) -> AlignmentSummary {
        let matching = self.nodes.iter().filter(|n| n.is_matching_node).count();
        let reference = self
            .nodes
            .iter()
            .filter(|n| n.is_reference_node && !n.is_matching_node)
            .count();
        let total = matching + reference;
        AlignmentSummary {
            matching,
            reference,
            score: if total == 0 {
                0.0
            } else {
                matching as f64 / total as f64
            },
        }
    }

    /// Indices of the nodes linked to `node`, in link order.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.links.iter().filter_map(move |l| {
            if l.source == node {
                Some(l.target)
            } else if l.target == node {
                Some(l.source)
            } else {
                None
            }
        })
    }

    pub fn find(&self, kind: NodeKind, key: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.kind == kind && n.key == key)
    }
}

/// Increments `out_degree` of each link source and `in_degree` of each link target.
pub fn compute_degrees(nodes: &mut [GraphNode], links: &[GraphLink]) {
    for link in links {
        nodes[link.source].out_degree += 1;
        nodes[link.target].in_degree += 1;
    }
}

/// One relation of a lexical unit: a target identity and, for vector neighbors, a similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub target: String,
    pub similarity: Option<f64>,
}

/// Where intermediate nodes of a matching graph come from.
pub trait RelationSource {
    /// Relations of an LU in ranking order; empty when the LU has none.
    fn relations(&self, lu_gid: &str) -> Vec<Relation>;

    /// Display name of an intermediate node.
    fn target_name(&self, target: &str) -> String {
        target.to_string()
    }
}

/// LU → synset ids.
#[derive(Debug, Clone, Copy)]
pub struct SynsetRelations<'a>(pub &'a Resources);

impl RelationSource for SynsetRelations<'_> {
    fn relations(&self, lu_gid: &str) -> Vec<Relation> {
        self.0
            .lu_to_syn
            .get(lu_gid)
            .into_iter()
            .flatten()
            .map(|s| Relation {
                target: s.clone(),
                similarity: None,
            })
            .collect()
    }
}

/// LU → cross-lingual vector neighbors, named through `id2word`.
#[derive(Debug, Clone, Copy)]
pub struct VectorRelations<'a>(pub &'a Resources);

impl RelationSource for VectorRelations<'_> {
    fn relations(&self, lu_gid: &str) -> Vec<Relation> {
        self.0
            .lu_vec_nn
            .get(lu_gid)
            .into_iter()
            .flatten()
            .map(|&(sim, id)| Relation {
                target: id.to_string(),
                similarity: Some(sim),
            })
            .collect()
    }

    fn target_name(&self, target: &str) -> String {
        match target.parse::<u64>() {
            Ok(id) => self.0.vector_word(id),
            Err(_) => target.to_string(),
        }
    }
}

/// Intermediate nodes and the LU → intermediate links reaching them.
#[derive(Debug, Clone, Default)]
pub struct Connections {
    /// Deduplicated by target, in first-reference order.
    pub nodes: Vec<GraphNode>,
    /// `(index into the LU nodes, index into `nodes`)`.
    pub links: Vec<(usize, usize)>,
}

/// Routes every left/right LU node through its relations.
///
/// Each LU keeps at most `filter.neighborhood_size` relations, then only those whose similarity
/// passes the filter; relations without a similarity always pass. Intermediates record which
/// sides reach them, and are intersections when both do.
pub fn connect(
    lu_nodes: &[GraphNode],
    source: &dyn RelationSource,
    filter: NeighborFilter,
) -> Connections {
    let mut index: IndexMap<String, usize> = IndexMap::new();
    let mut out = Connections::default();

    for (i, lu) in lu_nodes.iter().enumerate() {
        let relations = source.relations(&lu.key);
        let kept = &relations[..filter.take(&relations)];
        for relation in kept {
            if relation.similarity.is_some_and(|s| !filter.passes(s)) {
                continue;
            }
            let target = match index.get(&relation.target) {
                Some(&t) => t,
                None => {
                    let t = out.nodes.len();
                    out.nodes.push(GraphNode::intermediate(
                        relation.target.as_str(),
                        source.target_name(&relation.target),
                    ));
                    index.insert(relation.target.clone(), t);
                    t
                }
            };
            match lu.kind {
                NodeKind::Left => out.nodes[target].has_left_source = true,
                NodeKind::Right => out.nodes[target].has_right_source = true,
                NodeKind::Intermediate => {}
            }
            out.links.push((i, target));
        }
    }

    for node in &mut out.nodes {
        node.is_intersection = Some(node.has_left_source && node.has_right_source);
    }
    out
}

/// Builds matching graphs for a frame pair from the loaded resources.
#[derive(Debug, Clone, Copy)]
pub struct MatchingGraphBuilder<'a> {
    resources: &'a Resources,
    filter: NeighborFilter,
}

impl<'a> MatchingGraphBuilder<'a> {
    pub fn new(resources: &'a Resources, filter: NeighborFilter) -> Self {
        Self { resources, filter }
    }

    /// Graph of `kind` for `(left, right)`; empty for techniques without a matching graph.
    pub fn build(&self, kind: &ScoringKind, left: &Frame, right: &Frame) -> MatchingGraph {
        match kind {
            ScoringKind::LuWordnet => {
                self.left_anchored(left, right, &SynsetRelations(self.resources))
            }
            ScoringKind::Synset => self.synsets(left, right, false),
            ScoringKind::SynsetInv => self.synsets(left, right, true),
            ScoringKind::LuMuse | ScoringKind::LuBert => {
                self.left_anchored(left, right, &VectorRelations(self.resources))
            }
            ScoringKind::FeMatching => self.frame_elements(left, right),
            _ => MatchingGraph::default(),
        }
    }

    fn lu_nodes(left: &Frame, right: &Frame) -> Vec<GraphNode> {
        left.lus
            .iter()
            .map(|lu| GraphNode::from_lexical_unit(NodeKind::Left, lu))
            .chain(
                right
                    .lus
                    .iter()
                    .map(|lu| GraphNode::from_lexical_unit(NodeKind::Right, lu)),
            )
            .collect()
    }

    /// Keeps only intermediates reached from the left frame. Links run left → intermediate →
    /// right, the left side is the reference, and left LUs reaching an intersection match.
    pub fn left_anchored(
        &self,
        left: &Frame,
        right: &Frame,
        source: &dyn RelationSource,
    ) -> MatchingGraph {
        let mut nodes = Self::lu_nodes(left, right);
        let connections = connect(&nodes, source, self.filter);

        let mut remap = vec![None; connections.nodes.len()];
        for (i, node) in connections.nodes.into_iter().enumerate() {
            if node.has_left_source {
                remap[i] = Some(nodes.len());
                nodes.push(node);
            }
        }

        let mut links = Vec::new();
        for (lu, inter) in connections.links {
            let Some(inter) = remap[inter] else {
                continue;
            };
            let link = if nodes[lu].kind == NodeKind::Right {
                GraphLink {
                    source: inter,
                    target: lu,
                    is_directed: true,
                }
            } else {
                GraphLink {
                    source: lu,
                    target: inter,
                    is_directed: true,
                }
            };
            links.push(link);
        }

        for node in &mut nodes {
            node.is_reference_node = node.kind == NodeKind::Left;
        }
        for link in &links {
            if nodes[link.source].kind == NodeKind::Left
                && nodes[link.target].is_intersection()
            {
                nodes[link.source].is_matching_node = true;
            }
        }
        compute_degrees(&mut nodes, &links);
        tracing::debug!(
            nodes = nodes.len(),
            links = links.len(),
            "built left-anchored matching graph"
        );
        MatchingGraph { nodes, links }
    }

    /// Keeps every synset. The reference side is the left frame, or the right one when
    /// `inverse`; intersections are the matching nodes.
    pub fn synsets(&self, left: &Frame, right: &Frame, inverse: bool) -> MatchingGraph {
        let mut nodes = Self::lu_nodes(left, right);
        let connections = connect(&nodes, &SynsetRelations(self.resources), self.filter);

        let base = nodes.len();
        nodes.extend(connections.nodes);
        let links: Vec<GraphLink> = connections
            .links
            .into_iter()
            .map(|(lu, inter)| GraphLink {
                source: lu,
                target: base + inter,
                is_directed: true,
            })
            .collect();

        for node in &mut nodes {
            node.is_reference_node = if inverse {
                node.has_right_source
            } else {
                node.has_left_source
            };
            node.is_matching_node = node.is_intersection();
        }
        compute_degrees(&mut nodes, &links);
        MatchingGraph { nodes, links }
    }

    /// Links same-name frame elements; both ends of a pair match and every node is a reference.
    pub fn frame_elements(&self, left: &Frame, right: &Frame) -> MatchingGraph {
        let mut nodes: Vec<GraphNode> = left
            .fes
            .iter()
            .map(|fe| GraphNode::from_frame_element(NodeKind::Left, fe))
            .chain(
                right
                    .fes
                    .iter()
                    .map(|fe| GraphNode::from_frame_element(NodeKind::Right, fe)),
            )
            .collect();

        let split = left.fes.len();
        let mut links = Vec::new();
        for a in 0..split {
            for b in split..nodes.len() {
                if nodes[a].name == nodes[b].name {
                    links.push(GraphLink {
                        source: a,
                        target: b,
                        is_directed: false,
                    });
                }
            }
        }

        for node in &mut nodes {
            node.is_reference_node = true;
        }
        for link in &links {
            nodes[link.source].is_matching_node = true;
            nodes[link.target].is_matching_node = true;
        }
        compute_degrees(&mut nodes, &links);
        MatchingGraph { nodes, links }
    }
}
