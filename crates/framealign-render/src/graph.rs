//! Coordinates and link paths for matching graphs.

use crate::sankey::Viewport;
use crate::scale::PointScale;
use crate::text::{TextMeasurer, TextStyle};
use framealign_core::{
    AlignmentSummary, Frame, GraphNode, MatchingGraph, NodeKind, ScoringKind, VisualizerConfig,
};
use serde::{Deserialize, Serialize};

const COLUMN_PADDING: f64 = 0.3;
const MIN_WIDTH: f64 = 400.0;
const CURVE_TAIL: f64 = 15.0;
const CURVE_LEAD: f64 = 3.0;

/// Column structure of a matching graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphFamily {
    /// Left LUs, intermediates, right LUs.
    Lexical,
    /// Left FEs and right FEs.
    FrameElement,
}

impl GraphFamily {
    pub fn for_kind(kind: &ScoringKind) -> Option<Self> {
        match kind {
            ScoringKind::FeMatching => Some(GraphFamily::FrameElement),
            k if k.has_detail_graph() => Some(GraphFamily::Lexical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
    pub margin: f64,
    pub font_size: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            margin: 60.0,
            font_size: 12.0,
        }
    }
}

impl GraphOptions {
    pub fn from_config(config: &VisualizerConfig) -> Self {
        let defaults = Self::default();
        Self {
            margin: config.get_f64("graph.margin").unwrap_or(defaults.margin),
            font_size: config.get_f64("graph.fontSize").unwrap_or(defaults.font_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedLink {
    pub source: usize,
    pub target: usize,
    pub is_directed: bool,
    /// SVG path data.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub title: String,
    pub score: String,
    pub x_title: f64,
    pub x_score: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedGraph {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<PositionedLink>,
    pub summary: AlignmentSummary,
    pub footer: Option<Footer>,
}

/// Places every node and computes link paths.
///
/// Each column is a point scale; nodes of a column are ordered by degree, highest first (out-degree
/// for LU and FE columns, in-degree for intermediates).
pub fn layout_matching_graph(
    graph: &MatchingGraph,
    family: GraphFamily,
    viewport: Viewport,
    options: &GraphOptions,
    measurer: &dyn TextMeasurer,
) -> PositionedGraph {
    let mut nodes = graph.nodes.clone();
    let width = viewport.width.max(MIN_WIDTH);
    let height = viewport.height - 10.0;
    let m = options.margin;

    let style = TextStyle::sized(options.font_size);
    for node in &mut nodes {
        let metrics = measurer.measure(&node.name, &style);
        node.width = metrics.width;
        node.height = metrics.height + 2.0;
    }

    match family {
        GraphFamily::Lexical => {
            let x = PointScale::new(3, (0.0, width), COLUMN_PADDING);
            place_column(&mut nodes, NodeKind::Left, x.at(0), (2.0 * m, height - 2.0 * m));
            place_column(
                &mut nodes,
                NodeKind::Intermediate,
                x.at(1),
                (m, height - m),
            );
            place_column(&mut nodes, NodeKind::Right, x.at(2), (2.0 * m, height - 2.0 * m));
        }
        GraphFamily::FrameElement => {
            let x = PointScale::new(2, (0.0, width), COLUMN_PADDING);
            place_column(&mut nodes, NodeKind::Left, x.at(0), (4.0 * m, height - 4.0 * m));
            place_column(&mut nodes, NodeKind::Right, x.at(1), (4.0 * m, height - 4.0 * m));
        }
    }

    let links = graph
        .links
        .iter()
        .map(|link| PositionedLink {
            source: link.source,
            target: link.target,
            is_directed: link.is_directed,
            path: link_path(&nodes[link.source], &nodes[link.target]),
        })
        .collect();

    PositionedGraph {
        width,
        height,
        nodes,
        links,
        summary: graph.summary(),
        footer: None,
    }
}

fn place_column(nodes: &mut [GraphNode], kind: NodeKind, x: f64, range: (f64, f64)) {
    let mut column: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].kind == kind).collect();
    column.sort_by_key(|&i| {
        let n = &nodes[i];
        std::cmp::Reverse(match kind {
            NodeKind::Intermediate => n.in_degree,
            NodeKind::Left | NodeKind::Right => n.out_degree,
        })
    });

    let y = PointScale::new(column.len(), range, 0.0);
    for (rank, i) in column.into_iter().enumerate() {
        nodes[i].x = x;
        nodes[i].y = y.at(rank);
    }
}

/// Cubic link from the label edge of `source` to the label edge of `target`.
pub fn link_path(source: &GraphNode, target: &GraphNode) -> String {
    let mut x1 = source.x;
    let y1 = source.y - source.height / 4.0;
    let mut x2 = target.x;
    let y2 = target.y - target.height / 4.0;

    let direction = match source.kind {
        NodeKind::Left => {
            x1 += source.width + 12.0;
            x2 -= target.width / 2.0 + 16.0;
            1.0
        }
        NodeKind::Intermediate => {
            x1 += source.width / 2.0 + 12.0;
            x2 -= target.width + 16.0;
            1.0
        }
        NodeKind::Right => {
            x1 -= source.width + 12.0;
            x2 += target.width / 2.0 + 18.0;
            -1.0
        }
    };

    let ccoef = ((x1 - x2).abs() - 2.0 * CURVE_TAIL) / 2.25;
    format!(
        "M {x1} {y1} L {} {y1} C {} {y1}, {} {y2}, {} {y2} L {x2} {y2}",
        x1 + CURVE_LEAD * direction,
        x1 + ccoef * direction,
        x2 - ccoef * direction,
        x2 - CURVE_TAIL * direction,
    )
}

/// Frame names, gids and the alignment score line shown under a matching graph.
pub fn footer(pair: (&Frame, &Frame), graph: &PositionedGraph, margin: f64) -> Footer {
    let (first, second) = pair;
    let AlignmentSummary {
        matching,
        reference,
        score,
    } = graph.summary;
    Footer {
        title: format!(
            "Frames: {} ({}), {} ({})",
            first.name, first.gid, second.name, second.gid
        ),
        score: format!("Alignment score: {matching} ÷ ({matching} + {reference}) = {score:.3}"),
        x_title: margin,
        x_score: graph.width - margin,
        y: graph.height + 10.0 - margin / 2.0,
    }
}
