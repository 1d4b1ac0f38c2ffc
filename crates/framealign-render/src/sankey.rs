//! Sankey geometry for the frame-pair edge list.

use crate::Result;
use crate::text::{TextMeasurer, TextStyle};
use framealign_core::{ColorCycle, ColorScale, DEFAULT_PALETTE, SankeyEdge, VisualizerConfig};
use ibis::{BipartiteLayout, BipartiteOptions, EdgeMode, Focus, KeyOrder, Orientation, Part, Row};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Horizontal distance between a main bar and its label.
const LABEL_OFFSET: f64 = 30.0;
const LABEL_BASELINE: f64 = 6.0;
const SCORE_OFFSET: f64 = -58.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SankeyOptions {
    pub min: f64,
    pub pad: f64,
    pub bar_size: f64,
    pub edge_opacity: f64,
    pub edge_mode: EdgeMode,
    pub orient: Orientation,
    pub label_font_size: f64,
    pub palette: Vec<String>,
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            min: 12.0,
            pad: 1.0,
            bar_size: 35.0,
            edge_opacity: 0.4,
            edge_mode: EdgeMode::Curved,
            orient: Orientation::Vertical,
            label_font_size: 14.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl SankeyOptions {
    /// Reads the `sankey.*` keys, keeping defaults for missing or mistyped values.
    pub fn from_config(config: &VisualizerConfig) -> Self {
        let mut options = Self::default();
        if let Some(v) = config.get_f64("sankey.min") {
            options.min = v;
        }
        if let Some(v) = config.get_f64("sankey.pad") {
            options.pad = v;
        }
        if let Some(v) = config.get_f64("sankey.barSize") {
            options.bar_size = v;
        }
        if let Some(v) = config.get_f64("sankey.edgeOpacity") {
            options.edge_opacity = v;
        }
        if let Some(v) = config.get_f64("sankey.labelFontSize") {
            options.label_font_size = v;
        }
        match config.get_str("sankey.edgeMode") {
            Some("straight") => options.edge_mode = EdgeMode::Straight,
            Some("curved") => options.edge_mode = EdgeMode::Curved,
            _ => {}
        }
        match config.get_str("sankey.orient") {
            Some("horizontal") => options.orient = Orientation::Horizontal,
            Some("vertical") => options.orient = Orientation::Vertical,
            _ => {}
        }
        if let Some(palette) = config
            .get("sankey.palette")
            .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok())
        {
            options.palette = palette;
        }
        options
    }
}

/// Size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarLabel {
    pub part: Part,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
}

/// Formatted value shown next to a focused secondary sub-bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLabel {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SankeyDiagram {
    pub viewport: Viewport,
    /// Translation of the diagram inside the viewport.
    pub offset_x: f64,
    pub offset_y: f64,
    pub layout: BipartiteLayout,
    /// Fill of sub-bars and connectors, keyed by primary label.
    pub colors: IndexMap<String, String>,
    pub labels: Vec<BarLabel>,
    pub scores: Vec<ScoreLabel>,
}

impl SankeyDiagram {
    pub fn fill_for(&self, primary: &str) -> Option<&str> {
        self.colors.get(primary).map(String::as_str)
    }
}

/// Width of the longest frame label, by character count.
pub fn label_width(edges: &[SankeyEdge], font_size: f64, measurer: &dyn TextMeasurer) -> f64 {
    let longest = edges
        .iter()
        .flat_map(|e| [e.left(), e.right()])
        .max_by_key(|label| label.chars().count());
    longest.map_or(0.0, |label| {
        measurer.measure(label, &TextStyle::sized(font_size)).width
    })
}

/// Diagram extent inside `viewport`, leaving room for labels on both sides.
pub fn diagram_size(viewport: Viewport, label_width: f64) -> (f64, f64) {
    let height = (viewport.height - 160.0).max(400.0);
    let width = (viewport.width - 2.0 * label_width - 160.0).clamp(200.0, 600.0);
    (width, height)
}

pub fn layout_sankey(
    edges: &[SankeyEdge],
    viewport: Viewport,
    options: &SankeyOptions,
    focus: Option<&Focus>,
    measurer: &dyn TextMeasurer,
) -> Result<SankeyDiagram> {
    let (width, height) = diagram_size(
        viewport,
        label_width(edges, options.label_font_size, measurer),
    );
    let offset_x = ((viewport.width - width) / 2.0).max(0.0);
    let offset_y = ((viewport.height - height) / 2.0).max(0.0);

    let rows: Vec<Row> = edges
        .iter()
        .map(|e| Row::new(e.left(), e.right(), e.score()))
        .collect();
    let bipartite = BipartiteOptions {
        orient: options.orient,
        width,
        height,
        bar_size: options.bar_size,
        min: options.min,
        pad: options.pad,
        edge_mode: options.edge_mode,
        edge_opacity: options.edge_opacity,
        sort_primary: KeyOrder::Ascending,
        sort_secondary: KeyOrder::Ascending,
    };
    let layout = ibis::layout(&rows, &bipartite, focus)?;

    let mut scale = ColorScale::new(ColorCycle::new(options.palette.clone()));
    for edge in edges {
        scale.color_for(edge.left());
    }
    let colors = scale
        .assigned()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let labels = layout
        .main_bars
        .iter()
        .map(|bar| {
            let (dx, anchor) = match bar.part {
                Part::Primary => (-LABEL_OFFSET, TextAnchor::End),
                Part::Secondary => (LABEL_OFFSET, TextAnchor::Start),
            };
            BarLabel {
                part: bar.part,
                text: bar.key.clone(),
                x: bar.x + dx,
                y: bar.y + LABEL_BASELINE,
                anchor,
            }
        })
        .collect();

    let scores = layout
        .sub_bars
        .iter()
        .filter_map(|sub| {
            let text = sub.label.clone()?;
            Some(ScoreLabel {
                primary: sub.primary.clone(),
                secondary: sub.secondary.clone(),
                text,
                x: sub.x + SCORE_OFFSET,
                y: sub.y + LABEL_BASELINE,
            })
        })
        .collect();

    tracing::debug!(
        edges = edges.len(),
        width,
        height,
        focused = focus.is_some(),
        "laid out sankey diagram"
    );
    Ok(SankeyDiagram {
        viewport,
        offset_x,
        offset_y,
        layout,
        colors,
        labels,
        scores,
    })
}

/// Clicking the focused bar clears the focus; clicking another bar moves it there.
pub fn toggle_focus(current: Option<&Focus>, clicked: Focus) -> Option<Focus> {
    Focus::toggle(current, clicked)
}
