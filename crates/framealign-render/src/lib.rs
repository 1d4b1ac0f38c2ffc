#![forbid(unsafe_code)]

//! Headless geometry for frame alignment diagrams.
//!
//! The Sankey diagram is laid out with `ibis`; matching graphs get point-scale coordinates and
//! cubic link paths. Label sizes come from a [`text::TextMeasurer`].

pub mod error;
pub mod graph;
pub mod sankey;
pub mod scale;
pub mod text;

pub use error::{Error, Result};
pub use graph::{
    Footer, GraphFamily, GraphOptions, PositionedGraph, PositionedLink, footer,
    layout_matching_graph, link_path,
};
pub use sankey::{
    BarLabel, SankeyDiagram, SankeyOptions, ScoreLabel, TextAnchor, Viewport, layout_sankey,
    toggle_focus,
};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};

use framealign_core::AlignmentStore;
use ibis::Focus;
use std::sync::Arc;

#[derive(Clone)]
pub struct RenderOptions {
    pub sankey: SankeyOptions,
    pub graph: GraphOptions,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sankey: SankeyOptions::default(),
            graph: GraphOptions::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &framealign_core::VisualizerConfig) -> Self {
        Self {
            sankey: SankeyOptions::from_config(config),
            graph: GraphOptions::from_config(config),
            ..Self::default()
        }
    }
}

/// Sankey geometry of the store's current selection.
pub fn layout_store_sankey(
    store: &mut AlignmentStore,
    viewport: Viewport,
    focus: Option<&Focus>,
    options: &RenderOptions,
) -> Result<SankeyDiagram> {
    let edges = store.sankey_data();
    layout_sankey(
        &edges,
        viewport,
        &options.sankey,
        focus,
        options.text_measurer.as_ref(),
    )
}

/// Positioned matching graph of the store's selected frame pair, with its footer.
///
/// `None` when no technique with a matching graph is selected or the pair is incomplete.
pub fn layout_store_graph(
    store: &AlignmentStore,
    viewport: Viewport,
    options: &RenderOptions,
) -> Option<PositionedGraph> {
    let family = GraphFamily::for_kind(&store.scoring()?.kind)?;
    let (Some(left), Some(right)) = store.selected_frame_pair() else {
        return None;
    };
    let graph = store.graph_data();
    let mut positioned = layout_matching_graph(
        &graph,
        family,
        viewport,
        &options.graph,
        options.text_measurer.as_ref(),
    );
    positioned.footer = Some(footer((left, right), &positioned, options.graph.margin));
    Some(positioned)
}
