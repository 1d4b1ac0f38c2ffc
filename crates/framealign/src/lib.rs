#![forbid(unsafe_code)]

//! `framealign` visualizes alignments between semantic frames of two languages.
//!
//! The core crate ingests per-technique score matrices, answers Sankey and matching-graph queries
//! and caches vector-derived edges. Geometry is behind a feature.
//!
//! # Features
//!
//! - `render`: Sankey and matching-graph geometry (`framealign::render`)

pub use framealign_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use framealign_render::{
        DeterministicTextMeasurer, Footer, GraphFamily, GraphOptions, PositionedGraph,
        PositionedLink, RenderOptions, SankeyDiagram, SankeyOptions, TextMeasurer, TextStyle,
        Viewport, layout_store_graph, layout_store_sankey, toggle_focus,
    };
    pub use ibis::{Focus, Part};

    use framealign_core::{AlignmentDocument, AlignmentStore, VisualizerConfig};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Core(#[from] framealign_core::Error),
        #[error(transparent)]
        Render(#[from] framealign_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Bundles a store, render options and the Sankey focus for UI integrations.
    ///
    /// All work is CPU-bound; the async loader only yields between ingestion chunks.
    pub struct HeadlessVisualizer {
        pub store: AlignmentStore,
        pub options: RenderOptions,
        focus: Option<Focus>,
    }

    impl Default for HeadlessVisualizer {
        fn default() -> Self {
            Self::new(VisualizerConfig::default())
        }
    }

    impl HeadlessVisualizer {
        pub fn new(config: VisualizerConfig) -> Self {
            let options = RenderOptions::from_config(&config);
            Self {
                store: AlignmentStore::new(config),
                options,
                focus: None,
            }
        }

        pub fn load_json(&mut self, text: &str) -> Result<()> {
            self.store.load_json(text)?;
            self.focus = None;
            Ok(())
        }

        pub async fn load(&mut self, doc: AlignmentDocument) -> Result<()> {
            self.store.load_async(doc).await?;
            self.focus = None;
            Ok(())
        }

        pub fn focus(&self) -> Option<&Focus> {
            self.focus.as_ref()
        }

        /// Applies a bar click and returns the new focus.
        pub fn click_bar(&mut self, part: Part, key: &str) -> Option<&Focus> {
            self.focus = toggle_focus(self.focus.as_ref(), Focus::new(part, key));
            self.focus.as_ref()
        }

        pub fn sankey(&mut self, viewport: Viewport) -> Result<SankeyDiagram> {
            Ok(layout_store_sankey(
                &mut self.store,
                viewport,
                self.focus.as_ref(),
                &self.options,
            )?)
        }

        /// Selects the frame pair behind a Sankey connector and lays out its matching graph.
        pub fn open_edge(
            &mut self,
            left_label: &str,
            right_label: &str,
            viewport: Viewport,
        ) -> Option<PositionedGraph> {
            if !self.store.select_sankey_edge(left_label, right_label) {
                return None;
            }
            self.graph(viewport)
        }

        pub fn graph(&self, viewport: Viewport) -> Option<PositionedGraph> {
            layout_store_graph(&self.store, viewport, &self.options)
        }
    }
}
