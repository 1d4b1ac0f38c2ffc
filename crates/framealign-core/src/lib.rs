#![forbid(unsafe_code)]

//! Cross-lingual frame alignment graphs (headless).
//!
//! Turns an alignment document (frames, lexical units, synset and vector-neighbor tables, dense
//! score matrices) into Sankey edge lists and per-pair matching graphs:
//! - cooperative, resumable ingestion of score matrices into sparse edges
//! - per-technique edge caches invalidated by parameter fingerprints
//! - per-source edge pruning
//! - four matching-graph variants (WordNet LUs, synsets, vector neighbors, frame elements)

pub mod config;
pub mod document;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod palette;
pub mod prune;
pub mod scoring;
pub mod store;
pub mod synset;
pub mod vector;

pub use config::{IngestOptions, VisualizerConfig};
pub use document::{
    AlignmentBlock, AlignmentDocument, Frame, FrameElement, LexicalUnit, Resources, SynsetData,
};
pub use error::{Error, Result};
pub use ingest::{AlignmentEdge, EdgeTable, IngestStep, MatrixIngest, ingest, ingest_blocking};
pub use matching::{
    AlignmentSummary, GraphLink, GraphNode, MatchingGraph, MatchingGraphBuilder, NodeKind,
};
pub use palette::{ColorCycle, ColorScale, DEFAULT_PALETTE};
pub use prune::prune;
pub use scoring::{NeighborFilter, ScoringKind, ScoringParams};
pub use store::{
    AlignmentStore, FrameOption, LoadTicket, LoadedAlignment, SankeyEdge, ScoringOption,
};
pub use synset::SynsetDetails;
pub use vector::VectorMatcher;
