//! The alignment store: loaded resources, per-technique edge caches and selection state.
//!
//! Derived data (`sankey_data`, `graph_data`, `frame_options`) is pulled on demand from the
//! current selection and parameters. Sankey edges of each technique are cached; the cache entry
//! of a technique is recomputed when the neighborhood parameters or the selected frame set differ
//! from the fingerprint of its last computation.

use crate::config::{IngestOptions, VisualizerConfig};
use crate::document::{AlignmentDocument, Frame};
use crate::ingest::{AlignmentEdge, EdgeTable, MatrixIngest, ingest};
use crate::matching::{MatchingGraph, MatchingGraphBuilder};
use crate::prune::prune;
use crate::scoring::{ScoringKind, ScoringParams};
use crate::synset::{SynsetDetails, synset_details};
use crate::vector::VectorMatcher;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A document with its ingested edges, ready to be installed into a store.
#[derive(Debug, Clone)]
pub struct LoadedAlignment {
    doc: AlignmentDocument,
    edges: EdgeTable,
    frames_by_label: FxHashMap<String, String>,
}

impl LoadedAlignment {
    fn from_parts(doc: AlignmentDocument, edges: EdgeTable) -> Self {
        let frames_by_label = doc.frames_by_label();
        Self {
            doc,
            edges,
            frames_by_label,
        }
    }

    /// Validates and ingests `doc` in one go.
    pub fn prepare_blocking(doc: AlignmentDocument) -> Result<Self> {
        doc.validate()?;
        let edges = MatrixIngest::new(&doc, IngestOptions::never_yield()).finish();
        Ok(Self::from_parts(doc, edges))
    }

    /// Validates `doc` and ingests it cooperatively.
    pub async fn prepare(doc: AlignmentDocument, options: IngestOptions) -> Result<Self> {
        doc.validate()?;
        let edges = ingest(&doc, options).await;
        Ok(Self::from_parts(doc, edges))
    }

    pub fn document(&self) -> &AlignmentDocument {
        &self.doc
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.edges
    }
}

/// Identifies one document load; a load finished with an outdated ticket is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOption {
    pub id: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: ScoringKind,
    pub params: ScoringParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOption {
    pub id: String,
    pub label: String,
    pub disabled: bool,
}

/// `(left label, right label, score)`; serializes as a 3-element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyEdge(pub String, pub String, pub f64);

impl SankeyEdge {
    pub fn left(&self) -> &str {
        &self.0
    }

    pub fn right(&self) -> &str {
        &self.1
    }

    pub fn score(&self) -> f64 {
        self.2
    }
}

/// Inputs of the last edge computation of a technique.
#[derive(Debug, Clone, PartialEq)]
struct EdgeFingerprint {
    neighborhood_size: Option<usize>,
    similarity_threshold: Option<f64>,
    frame_set: BTreeSet<String>,
}

impl EdgeFingerprint {
    fn new(params: &ScoringParams, frame_set: &BTreeSet<String>) -> Self {
        Self {
            neighborhood_size: params.neighborhood_size,
            similarity_threshold: params.similarity_threshold,
            frame_set: frame_set.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Installed {
    doc: AlignmentDocument,
    frames_by_label: FxHashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct AlignmentStore {
    config: VisualizerConfig,
    generation: u64,
    loaded: Option<Installed>,
    edge_cache: FxHashMap<String, Vec<AlignmentEdge>>,
    fingerprints: FxHashMap<String, EdgeFingerprint>,
    scoring_options: Vec<ScoringOption>,
    scoring: Option<usize>,
    sankey_frames: BTreeSet<String>,
    selected_pair: (Option<String>, Option<String>),
}

impl AlignmentStore {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn document(&self) -> Option<&AlignmentDocument> {
        self.loaded.as_ref().map(|l| &l.doc)
    }

    /// Parses, ingests and installs a JSON document. On error nothing changes.
    pub fn load_json(&mut self, text: &str) -> Result<()> {
        let doc: AlignmentDocument = serde_json::from_str(text)?;
        self.load(doc)
    }

    pub fn load(&mut self, doc: AlignmentDocument) -> Result<()> {
        let ticket = self.begin_load();
        let loaded = LoadedAlignment::prepare_blocking(doc)?;
        self.finish_load(ticket, loaded).map(|_| ())
    }

    /// Ingests cooperatively with the configured chunk size and time budget, then installs.
    pub async fn load_async(&mut self, doc: AlignmentDocument) -> Result<()> {
        let ticket = self.begin_load();
        let loaded = LoadedAlignment::prepare(doc, self.config.ingest_options()).await?;
        self.finish_load(ticket, loaded).map(|_| ())
    }

    /// Starts a load, superseding every load started before.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Installs `loaded` if `ticket` is still current, replacing all resources and caches and
    /// resetting the selection. Returns whether it was installed.
    pub fn finish_load(&mut self, ticket: LoadTicket, loaded: LoadedAlignment) -> Result<bool> {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding superseded load"
            );
            return Ok(false);
        }

        let scoring_options = loaded
            .doc
            .alignments
            .iter()
            .map(|block| {
                Ok(ScoringOption {
                    id: block.id.clone(),
                    desc: block.desc.clone(),
                    kind: block.kind.clone(),
                    params: self.config.scoring_params(&block.kind)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let LoadedAlignment {
            doc,
            edges,
            frames_by_label,
        } = loaded;
        tracing::debug!(
            frames = doc.frames.len(),
            techniques = scoring_options.len(),
            cached = edges.len(),
            "installed alignment document"
        );
        self.edge_cache = edges.into_iter().collect();
        self.fingerprints.clear();
        self.scoring_options = scoring_options;
        self.scoring = None;
        self.sankey_frames.clear();
        self.selected_pair = (None, None);
        self.loaded = Some(Installed {
            doc,
            frames_by_label,
        });
        Ok(true)
    }

    pub fn scoring_options(&self) -> &[ScoringOption] {
        &self.scoring_options
    }

    pub fn scoring(&self) -> Option<&ScoringOption> {
        self.scoring.and_then(|i| self.scoring_options.get(i))
    }

    pub fn set_scoring(&mut self, id: &str) -> Result<()> {
        let index = self
            .scoring_options
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| Error::UnknownScoring { id: id.to_string() })?;
        self.scoring = Some(index);
        Ok(())
    }

    pub fn clear_scoring(&mut self) {
        self.scoring = None;
    }

    /// Mutates the parameters of the selected technique. Returns `false` when none is selected.
    pub fn update_params(&mut self, f: impl FnOnce(&mut ScoringParams)) -> bool {
        match self.scoring.and_then(|i| self.scoring_options.get_mut(i)) {
            Some(option) => {
                f(&mut option.params);
                true
            }
            None => false,
        }
    }

    fn frame_or_err(&self, gid: &str) -> Result<&Frame> {
        self.document()
            .and_then(|d| d.frame(gid))
            .ok_or_else(|| Error::UnknownFrame {
                gid: gid.to_string(),
            })
    }

    pub fn sankey_frames(&self) -> &BTreeSet<String> {
        &self.sankey_frames
    }

    /// Replaces the selected frame set.
    pub fn set_sankey_frames<I, S>(&mut self, gids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gids: BTreeSet<String> = gids.into_iter().map(Into::into).collect();
        for gid in &gids {
            self.frame_or_err(gid)?;
        }
        self.sankey_frames = gids;
        Ok(())
    }

    pub fn selected_frame_pair(&self) -> (Option<&Frame>, Option<&Frame>) {
        let doc = self.document();
        let get = |gid: &Option<String>| {
            gid.as_deref()
                .and_then(|g| doc.and_then(|d| d.frame(g)))
        };
        (get(&self.selected_pair.0), get(&self.selected_pair.1))
    }

    pub fn set_selected_frame_pair(
        &mut self,
        left: Option<&str>,
        right: Option<&str>,
    ) -> Result<()> {
        for gid in [left, right].into_iter().flatten() {
            self.frame_or_err(gid)?;
        }
        self.selected_pair = (left.map(str::to_string), right.map(str::to_string));
        Ok(())
    }

    /// The frame labelled `name.language`.
    pub fn frame_by_label(&self, label: &str) -> Option<&Frame> {
        let loaded = self.loaded.as_ref()?;
        let gid = loaded.frames_by_label.get(label)?;
        loaded.doc.frame(gid)
    }

    /// Every indexed frame, sorted by label and disabled when unusable by the selected technique.
    pub fn frame_options(&self) -> Vec<FrameOption> {
        let Some(doc) = self.document() else {
            return Vec::new();
        };
        let kind = self.scoring().map(|o| &o.kind);

        let mut options: Vec<FrameOption> = doc
            .indices
            .0
            .iter()
            .chain(&doc.indices.1)
            .filter_map(|gid| doc.frame(gid))
            .map(|frame| FrameOption {
                id: frame.gid.clone(),
                label: frame.label(),
                disabled: match kind {
                    None => true,
                    Some(k) if k.uses_frame_elements() => frame.fes.is_empty(),
                    Some(k) if k.uses_lexical_units() => frame.lus.is_empty(),
                    Some(_) => false,
                },
            })
            .collect();
        options.sort_by(|a, b| a.label.cmp(&b.label));
        options
    }

    /// The two frame indices restricted to frames with at least one LU.
    pub fn lexical_indices(&self) -> (Vec<String>, Vec<String>) {
        let Some(doc) = self.document() else {
            return (Vec::new(), Vec::new());
        };
        let with_lus = |ids: &[String]| -> Vec<String> {
            ids.iter()
                .filter(|gid| doc.frame(gid).is_some_and(|f| !f.lus.is_empty()))
                .cloned()
                .collect()
        };
        (with_lus(&doc.indices.0), with_lus(&doc.indices.1))
    }

    /// Sankey edges of the selected technique for the selected frame set.
    pub fn sankey_data(&mut self) -> Vec<SankeyEdge> {
        let Some(option) = self.scoring().cloned() else {
            return Vec::new();
        };
        let frame_set = self.sankey_frames.clone();
        let edges = self.edges_for(&option, &frame_set);

        let params = &option.params;
        let filtered: Vec<AlignmentEdge> = edges
            .into_iter()
            .filter(|e| e.score >= params.threshold)
            .filter(|e| {
                let (s, t) = (
                    frame_set.contains(&e.source),
                    frame_set.contains(&e.target),
                );
                if params.display_only_frame_set {
                    s && t
                } else {
                    s || t
                }
            })
            .collect();

        let Some(doc) = self.document() else {
            return Vec::new();
        };
        prune(filtered, params.edge_quota())
            .into_iter()
            .filter_map(|e| {
                let source = doc.frame(&e.source)?;
                let target = doc.frame(&e.target)?;
                Some(SankeyEdge(source.label(), target.label(), e.score))
            })
            .collect()
    }

    /// Cached edges of `option`, recomputing them when stale.
    fn edges_for(
        &mut self,
        option: &ScoringOption,
        frame_set: &BTreeSet<String>,
    ) -> Vec<AlignmentEdge> {
        let fingerprint = EdgeFingerprint::new(&option.params, frame_set);
        let check =
            option.kind.revalidates_cached_edges() || !self.edge_cache.contains_key(&option.id);

        if check && self.fingerprints.get(&option.id) != Some(&fingerprint) {
            tracing::debug!(
                scoring = %option.id,
                frames = frame_set.len(),
                "recomputing vector edges"
            );
            let edges = self.compute_vector_edges(frame_set, &option.params);
            self.edge_cache.insert(option.id.clone(), edges);
        }
        self.fingerprints.insert(option.id.clone(), fingerprint);

        self.edge_cache.get(&option.id).cloned().unwrap_or_default()
    }

    /// Scores every selected frame that has LUs against the frames of the opposite side.
    ///
    /// Left candidates exclude selected frames, so a pair of two selected frames is scored once.
    pub fn compute_vector_edges(
        &self,
        frame_set: &BTreeSet<String>,
        params: &ScoringParams,
    ) -> Vec<AlignmentEdge> {
        let Some(doc) = self.document() else {
            return Vec::new();
        };
        let left_candidates: Vec<&Frame> = doc
            .indices
            .0
            .iter()
            .filter(|gid| !frame_set.contains(*gid))
            .filter_map(|gid| doc.frame(gid))
            .collect();
        let right_candidates: Vec<&Frame> =
            doc.indices.1.iter().filter_map(|gid| doc.frame(gid)).collect();

        let mut matcher = VectorMatcher::new(&doc.resources, params.neighbor_filter());
        let mut edges = Vec::new();
        for gid in frame_set {
            let Some(frame) = doc.frame(gid) else {
                continue;
            };
            if frame.lus.is_empty() {
                continue;
            }
            if doc.is_left(gid) {
                for candidate in &right_candidates {
                    let score = matcher.score(frame, candidate);
                    edges.push(AlignmentEdge::new(
                        gid.as_str(),
                        candidate.gid.as_str(),
                        score,
                    ));
                }
            } else {
                for candidate in &left_candidates {
                    let score = matcher.score(candidate, frame);
                    edges.push(AlignmentEdge::new(
                        candidate.gid.as_str(),
                        gid.as_str(),
                        score,
                    ));
                }
            }
        }
        edges.retain(|e| e.score > 0.0);
        edges
    }

    /// Resolves a clicked Sankey edge to its frame pair and selects it when the technique has a
    /// matching graph. Returns whether a detail graph is available.
    pub fn select_sankey_edge(&mut self, left_label: &str, right_label: &str) -> bool {
        let Some(kind) = self.scoring().map(|o| o.kind.clone()) else {
            return false;
        };
        if !kind.has_detail_graph() {
            return false;
        }
        let (Some(left), Some(right)) = (
            self.frame_by_label(left_label).map(|f| f.gid.clone()),
            self.frame_by_label(right_label).map(|f| f.gid.clone()),
        ) else {
            return false;
        };
        self.selected_pair = (Some(left), Some(right));
        true
    }

    /// Matching graph of the selected technique and frame pair; empty when incomplete.
    pub fn graph_data(&self) -> MatchingGraph {
        let (Some(doc), Some(option)) = (self.document(), self.scoring()) else {
            return MatchingGraph::default();
        };
        let (Some(left), Some(right)) = self.selected_frame_pair() else {
            return MatchingGraph::default();
        };
        MatchingGraphBuilder::new(&doc.resources, option.params.neighbor_filter())
            .build(&option.kind, left, right)
    }

    /// Tooltip data of the synset node at `node` of `graph`.
    pub fn synset_details(&self, graph: &MatchingGraph, node: usize) -> Option<SynsetDetails> {
        let doc = self.document()?;
        synset_details(
            &doc.resources,
            graph,
            node,
            (doc.reference_language(), doc.l2_language()),
        )
    }
}
