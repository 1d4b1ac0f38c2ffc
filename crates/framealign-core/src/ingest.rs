//! Cooperative conversion of dense score matrices into sparse per-technique edge lists.
//!
//! [`MatrixIngest`] is a resumable step function: each [`MatrixIngest::step`] processes cells
//! until the time budget is exceeded at a chunk boundary or the document is exhausted.
//! [`ingest`] drives it from an async context, yielding to the executor between steps.

use crate::config::IngestOptions;
use crate::document::AlignmentDocument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

/// A nonzero alignment score between a left and a right frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEdge {
    pub source: String,
    pub target: String,
    pub score: f64,
}

impl AlignmentEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            score,
        }
    }
}

/// Technique id → edges, in document order. Blocks without a matrix have no entry.
pub type EdgeTable = IndexMap<String, Vec<AlignmentEdge>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    /// The budget ran out; call `step` again to resume.
    Yielded { cells_done: usize },
    Finished,
}

#[derive(Debug)]
pub struct MatrixIngest<'a> {
    doc: &'a AlignmentDocument,
    options: IngestOptions,
    block: usize,
    row: usize,
    col: usize,
    cells_done: usize,
    current: Vec<AlignmentEdge>,
    edges: EdgeTable,
}

impl<'a> MatrixIngest<'a> {
    pub fn new(doc: &'a AlignmentDocument, options: IngestOptions) -> Self {
        Self {
            doc,
            options: IngestOptions {
                chunk_size: options.chunk_size.max(1),
                ..options
            },
            block: 0,
            row: 0,
            col: 0,
            cells_done: 0,
            current: Vec::new(),
            edges: EdgeTable::default(),
        }
    }

    pub fn cells_done(&self) -> usize {
        self.cells_done
    }

    pub fn step(&mut self) -> IngestStep {
        let started = Instant::now();
        let doc = self.doc;
        let (rows, cols) = (&doc.indices.0, &doc.indices.1);

        loop {
            let Some(block) = doc.alignments.get(self.block) else {
                return IngestStep::Finished;
            };
            let Some(matrix) = &block.data else {
                self.block += 1;
                continue;
            };
            let Some(values) = matrix.get(self.row) else {
                self.edges
                    .insert(block.id.clone(), std::mem::take(&mut self.current));
                tracing::debug!(
                    alignment = %block.id,
                    edges = self.edges.get(&block.id).map_or(0, Vec::len),
                    "ingested alignment"
                );
                self.block += 1;
                self.row = 0;
                self.col = 0;
                continue;
            };
            let Some(&value) = values.get(self.col) else {
                self.row += 1;
                self.col = 0;
                continue;
            };

            if value > 0.0 {
                match (rows.get(self.row), cols.get(self.col)) {
                    (Some(source), Some(target)) => {
                        self.current
                            .push(AlignmentEdge::new(source.as_str(), target.as_str(), value));
                    }
                    _ => tracing::warn!(
                        alignment = %block.id,
                        row = self.row,
                        col = self.col,
                        "score outside the frame indices dropped"
                    ),
                }
            }
            self.col += 1;
            self.cells_done += 1;

            if self.cells_done % self.options.chunk_size == 0
                && started.elapsed() >= self.options.time_budget
            {
                tracing::trace!(cells_done = self.cells_done, "ingestion yielded");
                return IngestStep::Yielded {
                    cells_done: self.cells_done,
                };
            }
        }
    }

    /// Runs the remaining steps without yielding.
    pub fn finish(mut self) -> EdgeTable {
        while let IngestStep::Yielded { .. } = self.step() {}
        self.edges
    }

    /// Edges of the blocks completed so far.
    pub fn into_edges(self) -> EdgeTable {
        self.edges
    }
}

/// Ingests every alignment block, yielding to the executor whenever a step exhausts its budget.
pub async fn ingest(doc: &AlignmentDocument, options: IngestOptions) -> EdgeTable {
    let mut job = MatrixIngest::new(doc, options);
    while let IngestStep::Yielded { .. } = job.step() {
        YieldNow::default().await;
    }
    job.into_edges()
}

/// Synchronous ingestion for callers outside an async context.
pub fn ingest_blocking(doc: &AlignmentDocument) -> EdgeTable {
    MatrixIngest::new(doc, IngestOptions::never_yield()).finish()
}

/// Returns `Pending` once after waking itself, letting the executor run other tasks.
#[derive(Debug, Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
