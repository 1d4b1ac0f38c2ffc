//! The alignment document: frames, alignment score matrices and lookup resources.

use crate::scoring::ScoringKind;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
    /// `(reference database, L2 database)` names.
    pub db: (String, String),
    /// `(reference language, L2 language)` codes.
    pub lang: (String, String),
    pub alignments: Vec<AlignmentBlock>,
    /// Left (reference) and right (L2) frame gids; rows and columns of every score matrix.
    pub indices: (Vec<String>, Vec<String>),
    pub frames: FxHashMap<String, Frame>,
    #[serde(default)]
    pub resources: Resources,
}

/// One scoring technique's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentBlock {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: ScoringKind,
    /// Dense `left × right` score matrix; absent when scores are computed on demand.
    #[serde(default)]
    pub data: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub gid: String,
    pub name: String,
    pub language: String,
    #[serde(rename = "LUs", default)]
    pub lus: Vec<LexicalUnit>,
    #[serde(rename = "FEs", default)]
    pub fes: Vec<FrameElement>,
}

impl Frame {
    /// `name.language`, the label used in diagrams.
    pub fn label(&self) -> String {
        format!("{}.{}", self.name, self.language)
    }
}

/// Accepts either `{gid, name}` or a bare name, which then doubles as the gid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LexicalUnitRepr")]
pub struct LexicalUnit {
    pub gid: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LexicalUnitRepr {
    Full { gid: String, name: String },
    Name(String),
}

impl From<LexicalUnitRepr> for LexicalUnit {
    fn from(value: LexicalUnitRepr) -> Self {
        match value {
            LexicalUnitRepr::Full { gid, name } => Self { gid, name },
            LexicalUnitRepr::Name(name) => Self {
                gid: name.clone(),
                name,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// LU gid → synset ids.
    #[serde(default)]
    pub lu_to_syn: FxHashMap<String, Vec<String>>,
    #[serde(default)]
    pub syn_data: FxHashMap<String, SynsetData>,
    /// LU gid → `(similarity, vector id)`, sorted by similarity descending.
    #[serde(default)]
    pub lu_vec_nn: FxHashMap<String, Vec<(f64, u64)>>,
    #[serde(default)]
    pub id2word: FxHashMap<u64, String>,
}

impl Resources {
    /// Word for a vector id, falling back to the id itself.
    pub fn vector_word(&self, id: u64) -> String {
        self.id2word
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SynsetData {
    #[serde(default)]
    pub definition: String,
    /// Language code → lemmas.
    #[serde(flatten)]
    pub lemmas: FxHashMap<String, Vec<String>>,
}

impl SynsetData {
    pub fn lemmas_for(&self, language: &str) -> &[String] {
        self.lemmas.get(language).map(Vec::as_slice).unwrap_or_default()
    }
}

impl AlignmentDocument {
    /// Parses and validates a document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let doc: Self = serde_json::from_value(value)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Checks that every indexed gid names a frame and every score matrix matches the indices.
    pub fn validate(&self) -> Result<()> {
        for gid in self.indices.0.iter().chain(&self.indices.1) {
            if !self.frames.contains_key(gid) {
                return Err(Error::DocumentParse {
                    message: format!("indexed frame {gid} has no frame entry"),
                });
            }
        }

        let (rows, cols) = (self.indices.0.len(), self.indices.1.len());
        for block in &self.alignments {
            let Some(matrix) = &block.data else {
                continue;
            };
            if matrix.len() != rows {
                return Err(Error::DocumentParse {
                    message: format!(
                        "alignment {} has {} rows, expected {rows}",
                        block.id,
                        matrix.len()
                    ),
                });
            }
            if let Some((i, row)) = matrix.iter().enumerate().find(|(_, r)| r.len() != cols) {
                return Err(Error::DocumentParse {
                    message: format!(
                        "alignment {} row {i} has {} columns, expected {cols}",
                        block.id,
                        row.len()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn reference_language(&self) -> &str {
        &self.lang.0
    }

    pub fn l2_language(&self) -> &str {
        &self.lang.1
    }

    pub fn frame(&self, gid: &str) -> Option<&Frame> {
        self.frames.get(gid)
    }

    /// Whether `gid` is one of the left (reference) frames.
    pub fn is_left(&self, gid: &str) -> bool {
        self.indices.0.iter().any(|g| g == gid)
    }

    /// `name.language` → gid for every frame.
    pub fn frames_by_label(&self) -> FxHashMap<String, String> {
        self.frames
            .values()
            .map(|f| (f.label(), f.gid.clone()))
            .collect()
    }
}
