use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring technique of an alignment block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScoringKind {
    LuWordnet,
    Synset,
    SynsetInv,
    LuMuse,
    LuBert,
    LuMeanMuse,
    FeMatching,
    AttrMatching,
    MuseFeMatching,
    /// Any technique without dedicated handling; only its ingested edges are used.
    Other(String),
}

impl ScoringKind {
    pub fn as_str(&self) -> &str {
        match self {
            ScoringKind::LuWordnet => "lu_wordnet",
            ScoringKind::Synset => "synset",
            ScoringKind::SynsetInv => "synset_inv",
            ScoringKind::LuMuse => "lu_muse",
            ScoringKind::LuBert => "lu_bert",
            ScoringKind::LuMeanMuse => "lu_mean_muse",
            ScoringKind::FeMatching => "fe_matching",
            ScoringKind::AttrMatching => "attr_matching",
            ScoringKind::MuseFeMatching => "muse_fe_matching",
            ScoringKind::Other(s) => s,
        }
    }

    /// Techniques whose frame options require frame elements.
    pub fn uses_frame_elements(&self) -> bool {
        matches!(self, ScoringKind::FeMatching | ScoringKind::MuseFeMatching)
    }

    /// Techniques whose frame options require lexical units.
    pub fn uses_lexical_units(&self) -> bool {
        matches!(
            self,
            ScoringKind::LuWordnet
                | ScoringKind::Synset
                | ScoringKind::SynsetInv
                | ScoringKind::LuMuse
                | ScoringKind::LuBert
                | ScoringKind::LuMeanMuse
        )
    }

    /// Techniques with a matching-graph detail view for a selected frame pair.
    pub fn has_detail_graph(&self) -> bool {
        matches!(
            self,
            ScoringKind::LuWordnet
                | ScoringKind::Synset
                | ScoringKind::SynsetInv
                | ScoringKind::LuMuse
                | ScoringKind::FeMatching
                | ScoringKind::LuBert
        )
    }

    /// Techniques whose cached edges are revalidated against the neighborhood parameters and
    /// frame set on every request, not only when the cache is empty.
    pub fn revalidates_cached_edges(&self) -> bool {
        matches!(self, ScoringKind::LuMuse)
    }
}

impl From<String> for ScoringKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "lu_wordnet" => ScoringKind::LuWordnet,
            "synset" => ScoringKind::Synset,
            "synset_inv" => ScoringKind::SynsetInv,
            "lu_muse" => ScoringKind::LuMuse,
            "lu_bert" => ScoringKind::LuBert,
            "lu_mean_muse" => ScoringKind::LuMeanMuse,
            "fe_matching" => ScoringKind::FeMatching,
            "attr_matching" => ScoringKind::AttrMatching,
            "muse_fe_matching" => ScoringKind::MuseFeMatching,
            _ => ScoringKind::Other(value),
        }
    }
}

impl From<&str> for ScoringKind {
    fn from(value: &str) -> Self {
        ScoringKind::from(value.to_string())
    }
}

impl From<ScoringKind> for String {
    fn from(value: ScoringKind) -> Self {
        match value {
            ScoringKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ScoringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable parameters of one scoring technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringParams {
    /// Minimum edge score shown in the Sankey diagram.
    pub threshold: f64,
    /// Keep only edges with both endpoints in the selected frame set.
    #[serde(default)]
    pub display_only_frame_set: bool,
    #[serde(default)]
    pub sankey_max_edges: Option<usize>,
    #[serde(default)]
    pub limit_sankey_edges: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f64>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            display_only_frame_set: false,
            sankey_max_edges: None,
            limit_sankey_edges: false,
            neighborhood_size: None,
            similarity_threshold: None,
        }
    }
}

impl ScoringParams {
    /// Per-source edge quota, or `None` when pruning is disabled.
    ///
    /// Enabling the limit without a maximum disables pruning.
    pub fn edge_quota(&self) -> Option<usize> {
        if self.limit_sankey_edges {
            self.sankey_max_edges
        } else {
            None
        }
    }

    /// Neighbor-list truncation and similarity filter for vector relations.
    pub fn neighbor_filter(&self) -> NeighborFilter {
        NeighborFilter {
            neighborhood_size: self.neighborhood_size,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

/// How many neighbors of a lexical unit are considered and how similar they must be.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborFilter {
    /// `None` keeps the whole list.
    pub neighborhood_size: Option<usize>,
    /// `None` keeps every similarity.
    pub similarity_threshold: Option<f64>,
}

impl NeighborFilter {
    pub fn new(neighborhood_size: Option<usize>, similarity_threshold: Option<f64>) -> Self {
        Self {
            neighborhood_size,
            similarity_threshold,
        }
    }

    pub fn take<T>(&self, list: &[T]) -> usize {
        self.neighborhood_size
            .map_or(list.len(), |n| n.min(list.len()))
    }

    pub fn passes(&self, similarity: f64) -> bool {
        self.similarity_threshold.is_none_or(|t| similarity >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        let kinds: Vec<ScoringKind> =
            serde_json::from_str(r#"["lu_muse", "fe_matching", "def_matching"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                ScoringKind::LuMuse,
                ScoringKind::FeMatching,
                ScoringKind::Other("def_matching".to_string())
            ]
        );
        assert_eq!(
            serde_json::to_string(&kinds).unwrap(),
            r#"["lu_muse","fe_matching","def_matching"]"#
        );
    }

    #[test]
    fn edge_quota_requires_both_flags() {
        let mut params = ScoringParams {
            sankey_max_edges: Some(3),
            ..ScoringParams::default()
        };
        assert_eq!(params.edge_quota(), None);
        params.limit_sankey_edges = true;
        assert_eq!(params.edge_quota(), Some(3));
        params.sankey_max_edges = None;
        assert_eq!(params.edge_quota(), None);
    }

    #[test]
    fn neighbor_filter_truncates_and_thresholds() {
        let filter = NeighborFilter::new(Some(2), Some(0.5));
        assert_eq!(filter.take(&[1, 2, 3]), 2);
        assert_eq!(filter.take(&[1]), 1);
        assert!(filter.passes(0.5));
        assert!(!filter.passes(0.49));
        assert!(NeighborFilter::default().passes(-1.0));
    }
}
