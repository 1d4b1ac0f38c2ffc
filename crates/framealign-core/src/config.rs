use crate::scoring::{ScoringKind, ScoringParams};
use crate::{Error, Result};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// JSON-backed visualizer configuration with dotted-path access.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig(Value);

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self(json!({
            "scoring": {
                "default": {
                    "threshold": 0.1,
                    "displayOnlyFrameSet": false,
                    "sankeyMaxEdges": null,
                    "limitSankeyEdges": false
                },
                "attr_matching": {
                    "threshold": 0,
                    "displayOnlyFrameSet": true
                },
                "lu_wordnet": {
                    "threshold": 0.4,
                    "displayOnlyFrameSet": false
                },
                "lu_muse": {
                    "threshold": 0.75,
                    "displayOnlyFrameSet": false,
                    "sankeyMaxEdges": 5,
                    "limitSankeyEdges": true,
                    "neighborhoodSize": 5,
                    "similarityThreshold": 0.3
                },
                "lu_mean_muse": {
                    "threshold": 0.85,
                    "displayOnlyFrameSet": false,
                    "sankeyMaxEdges": 5,
                    "limitSankeyEdges": true
                }
            },
            "ingest": {
                "chunkSize": 1000,
                "timeBudgetMs": 100
            },
            "sankey": {
                "min": 12,
                "pad": 1,
                "barSize": 35,
                "edgeOpacity": 0.4,
                "edgeMode": "curved",
                "orient": "vertical",
                "labelFontSize": 14
            },
            "graph": {
                "margin": 60,
                "fontSize": 12
            }
        }))
    }
}

impl VisualizerConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut config = Self::default();
        config.deep_merge(overrides);
        config
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// `scoring.default` deep-merged with `scoring.<kind>`.
    pub fn scoring_params(&self, kind: &ScoringKind) -> Result<ScoringParams> {
        let mut merged = self
            .get("scoring.default")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        if let Some(specific) = self.0.pointer(&format!("/scoring/{}", kind.as_str())) {
            deep_merge_value(&mut merged, specific);
        }
        serde_json::from_value(merged).map_err(|err| Error::InvalidConfig {
            message: format!("scoring params for {}: {err}", kind.as_str()),
        })
    }

    pub fn ingest_options(&self) -> IngestOptions {
        let defaults = IngestOptions::default();
        IngestOptions {
            chunk_size: self
                .get_u64("ingest.chunkSize")
                .map(|n| n as usize)
                .unwrap_or(defaults.chunk_size),
            time_budget: self
                .get_u64("ingest.timeBudgetMs")
                .map(Duration::from_millis)
                .unwrap_or(defaults.time_budget),
        }
    }
}

/// Work-unit size and wall-clock budget of the cooperative ingestion loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Cells processed between two budget checks.
    pub chunk_size: usize,
    /// Elapsed time after which a check suspends the loop.
    pub time_budget: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            time_budget: Duration::from_millis(100),
        }
    }
}

impl IngestOptions {
    /// Suspends at every chunk boundary.
    pub fn always_yield(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            time_budget: Duration::ZERO,
        }
    }

    /// Runs to completion in one step.
    pub fn never_yield() -> Self {
        Self {
            chunk_size: usize::MAX,
            time_budget: Duration::MAX,
        }
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technique_params_fall_back_to_default() {
        let config = VisualizerConfig::default();
        let params = config.scoring_params(&ScoringKind::Synset).unwrap();
        assert_eq!(params.threshold, 0.1);
        assert!(!params.display_only_frame_set);
        assert!(!params.limit_sankey_edges);
        assert_eq!(params.sankey_max_edges, None);
        assert_eq!(params.neighborhood_size, None);
    }

    #[test]
    fn technique_params_override_default() {
        let config = VisualizerConfig::default();
        let params = config.scoring_params(&ScoringKind::LuMuse).unwrap();
        assert_eq!(params.threshold, 0.75);
        assert_eq!(params.sankey_max_edges, Some(5));
        assert!(params.limit_sankey_edges);
        assert_eq!(params.neighborhood_size, Some(5));
        assert_eq!(params.similarity_threshold, Some(0.3));

        let attr = config.scoring_params(&ScoringKind::AttrMatching).unwrap();
        assert_eq!(attr.threshold, 0.0);
        assert!(attr.display_only_frame_set);
    }

    #[test]
    fn overrides_deep_merge() {
        let config = VisualizerConfig::with_overrides(&json!({
            "scoring": { "lu_wordnet": { "threshold": 0.2 } },
            "ingest": { "chunkSize": 10 }
        }));
        let params = config.scoring_params(&ScoringKind::LuWordnet).unwrap();
        assert_eq!(params.threshold, 0.2);
        assert!(!params.display_only_frame_set);
        assert_eq!(config.ingest_options().chunk_size, 10);
        assert_eq!(
            config.ingest_options().time_budget,
            Duration::from_millis(100)
        );
        assert_eq!(config.get_f64("sankey.min"), Some(12.0));
    }

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut config = VisualizerConfig::empty_object();
        config.set_value("graph.margin", json!(40));
        assert_eq!(config.get_u64("graph.margin"), Some(40));
    }

    #[test]
    fn malformed_params_are_reported() {
        let config = VisualizerConfig::with_overrides(&json!({
            "scoring": { "default": { "threshold": "high" } }
        }));
        assert!(matches!(
            config.scoring_params(&ScoringKind::Synset),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
