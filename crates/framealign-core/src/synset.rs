//! Tooltip data for synset intermediate nodes.

use crate::document::Resources;
use crate::matching::{MatchingGraph, NodeKind};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemma {
    pub text: String,
    /// The lemma names an LU linked to the synset node.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynsetDetails {
    pub id: String,
    pub definition: String,
    pub reference_language: String,
    pub reference_lemmas: Vec<Lemma>,
    pub l2_language: String,
    pub l2_lemmas: Vec<Lemma>,
}

/// `run.v` → `run`.
pub fn strip_pos_suffix(name: &str) -> &str {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = RE.get_or_init(|| Regex::new(r"\.\w{1,4}$").ok()) else {
        return name;
    };
    match re.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Details of the intermediate synset node at `node`, or `None` when it is not a known synset.
pub fn synset_details(
    resources: &Resources,
    graph: &MatchingGraph,
    node: usize,
    languages: (&str, &str),
) -> Option<SynsetDetails> {
    let synset = graph.nodes.get(node)?;
    if synset.kind != NodeKind::Intermediate {
        return None;
    }
    let data = resources.syn_data.get(&synset.key)?;

    let linked: FxHashSet<&str> = graph
        .neighbors(node)
        .map(|i| strip_pos_suffix(&graph.nodes[i].name))
        .collect();
    let lemmas = |language: &str| -> Vec<Lemma> {
        data.lemmas_for(language)
            .iter()
            .map(|text| Lemma {
                text: text.clone(),
                highlighted: linked.contains(text.as_str()),
            })
            .collect()
    };

    Some(SynsetDetails {
        id: synset.key.clone(),
        definition: data.definition.clone(),
        reference_language: languages.0.to_string(),
        reference_lemmas: lemmas(languages.0),
        l2_language: languages.1.to_string(),
        l2_lemmas: lemmas(languages.1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Frame, LexicalUnit, SynsetData};
    use crate::matching::MatchingGraphBuilder;
    use crate::scoring::NeighborFilter;

    #[test]
    fn strips_short_suffixes_only() {
        assert_eq!(strip_pos_suffix("run.v"), "run");
        assert_eq!(strip_pos_suffix("andar.verb"), "andar");
        assert_eq!(strip_pos_suffix("a.b.long_suffix"), "a.b.long_suffix");
        assert_eq!(strip_pos_suffix("plain"), "plain");
    }

    #[test]
    fn highlights_lemmas_of_linked_lus() {
        let mut res = Resources::default();
        res.lu_to_syn.insert("run.v".into(), vec!["s1".into()]);
        res.lu_to_syn.insert("correr.v".into(), vec!["s1".into()]);
        let mut lemmas = rustc_hash::FxHashMap::default();
        lemmas.insert("en".to_string(), vec!["run".to_string(), "go".to_string()]);
        lemmas.insert("pt".to_string(), vec!["correr".to_string()]);
        res.syn_data.insert(
            "s1".into(),
            SynsetData {
                definition: "move fast".into(),
                lemmas,
            },
        );

        let frame = |gid: &str, lu: &str| Frame {
            gid: gid.into(),
            name: gid.into(),
            language: "en".into(),
            lus: vec![LexicalUnit {
                gid: lu.into(),
                name: lu.into(),
            }],
            fes: Vec::new(),
        };
        let graph = MatchingGraphBuilder::new(&res, NeighborFilter::default()).synsets(
            &frame("A", "run.v"),
            &frame("B", "correr.v"),
            false,
        );
        let node = graph.find(NodeKind::Intermediate, "s1").unwrap();
        let details = synset_details(&res, &graph, node, ("en", "pt")).unwrap();
        assert_eq!(details.definition, "move fast");
        assert_eq!(
            details.reference_lemmas,
            vec![
                Lemma {
                    text: "run".into(),
                    highlighted: true
                },
                Lemma {
                    text: "go".into(),
                    highlighted: false
                }
            ]
        );
        assert!(details.l2_lemmas[0].highlighted);
        assert!(synset_details(&res, &graph, 0, ("en", "pt")).is_none());
    }
}
