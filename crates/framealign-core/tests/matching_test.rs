use framealign_core::{
    AlignmentDocument, AlignmentStore, GraphLink, MatchingGraph, NodeKind, VisualizerConfig,
};
use serde_json::json;
use std::path::PathBuf;

fn fixture_store() -> AlignmentStore {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("alignment")
        .join("basic.json");
    let text = std::fs::read_to_string(&path).expect("fixture");
    let mut store = AlignmentStore::new(VisualizerConfig::default());
    store.load_json(&text).expect("load ok");
    store
}

fn graph_for(store: &mut AlignmentStore, scoring: &str, left: &str, right: &str) -> MatchingGraph {
    store.set_scoring(scoring).unwrap();
    store.set_selected_frame_pair(Some(left), Some(right)).unwrap();
    store.graph_data()
}

fn names(graph: &MatchingGraph, kind: NodeKind) -> Vec<&str> {
    graph
        .nodes
        .iter()
        .filter(|n| n.kind == kind)
        .map(|n| n.name.as_str())
        .collect()
}

fn link_names<'a>(graph: &'a MatchingGraph) -> Vec<(&'a str, &'a str)> {
    graph
        .links
        .iter()
        .map(|l| {
            (
                graph.nodes[l.source].name.as_str(),
                graph.nodes[l.target].name.as_str(),
            )
        })
        .collect()
}

#[test]
fn shared_synset_makes_the_left_lu_matching() {
    let doc = AlignmentDocument::from_json_value(json!({
        "db": ["bfn", "l2"],
        "lang": ["en", "xx"],
        "alignments": [{ "id": "wn", "type": "lu_wordnet", "data": [[0.0]] }],
        "indices": [["L"], ["R"]],
        "frames": {
            "L": { "gid": "L", "name": "Left", "language": "en", "LUs": ["a", "b"] },
            "R": { "gid": "R", "name": "Right", "language": "xx", "LUs": ["x"] }
        },
        "resources": { "lu_to_syn": { "a": ["s1"], "x": ["s1"] } }
    }))
    .unwrap();
    let mut store = AlignmentStore::new(VisualizerConfig::default());
    store.load(doc).unwrap();
    store.set_scoring("wn").unwrap();
    store.update_params(|p| p.threshold = 0.0);

    let graph = graph_for(&mut store, "wn", "L", "R");
    let intermediates: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Intermediate)
        .collect();
    assert_eq!(intermediates.len(), 1);
    assert_eq!(intermediates[0].name, "s1");
    assert_eq!(intermediates[0].is_intersection, Some(true));

    let a = graph.find(NodeKind::Left, "a").unwrap();
    let b = graph.find(NodeKind::Left, "b").unwrap();
    assert!(graph.nodes[a].is_matching_node);
    assert!(!graph.nodes[b].is_matching_node);

    assert_eq!(link_names(&graph), vec![("a", "s1"), ("s1", "x")]);
    assert!(graph.links.iter().all(|l| l.is_directed));
}

#[test]
fn wordnet_graph_keeps_only_left_reachable_synsets() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "wn", "E1", "P1");
    assert_eq!(names(&graph, NodeKind::Left), vec!["move.v", "go.v"]);
    assert_eq!(names(&graph, NodeKind::Right), vec!["mover.v"]);
    assert_eq!(names(&graph, NodeKind::Intermediate), vec!["s1", "s2"]);
    assert_eq!(
        link_names(&graph),
        vec![("move.v", "s1"), ("go.v", "s2"), ("s1", "mover.v")]
    );

    let s1 = graph.find(NodeKind::Intermediate, "s1").unwrap();
    assert_eq!(graph.nodes[s1].in_degree, 1);
    assert_eq!(graph.nodes[s1].out_degree, 1);
    assert!(graph.nodes.iter().all(|n| n.is_reference_node == (n.kind == NodeKind::Left)));

    let summary = graph.summary();
    assert_eq!((summary.matching, summary.reference), (1, 1));
    assert_eq!(summary.score, 0.5);
}

#[test]
fn wordnet_graph_drops_right_only_synsets() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "wn", "E2", "P2");
    assert_eq!(names(&graph, NodeKind::Intermediate), vec!["s3"]);
    assert_eq!(
        link_names(&graph),
        vec![("arrive.v", "s3"), ("s3", "chegar.v")]
    );
}

#[test]
fn synset_graph_keeps_every_synset() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "syn", "E2", "P2");
    assert_eq!(names(&graph, NodeKind::Intermediate), vec!["s3", "s2"]);
    assert_eq!(graph.links.len(), 3);
    assert!(
        graph
            .links
            .iter()
            .all(|l| graph.nodes[l.target].kind == NodeKind::Intermediate)
    );
    let summary = graph.summary();
    assert_eq!((summary.matching, summary.reference), (1, 0));
    assert_eq!(summary.score, 1.0);
}

#[test]
fn vector_graph_names_neighbors_by_word() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "muse", "E1", "P1");
    assert_eq!(
        names(&graph, NodeKind::Intermediate),
        vec!["andar", "ir", "correr"]
    );
    assert_eq!(
        link_names(&graph),
        vec![
            ("move.v", "andar"),
            ("move.v", "ir"),
            ("go.v", "correr"),
            ("andar", "mover.v")
        ]
    );
    let andar = graph.find(NodeKind::Intermediate, "10").unwrap();
    assert_eq!(graph.nodes[andar].is_intersection, Some(true));
}

#[test]
fn vector_graph_applies_similarity_filter() {
    let mut store = fixture_store();
    store.set_scoring("muse").unwrap();
    store.update_params(|p| {
        p.neighborhood_size = Some(1);
        p.similarity_threshold = Some(0.85);
    });
    store.set_selected_frame_pair(Some("E1"), Some("P1")).unwrap();
    let graph = store.graph_data();
    assert_eq!(names(&graph, NodeKind::Intermediate), vec!["andar"]);
    assert_eq!(graph.summary().score, 0.5);
}

#[test]
fn bert_graph_uses_vector_neighbors() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "bert", "E1", "P1");
    assert_eq!(names(&graph, NodeKind::Intermediate).len(), 3);
}

#[test]
fn frame_element_graph_links_equal_names() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "fe", "E1", "P2");
    assert_eq!(
        graph.links,
        vec![
            GraphLink {
                source: 0,
                target: 2,
                is_directed: false
            },
            GraphLink {
                source: 1,
                target: 3,
                is_directed: false
            }
        ]
    );
    assert_eq!(graph.summary().score, 1.0);

    let partial = graph_for(&mut store, "fe", "E1", "P1");
    assert_eq!(partial.summary().score, 0.5);
}

#[test]
fn incomplete_selection_yields_empty_graph() {
    let mut store = fixture_store();
    assert!(store.graph_data().is_empty());
    store.set_scoring("wn").unwrap();
    store.set_selected_frame_pair(Some("E1"), None).unwrap();
    assert!(store.graph_data().is_empty());
}

#[test]
fn synset_tooltip_highlights_linked_lemmas() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "wn", "E1", "P1");
    let s1 = graph.find(NodeKind::Intermediate, "s1").unwrap();
    let details = store.synset_details(&graph, s1).unwrap();
    assert_eq!(details.definition, "change position");
    let highlighted: Vec<(&str, bool)> = details
        .reference_lemmas
        .iter()
        .map(|l| (l.text.as_str(), l.highlighted))
        .collect();
    assert_eq!(highlighted, vec![("move", true), ("go", false)]);
    assert_eq!(details.l2_language, "pt");
    assert!(details.l2_lemmas[0].highlighted);
}

#[test]
fn graph_serializes_with_camel_case_fields() {
    let mut store = fixture_store();
    let graph = graph_for(&mut store, "wn", "E1", "P1");
    let value = serde_json::to_value(&graph).unwrap();
    let first = &value["nodes"][0];
    assert_eq!(first["type"], "left");
    assert_eq!(first["isMatchingNode"], true);
    assert_eq!(first["outDegree"], 1);
    assert!(first.get("isIntersection").is_none());
    assert_eq!(value["nodes"][3]["isIntersection"], true);
    assert_eq!(value["links"][0]["isDirected"], true);
}
