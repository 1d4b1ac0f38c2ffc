use framealign_core::{
    AlignmentDocument, AlignmentStore, SankeyEdge, VisualizerConfig, VectorMatcher,
    NeighborFilter,
};
use serde_json::json;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture_text() -> String {
    let path = workspace_root()
        .join("fixtures")
        .join("alignment")
        .join("basic.json");
    std::fs::read_to_string(&path).expect("fixture")
}

fn fixture() -> AlignmentDocument {
    AlignmentDocument::from_json_str(&fixture_text()).expect("valid fixture")
}

fn loaded_store() -> AlignmentStore {
    let mut store = AlignmentStore::new(VisualizerConfig::default());
    store.load(fixture()).expect("load ok");
    store
}

fn edge(left: &str, right: &str, score: f64) -> SankeyEdge {
    SankeyEdge(left.to_string(), right.to_string(), score)
}

#[test]
fn scoring_options_carry_technique_defaults() {
    let store = loaded_store();
    let ids: Vec<&str> = store
        .scoring_options()
        .iter()
        .map(|o| o.id.as_str())
        .collect();
    assert_eq!(ids, vec!["wn", "syn", "fe", "muse", "bert"]);

    let muse = &store.scoring_options()[3];
    assert_eq!(muse.params.threshold, 0.75);
    assert_eq!(muse.params.neighborhood_size, Some(5));
    assert_eq!(muse.params.edge_quota(), Some(5));

    let syn = &store.scoring_options()[1];
    assert_eq!(syn.params.threshold, 0.1);
    assert_eq!(syn.params.edge_quota(), None);
}

#[test]
fn ingested_sankey_edges_are_labelled() {
    let mut store = loaded_store();
    store.set_scoring("wn").unwrap();
    store.set_sankey_frames(["E1", "P2"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![
            edge("Motion.en", "Movimento.pt", 0.5),
            edge("Arriving.en", "Chegada.pt", 0.8)
        ]
    );
    assert_eq!(
        serde_json::to_value(store.sankey_data()).unwrap(),
        json!([["Motion.en", "Movimento.pt", 0.5], ["Arriving.en", "Chegada.pt", 0.8]])
    );
}

#[test]
fn reloading_yields_identical_sankey_data() {
    let mut store = loaded_store();
    let select = |store: &mut AlignmentStore| {
        store.set_scoring("syn").unwrap();
        store.set_sankey_frames(["E1", "P2"]).unwrap();
        store.sankey_data()
    };
    let first = select(&mut store);
    store.load(fixture()).unwrap();
    let second = select(&mut store);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn cooperative_load_matches_blocking_load() {
    let config = VisualizerConfig::with_overrides(&json!({
        "ingest": { "chunkSize": 1, "timeBudgetMs": 0 }
    }));
    let mut async_store = AlignmentStore::new(config);
    futures::executor::block_on(async_store.load_async(fixture())).expect("load ok");

    let mut store = loaded_store();
    for s in [&mut async_store, &mut store] {
        s.set_scoring("fe").unwrap();
        s.set_sankey_frames(["P1"]).unwrap();
    }
    assert_eq!(async_store.sankey_data(), store.sankey_data());
    assert_eq!(async_store.sankey_data().len(), 2);
}

#[test]
fn malformed_document_leaves_store_untouched() {
    let mut store = loaded_store();
    store.set_scoring("wn").unwrap();
    assert!(store.load_json("{\"db\": [\"bfn\"]").is_err());
    assert_eq!(store.scoring().map(|o| o.id.as_str()), Some("wn"));
    assert_eq!(store.scoring_options().len(), 5);
}

#[test]
fn vector_edges_are_computed_for_the_frame_set() {
    let mut store = loaded_store();
    store.set_scoring("muse").unwrap();
    store.update_params(|p| p.threshold = 0.0);

    store.set_sankey_frames(["E1"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![
            edge("Motion.en", "Movimento.pt", 0.5),
            edge("Motion.en", "Chegada.pt", 0.5)
        ]
    );

    store.set_sankey_frames(["P2"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![
            edge("Arriving.en", "Chegada.pt", 1.0),
            edge("Motion.en", "Chegada.pt", 0.5)
        ]
    );
}

#[test]
fn selected_pairs_are_scored_once() {
    let mut store = loaded_store();
    store.set_scoring("muse").unwrap();
    store.update_params(|p| p.threshold = 0.0);
    store.set_sankey_frames(["E1", "P1"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![
            edge("Motion.en", "Movimento.pt", 0.5),
            edge("Motion.en", "Chegada.pt", 0.5)
        ]
    );
}

#[test]
fn similarity_threshold_change_recomputes() {
    let mut store = loaded_store();
    store.set_scoring("muse").unwrap();
    store.update_params(|p| p.threshold = 0.0);
    store.set_sankey_frames(["E1"]).unwrap();
    assert_eq!(store.sankey_data().len(), 2);

    store.update_params(|p| p.similarity_threshold = Some(0.85));
    assert_eq!(
        store.sankey_data(),
        vec![edge("Motion.en", "Movimento.pt", 0.5)]
    );
}

#[test]
fn quota_limits_edges_per_source() {
    let mut store = loaded_store();
    store.set_scoring("muse").unwrap();
    store.update_params(|p| {
        p.threshold = 0.0;
        p.sankey_max_edges = Some(1);
    });
    store.set_sankey_frames(["E1"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![edge("Motion.en", "Movimento.pt", 0.5)]
    );
}

#[test]
fn only_lu_muse_revalidates_cached_vector_edges() {
    let mut store = loaded_store();

    store.set_scoring("bert").unwrap();
    store.set_sankey_frames(["E1"]).unwrap();
    assert_eq!(store.sankey_data().len(), 2);
    store.set_sankey_frames(["E2"]).unwrap();
    assert!(store.sankey_data().is_empty());

    store.set_scoring("muse").unwrap();
    store.update_params(|p| p.threshold = 0.0);
    store.set_sankey_frames(["E2"]).unwrap();
    assert_eq!(
        store.sankey_data(),
        vec![edge("Arriving.en", "Chegada.pt", 1.0)]
    );
}

#[test]
fn vector_score_is_asymmetric() {
    let doc = fixture();
    let e1 = doc.frame("E1").unwrap();
    let p1 = doc.frame("P1").unwrap();
    let mut matcher = VectorMatcher::new(&doc.resources, NeighborFilter::new(Some(5), Some(0.3)));
    assert_eq!(matcher.score(e1, p1), 0.5);
    assert_eq!(matcher.score(p1, e1), 1.0);
}

#[test]
fn frames_resolve_by_label() {
    let store = loaded_store();
    assert_eq!(
        store.frame_by_label("Chegada.pt").map(|f| f.gid.as_str()),
        Some("P2")
    );
    assert!(store.frame_by_label("Chegada.de").is_none());
}
