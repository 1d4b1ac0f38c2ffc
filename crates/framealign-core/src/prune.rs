use crate::ingest::AlignmentEdge;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Keeps, per source frame, its `quota` highest-scoring edges. `None` returns `edges` unchanged.
///
/// The result is ordered by source descending, then score descending.
pub fn prune(mut edges: Vec<AlignmentEdge>, quota: Option<usize>) -> Vec<AlignmentEdge> {
    let Some(quota) = quota else {
        return edges;
    };

    edges.sort_by(|a, b| {
        b.source
            .cmp(&a.source)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    edges.retain(|edge| {
        let count = counts.entry(edge.source.clone()).or_default();
        *count += 1;
        *count <= quota
    });
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_top_edges_per_source() {
        let edges = vec![
            AlignmentEdge::new("F1", "G1", 0.9),
            AlignmentEdge::new("F1", "G2", 0.5),
            AlignmentEdge::new("F1", "G3", 0.7),
        ];
        assert_eq!(
            prune(edges, Some(2)),
            vec![
                AlignmentEdge::new("F1", "G1", 0.9),
                AlignmentEdge::new("F1", "G3", 0.7)
            ]
        );
    }

    #[test]
    fn quota_is_per_source_not_global() {
        let edges = vec![
            AlignmentEdge::new("A", "x", 0.1),
            AlignmentEdge::new("B", "x", 0.9),
            AlignmentEdge::new("A", "y", 0.2),
            AlignmentEdge::new("B", "y", 0.8),
        ];
        let kept = prune(edges, Some(1));
        assert_eq!(
            kept,
            vec![
                AlignmentEdge::new("B", "x", 0.9),
                AlignmentEdge::new("A", "y", 0.2)
            ]
        );
    }

    #[test]
    fn disabled_quota_is_identity() {
        let edges = vec![
            AlignmentEdge::new("A", "x", 0.1),
            AlignmentEdge::new("B", "x", 0.9),
        ];
        assert_eq!(prune(edges.clone(), None), edges);
    }

    #[test]
    fn zero_quota_drops_everything() {
        let edges = vec![AlignmentEdge::new("A", "x", 0.1)];
        assert!(prune(edges, Some(0)).is_empty());
    }
}
