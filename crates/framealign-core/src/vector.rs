//! Vector-neighbor frame scoring.

use crate::document::{Frame, Resources};
use crate::scoring::NeighborFilter;
use rustc_hash::{FxHashMap, FxHashSet};

/// Scores reference frames against L2 frames through their LUs' cross-lingual vector neighbors.
///
/// Per-frame neighbor sets are memoized for the lifetime of the matcher, which is meant to cover
/// one edge computation pass.
#[derive(Debug)]
pub struct VectorMatcher<'a> {
    resources: &'a Resources,
    filter: NeighborFilter,
    neighbors: FxHashMap<String, Vec<(f64, u64)>>,
    reachable: FxHashMap<String, FxHashSet<u64>>,
}

impl<'a> VectorMatcher<'a> {
    pub fn new(resources: &'a Resources, filter: NeighborFilter) -> Self {
        Self {
            resources,
            filter,
            neighbors: FxHashMap::default(),
            reachable: FxHashMap::default(),
        }
    }

    /// Fraction of `reference`'s LUs with a qualifying neighbor reachable from `l2`.
    ///
    /// Not symmetric: only `reference`'s neighbors are truncated and thresholded, and the count is
    /// normalized by `reference`'s LU count.
    pub fn score(&mut self, reference: &Frame, l2: &Frame) -> f64 {
        if reference.lus.is_empty() {
            return 0.0;
        }

        let resources = self.resources;
        let filter = self.filter;
        let reachable = self
            .reachable
            .entry(l2.gid.clone())
            .or_insert_with(|| {
                l2.lus
                    .iter()
                    .filter_map(|lu| resources.lu_vec_nn.get(&lu.gid))
                    .flat_map(|list| list.iter().map(|&(_, id)| id))
                    .collect()
            });
        let neighbors = self
            .neighbors
            .entry(reference.gid.clone())
            .or_insert_with(|| {
                reference
                    .lus
                    .iter()
                    .filter_map(|lu| resources.lu_vec_nn.get(&lu.gid))
                    .flat_map(|list| {
                        list[..filter.take(list)]
                            .iter()
                            .copied()
                            .filter(move |&(sim, _)| filter.passes(sim))
                    })
                    .collect()
            });

        let matches = neighbors
            .iter()
            .filter(|(_, id)| reachable.contains(id))
            .count();
        matches as f64 / reference.lus.len() as f64
    }
}
