use log::{debug, warn};

use super::tree::{MergeTree, NodeId};
use crate::error::{AlignmentError, Result};
use crate::matching::FeatureMatcher;
use crate::model::{ConsensusList, Sample};
use crate::parallel::par_map;

/// Walks a merge tree bottom-up, merging sibling results with the matcher.
///
/// Nodes are processed in waves of equal height. Every node of a wave depends
/// only on results of earlier waves, so the nodes of one wave can run
/// concurrently; a wave completes before the next one starts.
#[derive(Debug, Clone, Copy)]
pub struct MergeDriver<'a> {
    matcher: FeatureMatcher<'a>,
    parallel: bool,
}

impl<'a> MergeDriver<'a> {
    /// Driver merging with `matcher`.
    pub fn new(matcher: FeatureMatcher<'a>) -> Self {
        Self {
            matcher,
            parallel: false,
        }
    }

    /// Run independent subtrees of one wave on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Children of `id` with internal nodes first; relative order is kept.
    pub fn merge_order(tree: &MergeTree, id: NodeId) -> Vec<NodeId> {
        let Some(node) = tree.node(id) else {
            return Vec::new();
        };
        let is_leaf = |c: &NodeId| tree.node(*c).map_or(true, |n| n.is_leaf());
        let mut children = node.children.clone();
        children.sort_by_key(is_leaf);
        children
    }

    /// Consensus list of the whole tree.
    pub fn run(&self, tree: &MergeTree, samples: &[Sample]) -> Result<ConsensusList> {
        let Some(root) = tree.root() else {
            return Ok(ConsensusList::new("empty"));
        };
        tree.validate()?;

        let heights = tree.heights();
        let top = heights.get(root).copied().unwrap_or(0);
        let mut results: Vec<Option<ConsensusList>> = vec![None; tree.len()];

        for node in tree.nodes().iter().filter(|n| n.is_leaf()) {
            let sample = node
                .sample
                .and_then(|s| samples.get(s))
                .ok_or_else(|| AlignmentError::UnknownLeaf(node.name.clone()))?;
            if sample.is_empty() {
                warn!("Sample '{}' has no features", sample.label());
            }
            results[node.id] = Some(ConsensusList::from_sample(sample));
        }

        for height in 1..=top {
            // take the children's results out before fanning out
            let mut wave: Vec<(NodeId, Vec<ConsensusList>)> = Vec::new();
            for node in tree.nodes() {
                if node.is_leaf() || heights[node.id] != height {
                    continue;
                }
                let lists = Self::merge_order(tree, node.id)
                    .into_iter()
                    .map(|c| take_result(&mut results, c))
                    .collect::<Result<Vec<_>>>()?;
                wave.push((node.id, lists));
            }

            let merged = par_map(&wave, self.parallel, |_, (id, lists)| {
                self.merge_children(tree, *id, lists)
            });
            for ((id, _), list) in wave.iter().zip(merged) {
                results[*id] = Some(list?);
            }
        }

        take_result(&mut results, root)
    }

    fn merge_children(
        &self,
        tree: &MergeTree,
        id: NodeId,
        lists: &[ConsensusList],
    ) -> Result<ConsensusList> {
        let mut iter = lists.iter();
        let mut result = iter.next().cloned().unwrap_or_default();
        for child in iter {
            result = self.matcher.merge(&result, child)?;
        }
        if let Some(node) = tree.node(id) {
            debug!(
                "{}: {} rows from {} children",
                node.name,
                result.len(),
                lists.len()
            );
            result.set_label(node.name.clone());
        }
        Ok(result)
    }
}

fn take_result(results: &mut [Option<ConsensusList>], id: NodeId) -> Result<ConsensusList> {
    results
        .get_mut(id)
        .and_then(Option::take)
        .ok_or_else(|| AlignmentError::MalformedTree(format!("no result for node {id}")))
}
