use log::debug;

use super::tree::{MergeTree, NodeId};
use crate::error::Result;
use crate::library::SimilarityLibrary;
use crate::model::Sample;

/// Distance matrix from library scores.
///
/// Scores are normalised by their maximum, then `distance = 1 - score`. The
/// diagonal is 0. With no positive score every off-diagonal distance is 1.
pub fn distance_matrix(library: &SimilarityLibrary, n: usize) -> Vec<Vec<f64>> {
    let mut scores = vec![vec![0.0; n]; n];
    let mut max = 0.0_f64;
    for (i, row) in scores.iter_mut().enumerate() {
        for (j, score) in row.iter_mut().enumerate() {
            if i != j {
                *score = library.score(i, j);
                max = max.max(*score);
            }
        }
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .enumerate()
                .map(|(j, score)| {
                    if i == j {
                        0.0
                    } else if max > 0.0 {
                        1.0 - score / max
                    } else {
                        1.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Complete-linkage agglomerative clustering of samples.
#[derive(Debug, Clone, Copy)]
pub struct DendrogramBuilder<'a> {
    library: &'a SimilarityLibrary,
}

impl<'a> DendrogramBuilder<'a> {
    /// Builder over `library`.
    pub fn new(library: &'a SimilarityLibrary) -> Self {
        Self { library }
    }

    /// Cluster `samples` into a binary merge tree.
    ///
    /// At every step the closest pair of active clusters is joined; ties go to
    /// the pair found first scanning clusters in creation order. The distance
    /// between clusters is the largest distance between their members.
    pub fn build(&self, samples: &[Sample]) -> Result<MergeTree> {
        let n = samples.len();
        self.library.check_covers(n)?;

        let mut tree = MergeTree::new();
        if n == 0 {
            return Ok(tree);
        }

        // active clusters: (tree node, member sample positions)
        let mut active: Vec<(NodeId, Vec<usize>)> = samples
            .iter()
            .enumerate()
            .map(|(i, sample)| (tree.add_leaf(sample.label(), i), vec![i]))
            .collect();
        if n == 1 {
            tree.set_root(active[0].0);
            return Ok(tree);
        }

        let distances = distance_matrix(self.library, n);
        let linkage = |a: &[usize], b: &[usize]| {
            a.iter()
                .flat_map(|&i| b.iter().map(move |&j| (i, j)))
                .map(|(i, j)| distances[i][j])
                .fold(0.0_f64, f64::max)
        };

        let mut merges = 0;
        while active.len() > 1 {
            let mut best: Option<(f64, usize, usize)> = None;
            for x in 0..active.len() {
                for y in (x + 1)..active.len() {
                    let d = linkage(&active[x].1, &active[y].1);
                    if best.map_or(true, |(min, _, _)| d < min) {
                        best = Some((d, x, y));
                    }
                }
            }
            let Some((distance, x, y)) = best else {
                break;
            };

            merges += 1;
            let (second, second_members) = active.remove(y);
            let (first, mut members) = active.remove(x);
            let name = format!("cluster#{merges}");
            debug!(
                "Joining {} and {} as {} at distance {:.4}",
                tree.node(first).map_or("?", |n| n.name.as_str()),
                tree.node(second).map_or("?", |n| n.name.as_str()),
                name,
                distance
            );
            let node = tree.add_internal(name, distance, &[first, second]);
            members.extend(second_members);
            active.push((node, members));
        }

        if let Some(&(root, _)) = active.first() {
            tree.set_root(root);
        }
        Ok(tree)
    }
}
