//! Pairwise sample similarity.
//!
//! The library is filled once before clustering and read-only afterwards.
//! [`SimilarityLibrary::from_pairwise_matching`] scores every pair of samples
//! by running the feature matcher on their singleton lists.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{AlignmentError, Result};
use crate::matching::{FeatureMatcher, MatchParams};
use crate::model::{ConsensusList, Sample};
use crate::parallel::par_map;

/// Similarity of one sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PairScore {
    /// Similarity used for clustering.
    pub score: f64,
    /// Feature pairs matched between the two samples, 0 if the score was supplied directly.
    pub matched: usize,
    /// Sum of the closeness of matched pairs.
    pub total_closeness: f64,
}

impl PairScore {
    /// Score supplied directly, without matching evidence.
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }

    /// Mean closeness over `matched` pairs, 0 with no matches.
    pub fn from_matches(matched: usize, total_closeness: f64) -> Self {
        let score = if matched > 0 {
            total_closeness / matched as f64
        } else {
            0.0
        };
        Self {
            score,
            matched,
            total_closeness,
        }
    }
}

/// Sample x sample similarity matrix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimilarityLibrary {
    pairs: Vec<Vec<PairScore>>,
}

impl SimilarityLibrary {
    /// Library over `n` samples with all scores zero.
    pub fn new(n: usize) -> Self {
        Self {
            pairs: vec![vec![PairScore::default(); n]; n],
        }
    }

    /// Library from a square score matrix; the diagonal is ignored.
    pub fn from_matrix(matrix: Vec<Vec<f64>>) -> Result<Self> {
        let n = matrix.len();
        if let Some(row) = matrix.iter().find(|row| row.len() != n) {
            return Err(AlignmentError::LibraryMismatch {
                expected: n,
                found: row.len(),
            });
        }
        let pairs = matrix
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(j, score)| {
                        if i == j {
                            PairScore::default()
                        } else {
                            PairScore::from_score(score)
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Self { pairs })
    }

    /// Score every unordered sample pair by matching their features.
    ///
    /// The pair score is the mean closeness of the matched feature pairs.
    pub fn from_pairwise_matching(samples: &[Sample], params: &MatchParams) -> Result<Self> {
        let n = samples.len();
        let lists: Vec<ConsensusList> = samples.iter().map(ConsensusList::from_sample).collect();
        let jobs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        info!("Building similarity library over {} sample pairs", jobs.len());

        // pairs run concurrently, so each matcher call stays sequential;
        // pair scores are plain closeness
        let params = MatchParams {
            use_group_weight: false,
            ..params.with_parallel(false)
        };
        let matcher = FeatureMatcher::new(params);
        let scored = par_map(&jobs, params.parallel, |_, &(i, j)| {
            matcher
                .merge_with_matches(&lists[i], &lists[j])
                .map(|outcome| {
                    let total = outcome.matches.iter().map(|m| m.closeness).sum();
                    PairScore::from_matches(outcome.matches.len(), total)
                })
        });

        let mut library = Self::new(n);
        for (&(i, j), score) in jobs.iter().zip(scored) {
            let score = score?;
            debug!(
                "{} vs {}: {} matched, score {:.4}",
                samples[i].label(),
                samples[j].label(),
                score.matched,
                score.score
            );
            library.set_pair(i, j, score);
        }
        Ok(library)
    }

    /// Set the similarity of `a` and `b` in both directions.
    pub fn set_score(&mut self, a: usize, b: usize, score: f64) {
        self.set_pair(a, b, PairScore::from_score(score));
    }

    fn set_pair(&mut self, a: usize, b: usize, score: PairScore) {
        if a == b {
            return;
        }
        self.pairs[a][b] = score;
        self.pairs[b][a] = score;
    }

    /// Similarity of `a` and `b`; 0 on the diagonal.
    pub fn score(&self, a: usize, b: usize) -> f64 {
        self.pair(a, b).map_or(0.0, |p| p.score)
    }

    /// Detailed score of `a` and `b`.
    pub fn pair(&self, a: usize, b: usize) -> Option<&PairScore> {
        if a == b {
            return None;
        }
        self.pairs.get(a)?.get(b)
    }

    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if the library covers no samples.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Fail unless the library covers exactly `samples` samples.
    pub fn check_covers(&self, samples: usize) -> Result<()> {
        if self.len() == samples {
            Ok(())
        } else {
            Err(AlignmentError::LibraryMismatch {
                expected: samples,
                found: self.len(),
            })
        }
    }
}
