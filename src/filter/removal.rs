use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::{FeatureStatus, FilterOutcome, ResultFilter, StatusTable, DEFAULT_RANDOM_SEED};
use crate::model::{ConsensusList, FeatureKey, Tolerance};

/// What a removal filter ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Whole rows, scored by the mean over the row's feature pairs.
    Row,
    /// Single features, scored by the mean over the pairs they take part in.
    Feature,
}

/// Quality score used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// Tolerance-scaled closeness of paired features.
    Graph,
    /// Agreement of paired intensities.
    Intensity,
    /// Seeded uniform-random order.
    Random,
}

/// Marks the bottom `threshold` fraction of ranked rows or features and
/// rejects every row holding a marked feature.
///
/// Only items with at least one feature pair are ranked; singleton rows carry
/// no evidence either way and are always accepted.
#[derive(Debug, Clone)]
pub struct RemovalFilter {
    granularity: Granularity,
    score: ScoreKind,
    threshold: f64,
    tolerance: Tolerance,
    seed: u64,
}

impl RemovalFilter {
    /// New removal filter; `threshold` is the fraction of ranked items to mark.
    pub fn new(
        granularity: Granularity,
        score: ScoreKind,
        threshold: f64,
        tolerance: Tolerance,
    ) -> Self {
        Self {
            granularity,
            score,
            threshold,
            tolerance,
            seed: DEFAULT_RANDOM_SEED,
        }
    }

    /// Seed for [`ScoreKind::Random`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rank items ascending and return how many of them to mark.
    fn rank<T: Ord + Copy>(&self, mut items: Vec<(f64, T)>) -> (Vec<(f64, T)>, usize) {
        match self.score {
            ScoreKind::Random => {
                items.sort_by(|a, b| a.1.cmp(&b.1));
                let mut rng = StdRng::seed_from_u64(self.seed);
                items.shuffle(&mut rng);
            }
            ScoreKind::Graph | ScoreKind::Intensity => {
                items.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            }
        }
        let count = (self.threshold * items.len() as f64).floor() as usize;
        let count = count.min(items.len());
        (items, count)
    }

    fn row_statuses(&self, list: &ConsensusList) -> StatusTable {
        let mut scored = Vec::new();
        for (position, row) in list.iter().enumerate() {
            let stats = row.stats(&self.tolerance);
            let score = match self.score {
                ScoreKind::Graph => stats.graph_score,
                ScoreKind::Intensity => stats.intensity_score,
                ScoreKind::Random => (stats.pair_count > 0).then_some(0.0),
            };
            if let Some(score) = score {
                scored.push((score, position));
            }
        }

        let (ranked, count) = self.rank(scored);
        let mut statuses = StatusTable::new();
        for (rank, (score, position)) in ranked.into_iter().enumerate() {
            let marked = rank < count;
            for key in list.rows()[position].keys() {
                statuses.insert(
                    key,
                    FeatureStatus {
                        marked,
                        score: Some(score),
                    },
                );
            }
        }
        statuses
    }

    fn feature_statuses(&self, list: &ConsensusList) -> StatusTable {
        let mut totals: BTreeMap<FeatureKey, (f64, usize)> = BTreeMap::new();
        for row in list {
            for pair in row.pairs() {
                let score = match self.score {
                    ScoreKind::Graph => pair.graph_score(&self.tolerance),
                    ScoreKind::Intensity => pair.intensity_score(),
                    ScoreKind::Random => 0.0,
                };
                for key in [pair.first.key, pair.second.key] {
                    let entry = totals.entry(key).or_insert((0.0, 0));
                    entry.0 += score;
                    entry.1 += 1;
                }
            }
        }

        let scored = totals
            .into_iter()
            .map(|(key, (total, pairs))| (total / pairs as f64, key))
            .collect();
        let (ranked, count) = self.rank(scored);
        ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (score, key))| {
                (
                    key,
                    FeatureStatus {
                        marked: rank < count,
                        score: Some(score),
                    },
                )
            })
            .collect()
    }
}

impl ResultFilter for RemovalFilter {
    fn label(&self) -> String {
        let what = match self.granularity {
            Granularity::Row => "row",
            Granularity::Feature => "feature",
        };
        let how = match self.score {
            ScoreKind::Graph => "graph",
            ScoreKind::Intensity => "intensity",
            ScoreKind::Random => "random",
        };
        format!("{what} removal by {how} score ({:.2}%)", self.threshold * 100.0)
    }

    fn process(&self, list: &ConsensusList) -> FilterOutcome {
        let statuses = match self.granularity {
            Granularity::Row => self.row_statuses(list),
            Granularity::Feature => self.feature_statuses(list),
        };

        let is_marked = |key: &FeatureKey| statuses.get(key).is_some_and(|s| s.marked);
        let (accepted, rejected): (Vec<_>, Vec<_>) = list
            .iter()
            .cloned()
            .partition(|row| !row.keys().any(|key| is_marked(&key)));

        let marked = statuses.values().filter(|s| s.marked).count();
        info!(
            "{}: {} features marked, {} rows accepted, {} rejected",
            self.label(),
            marked,
            accepted.len(),
            rejected.len()
        );

        FilterOutcome {
            accepted: ConsensusList::from_rows(list.label(), accepted),
            rejected: ConsensusList::from_rows(list.label(), rejected),
            statuses,
        }
    }
}
