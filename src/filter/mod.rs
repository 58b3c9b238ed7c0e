//! # Result Filters
//!
//! Post-processing steps run after matching. Each filter splits its input
//! list into accepted and rejected rows; the pipeline feeds only the accepted
//! rows to the next filter.
//!
//! - [`SizeFilter`]: keeps rows with a minimum number of features
//! - [`RemovalFilter`]: ranks rows or features by a quality score (graph
//!   connectivity, intensity consistency, or a seeded random control) and
//!   rejects every row touched by the bottom fraction
//!
//! Filters never mutate features. Score-based filters report what they marked
//! in a [`StatusTable`] returned with the outcome.

mod removal;
mod size;
mod spec;


use std::collections::{BTreeMap, HashMap};

pub use removal::{Granularity, RemovalFilter, ScoreKind};
pub use size::SizeFilter;
pub use spec::{FilterKind, FilterSpec, DEFAULT_RANDOM_SEED};

use crate::model::{ConsensusList, FeatureKey, Tolerance};

/// Per-feature status produced by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureStatus {
    /// The feature was marked for deletion.
    pub marked: bool,
    /// Quality score the feature was ranked by, if it was ranked.
    pub score: Option<f64>,
}

/// Statuses keyed by feature, in key order.
pub type StatusTable = BTreeMap<FeatureKey, FeatureStatus>;

/// Result of running one filter over a list.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Rows passed on to the next filter.
    pub accepted: ConsensusList,
    /// Rows removed by this filter.
    pub rejected: ConsensusList,
    /// Statuses of every feature the filter scored.
    pub statuses: StatusTable,
}

impl FilterOutcome {
    /// Features marked for deletion.
    pub fn marked(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.statuses
            .iter()
            .filter(|(_, status)| status.marked)
            .map(|(key, _)| *key)
    }

    /// True if accepted and rejected rows together are exactly the input rows,
    /// each one used once.
    pub fn is_partition_of(&self, input: &ConsensusList) -> bool {
        if self.accepted.len() + self.rejected.len() != input.len() {
            return false;
        }
        let mut remaining: HashMap<Vec<FeatureKey>, usize> = HashMap::new();
        for keys in input.membership() {
            *remaining.entry(keys).or_default() += 1;
        }
        self.accepted
            .iter()
            .chain(self.rejected.iter())
            .all(|row| match remaining.get_mut(&row.keys().collect::<Vec<_>>()) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    true
                }
                _ => false,
            })
    }
}

/// A post-matching filter step.
pub trait ResultFilter: Send + Sync {
    /// Human-readable name used in logs.
    fn label(&self) -> String;

    /// Split `list` into accepted and rejected rows.
    fn process(&self, list: &ConsensusList) -> FilterOutcome;
}

/// Instantiate the filter described by `spec`; `tolerance` feeds the graph scores.
pub fn build_filter(spec: &FilterSpec, tolerance: Tolerance) -> Box<dyn ResultFilter> {
    let seed = spec.seed.unwrap_or(DEFAULT_RANDOM_SEED);
    let removal = |granularity, score| -> Box<dyn ResultFilter> {
        Box::new(RemovalFilter::new(granularity, score, spec.threshold, tolerance).with_seed(seed))
    };
    match spec.kind {
        FilterKind::Size => Box::new(SizeFilter::new(spec.threshold as usize)),
        FilterKind::RowGraph => removal(Granularity::Row, ScoreKind::Graph),
        FilterKind::RowIntensity => removal(Granularity::Row, ScoreKind::Intensity),
        FilterKind::RowRandom => removal(Granularity::Row, ScoreKind::Random),
        FilterKind::FeatureGraph => removal(Granularity::Feature, ScoreKind::Graph),
        FilterKind::FeatureIntensity => removal(Granularity::Feature, ScoreKind::Intensity),
        FilterKind::FeatureRandom => removal(Granularity::Feature, ScoreKind::Random),
    }
}
