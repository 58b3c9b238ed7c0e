use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use super::feature::{Feature, FeatureKey, SampleId};
use super::pair::FeaturePair;
use super::sample::Sample;
use super::tolerance::Tolerance;
use crate::error::{AlignmentError, Result};

/// Derived per-row quality statistics, averaged over all feature pairs in the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStats {
    /// Tolerance the graph score was computed with.
    pub tolerance: Tolerance,
    /// Number of feature pairs in the row.
    pub pair_count: usize,
    /// Mean pair graph score, `None` for singleton rows.
    pub graph_score: Option<f64>,
    /// Mean pair intensity score, `None` for singleton rows.
    pub intensity_score: Option<f64>,
}

impl RowStats {
    fn compute(features: &[Arc<Feature>], tolerance: &Tolerance) -> Self {
        let mut pair_count = 0usize;
        let mut graph_total = 0.0;
        let mut intensity_total = 0.0;
        for (i, first) in features.iter().enumerate() {
            for second in &features[i + 1..] {
                let pair = FeaturePair::new(first, second);
                graph_total += pair.graph_score(tolerance);
                intensity_total += pair.intensity_score();
                pair_count += 1;
            }
        }
        let mean = |total: f64| (pair_count > 0).then(|| total / pair_count as f64);
        Self {
            tolerance: *tolerance,
            pair_count,
            graph_score: mean(graph_total),
            intensity_score: mean(intensity_total),
        }
    }
}

/// Features from distinct samples believed to be the same chemical entity.
#[derive(Debug, Clone)]
pub struct ConsensusRow {
    features: Vec<Arc<Feature>>,
    mean_mass: f64,
    mean_rt: f64,
    stats: OnceLock<RowStats>,
}

impl ConsensusRow {
    /// Row wrapping a single feature.
    pub fn singleton(feature: Arc<Feature>) -> Self {
        Self {
            mean_mass: feature.mass,
            mean_rt: feature.rt,
            features: vec![feature],
            stats: OnceLock::new(),
        }
    }

    /// Union of two rows.
    ///
    /// Fails with [`AlignmentError::InvariantViolation`] if both rows hold a
    /// feature from the same sample; `position` names the row in that error.
    pub fn merge(first: &ConsensusRow, second: &ConsensusRow, position: usize) -> Result<Self> {
        if let Some(sample) = first.shared_sample(second) {
            return Err(AlignmentError::InvariantViolation {
                row: position,
                sample,
            });
        }
        let features: Vec<Arc<Feature>> = first
            .features
            .iter()
            .chain(second.features.iter())
            .cloned()
            .collect();
        Ok(Self::from_features(features))
    }

    pub(super) fn from_features(features: Vec<Arc<Feature>>) -> Self {
        let n = features.len().max(1) as f64;
        let mean_mass = features.iter().map(|f| f.mass).sum::<f64>() / n;
        let mean_rt = features.iter().map(|f| f.rt).sum::<f64>() / n;
        Self {
            features,
            mean_mass,
            mean_rt,
            stats: OnceLock::new(),
        }
    }

    /// Features in the order they joined the row.
    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Rows always hold at least one feature.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Mean mass of the row's features.
    pub fn mean_mass(&self) -> f64 {
        self.mean_mass
    }

    /// Mean retention time of the row's features.
    pub fn mean_rt(&self) -> f64 {
        self.mean_rt
    }

    /// Arena keys of the row's features.
    pub fn keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.features.iter().map(|f| f.key)
    }

    /// Samples contributing to this row.
    pub fn samples(&self) -> impl Iterator<Item = SampleId> + '_ {
        self.features.iter().map(|f| f.sample())
    }

    /// Whether a feature of `sample` is in the row.
    pub fn contains_sample(&self, sample: SampleId) -> bool {
        self.features.iter().any(|f| f.sample() == sample)
    }

    /// Some sample contributing to both rows, if any.
    pub fn shared_sample(&self, other: &ConsensusRow) -> Option<SampleId> {
        self.samples().find(|&s| other.contains_sample(s))
    }

    /// All unordered feature pairs in the row.
    pub fn pairs(&self) -> impl Iterator<Item = FeaturePair<'_>> + '_ {
        self.features.iter().enumerate().flat_map(move |(i, first)| {
            self.features[i + 1..]
                .iter()
                .map(move |second| FeaturePair::new(first, second))
        })
    }

    /// Pair statistics, cached after the first request for a given tolerance.
    pub fn stats(&self, tolerance: &Tolerance) -> RowStats {
        if let Some(cached) = self.stats.get() {
            if cached.tolerance == *tolerance {
                return *cached;
            }
            return RowStats::compute(&self.features, tolerance);
        }
        *self
            .stats
            .get_or_init(|| RowStats::compute(&self.features, tolerance))
    }

    fn duplicate_sample(&self) -> Option<SampleId> {
        let mut seen = HashSet::with_capacity(self.features.len());
        self.samples().find(|s| !seen.insert(*s))
    }
}

impl PartialEq for ConsensusRow {
    fn eq(&self, other: &Self) -> bool {
        self.keys().eq(other.keys())
    }
}

/// Ordered consensus rows representing the alignment state of a set of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsensusList {
    label: String,
    rows: Vec<ConsensusRow>,
}

impl ConsensusList {
    /// Empty list.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rows: Vec::new(),
        }
    }

    /// One singleton row per feature of `sample`, in feature order.
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            label: sample.label().to_string(),
            rows: sample
                .features()
                .iter()
                .cloned()
                .map(ConsensusRow::singleton)
                .collect(),
        }
    }

    /// Wrap existing rows.
    pub fn from_rows(label: impl Into<String>, rows: Vec<ConsensusRow>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }

    /// Label of the subtree this list aligns.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the list.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Rows in order.
    pub fn rows(&self) -> &[ConsensusRow] {
        &self.rows
    }

    /// Consume the list.
    pub fn into_rows(self) -> Vec<ConsensusRow> {
        self.rows
    }

    /// Append a row.
    pub fn push(&mut self, row: ConsensusRow) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows.
    pub fn iter(&self) -> std::slice::Iter<'_, ConsensusRow> {
        self.rows.iter()
    }

    /// Total number of features over all rows.
    pub fn feature_count(&self) -> usize {
        self.rows.iter().map(ConsensusRow::len).sum()
    }

    /// Row membership as feature keys, for comparing alignment results.
    pub fn membership(&self) -> Vec<Vec<FeatureKey>> {
        self.rows.iter().map(|r| r.keys().collect()).collect()
    }

    /// Check that no row holds two features from the same sample.
    pub fn validate(&self) -> Result<()> {
        for (position, row) in self.rows.iter().enumerate() {
            if let Some(sample) = row.duplicate_sample() {
                return Err(AlignmentError::InvariantViolation {
                    row: position,
                    sample,
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ConsensusList {
    type Item = &'a ConsensusRow;
    type IntoIter = std::slice::Iter<'a, ConsensusRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
