use log::{debug, info, warn};

use super::{AlignmentMethod, MatchStrategy};
use crate::config::AlignmentConfig;
use crate::error::{AlignmentError, Result};
use crate::filter::{build_filter, ResultFilter, StatusTable};
use crate::library::SimilarityLibrary;
use crate::model::{ConsensusList, ConsensusRow, Sample};

/// What one filter removed during the last run.
#[derive(Debug, Clone)]
pub struct FilterReport {
    /// Filter label.
    pub label: String,
    /// Rows the filter received.
    pub input_rows: usize,
    /// Rows the filter rejected.
    pub rejected: ConsensusList,
    /// Per-feature statuses reported by the filter.
    pub statuses: StatusTable,
}

/// Match, then filter.
///
/// Filters run in registration order as a strict pipe: each one sees only the
/// rows the previous one accepted, and the last accepted set is the result.
pub struct AlignmentPipeline {
    samples: Vec<Sample>,
    method: AlignmentMethod,
    filters: Vec<Box<dyn ResultFilter>>,
    result: Option<ConsensusList>,
    reports: Vec<FilterReport>,
}

impl AlignmentPipeline {
    /// Pipeline over `samples` without filters.
    pub fn new(samples: Vec<Sample>, method: AlignmentMethod) -> Self {
        Self {
            samples,
            method,
            filters: Vec::new(),
            result: None,
            reports: Vec::new(),
        }
    }

    /// Pipeline with the strategy and filters described by `config`.
    pub fn from_config(
        config: &AlignmentConfig,
        samples: Vec<Sample>,
        library: Option<SimilarityLibrary>,
    ) -> Result<Self> {
        let method = AlignmentMethod::from_config(config, library)?;
        let mut pipeline = Self::new(samples, method);
        let tolerance = config.tolerance();
        for spec in &config.filters {
            pipeline.filters.push(build_filter(spec, tolerance));
        }
        Ok(pipeline)
    }

    /// Append a filter to the chain.
    pub fn add_filter(&mut self, filter: impl ResultFilter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Append an already boxed filter.
    pub fn add_boxed_filter(&mut self, filter: Box<dyn ResultFilter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Input samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Strategy in use.
    pub fn method(&self) -> &AlignmentMethod {
        &self.method
    }

    /// Labels of the registered filters, in order.
    pub fn filter_labels(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.label()).collect()
    }

    fn check_sample_ids(&self) -> Result<()> {
        for (position, sample) in self.samples.iter().enumerate() {
            if sample.id().0 != position {
                return Err(AlignmentError::SampleIdMismatch {
                    position,
                    id: sample.id(),
                });
            }
        }
        Ok(())
    }

    /// Run the strategy and the filter chain; returns the accepted rows.
    pub fn align(&mut self) -> Result<&[ConsensusRow]> {
        self.result = None;
        self.reports.clear();
        self.check_sample_ids()?;

        info!(
            "Aligning {} samples with the {} strategy",
            self.samples.len(),
            self.method.name()
        );
        let matched = self.method.match_features(&self.samples)?;
        matched.validate()?;
        info!(
            "Matching produced {} rows holding {} features",
            matched.len(),
            matched.feature_count()
        );

        let mut current = matched;
        for filter in &self.filters {
            let label = filter.label();
            info!("Applying {}, initial size {}", label, current.len());
            let outcome = filter.process(&current);
            if !outcome.is_partition_of(&current) {
                warn!("{} did not partition its input", label);
                return Err(AlignmentError::FilterContract { filter: label });
            }
            debug!(
                "{}: {} accepted, {} rejected",
                label,
                outcome.accepted.len(),
                outcome.rejected.len()
            );
            self.reports.push(FilterReport {
                label,
                input_rows: current.len(),
                rejected: outcome.rejected,
                statuses: outcome.statuses,
            });
            current = outcome.accepted;
        }

        Ok(self.result.insert(current).rows())
    }

    /// Rows of the last successful run, if any.
    pub fn alignment_result(&self) -> Option<&[ConsensusRow]> {
        self.result.as_ref().map(ConsensusList::rows)
    }

    /// Final list of the last successful run, if any.
    pub fn result_list(&self) -> Option<&ConsensusList> {
        self.result.as_ref()
    }

    /// Per-filter reports of the last run, in filter order.
    pub fn filter_reports(&self) -> &[FilterReport] {
        &self.reports
    }
}
