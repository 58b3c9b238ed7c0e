//! # Alignment Strategies and Pipeline
//!
//! An alignment run is "match, then filter". The matching half is a
//! [`MatchStrategy`]; the concrete strategies are collected in the
//! [`AlignmentMethod`] variant, selected from configuration by
//! [`AlignmentMethod::from_config`]. [`AlignmentPipeline`] runs the strategy
//! and pipes its result through the registered filters in order.
//!
//! ```rust,no_run
//! use multialign::prelude::*;
//!
//! let samples = vec![
//!     SampleBuilder::new(0, "a").add_feature(1, 100.0, 5.0, 1e4).build(),
//!     SampleBuilder::new(1, "b").add_feature(1, 100.01, 5.1, 2e4).build(),
//! ];
//! let config = AlignmentConfig::new(0.02, 0.2);
//! let mut pipeline = AlignmentPipeline::from_config(&config, samples, None)?;
//! pipeline.add_filter(SizeFilter::new(2));
//! let rows = pipeline.align()?;
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), multialign::AlignmentError>(())
//! ```

mod pipeline;
mod strategy;


pub use pipeline::{AlignmentPipeline, FilterReport};
pub use strategy::{HierarchicalAlignment, MatchStrategy, SequentialAlignment};

use crate::config::{AlignmentConfig, MethodKind};
use crate::error::Result;
use crate::library::SimilarityLibrary;
use crate::model::{ConsensusList, Sample};

/// The available alignment strategies.
#[derive(Debug, Clone)]
pub enum AlignmentMethod {
    /// Dendrogram-driven merging.
    Hierarchical(HierarchicalAlignment),
    /// Input-order merging.
    Sequential(SequentialAlignment),
}

impl AlignmentMethod {
    /// Strategy named by `config.method`.
    ///
    /// `library` is only used by the hierarchical strategy; without it the
    /// strategy scores sample pairs itself.
    pub fn from_config(
        config: &AlignmentConfig,
        library: Option<SimilarityLibrary>,
    ) -> Result<Self> {
        config.validate()?;
        let params = config.match_params();
        Ok(match config.method {
            MethodKind::Hierarchical => {
                let strategy = HierarchicalAlignment::new(params, config.grouping_rt_tolerance);
                AlignmentMethod::Hierarchical(match library {
                    Some(library) => strategy.with_library(library),
                    None => strategy,
                })
            }
            MethodKind::Sequential => AlignmentMethod::Sequential(SequentialAlignment::new(
                params,
                config.grouping_rt_tolerance,
            )),
        })
    }

    /// Which strategy this is.
    pub fn kind(&self) -> MethodKind {
        match self {
            AlignmentMethod::Hierarchical(_) => MethodKind::Hierarchical,
            AlignmentMethod::Sequential(_) => MethodKind::Sequential,
        }
    }
}

impl MatchStrategy for AlignmentMethod {
    fn name(&self) -> &'static str {
        match self {
            AlignmentMethod::Hierarchical(s) => s.name(),
            AlignmentMethod::Sequential(s) => s.name(),
        }
    }

    fn match_features(&self, samples: &[Sample]) -> Result<ConsensusList> {
        match self {
            AlignmentMethod::Hierarchical(s) => s.match_features(samples),
            AlignmentMethod::Sequential(s) => s.match_features(samples),
        }
    }
}
