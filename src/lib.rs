//! # multialign - Multi-sample LC-MS Feature Alignment
//!
//! `multialign` aligns chromatographic features (mass, retention time,
//! intensity) detected independently in many LC-MS runs into one consensus
//! table, where each row holds at most one feature per sample and stands for
//! one chemical entity.
//!
//! ## Key Features
//!
//! - **Hierarchical merge order**: samples are clustered with complete linkage
//!   over a pairwise similarity library, and merged following the dendrogram so
//!   coherent sample groups consolidate before outliers join.
//!
//! - **Tolerance-windowed matching**: pairs outside the mass or RT window are
//!   never matched. Eligible pairs are committed greedily by score with a fixed
//!   tie-break, so results are reproducible bit for bit.
//!
//! - **Group-consistency weighting**: optional retention-time feature groups
//!   reward matches whose neighbourhoods agree, blended in by `alpha`.
//!
//! - **Composable filters**: size and score-based removal filters form a strict
//!   pipe after matching.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use multialign::prelude::*;
//!
//! let samples = vec![
//!     SampleBuilder::new(0, "run_a")
//!         .add_feature(1, 100.0, 5.0, 1.0e4)
//!         .add_feature(2, 250.1, 9.2, 3.0e4)
//!         .build(),
//!     SampleBuilder::new(1, "run_b")
//!         .add_feature(1, 100.01, 5.1, 1.2e4)
//!         .build(),
//! ];
//!
//! let config = AlignmentConfig::from_toml(r#"
//!     mass_tolerance = 0.02
//!     rt_tolerance = 0.2
//!
//!     [[filters]]
//!     kind = "size"
//!     threshold = 2
//! "#)?;
//!
//! let mut pipeline = AlignmentPipeline::from_config(&config, samples, None)?;
//! for row in pipeline.align()? {
//!     println!("m/z {:.4} rt {:.2}: {} features", row.mean_mass(), row.mean_rt(), row.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`]: features, samples, consensus rows and lists
//! - [`library`]: pairwise sample similarity
//! - [`dendrogram`]: complete-linkage merge tree and the merge driver
//! - [`matching`]: the greedy one-to-one feature matcher
//! - [`grouping`]: per-sample retention-time feature groups
//! - [`alignment`]: strategies and the match-then-filter pipeline
//! - [`filter`]: result filters
//! - [`config`]: TOML configuration

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod alignment;
pub mod config;
pub mod dendrogram;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod library;
pub mod matching;
pub mod model;

mod parallel;

pub use error::{AlignmentError, Result};

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::alignment::{
        AlignmentMethod, AlignmentPipeline, FilterReport, HierarchicalAlignment, MatchStrategy,
        SequentialAlignment,
    };
    pub use crate::config::{AlignmentConfig, ConfigError, MethodKind};
    pub use crate::dendrogram::{DendrogramBuilder, MergeDriver, MergeTree};
    pub use crate::error::{AlignmentError, Result};
    pub use crate::filter::{
        build_filter, FilterKind, FilterOutcome, FilterSpec, Granularity, RemovalFilter,
        ResultFilter, ScoreKind, SizeFilter,
    };
    pub use crate::grouping::GroupingTable;
    pub use crate::library::{PairScore, SimilarityLibrary};
    pub use crate::matching::{FeatureMatcher, MatchParams};
    pub use crate::model::{
        ConsensusList, ConsensusRow, Feature, FeatureKey, MassTolerance, Sample, SampleBuilder,
        SampleId, Tolerance,
    };
}
