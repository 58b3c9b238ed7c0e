//! TOML configuration for an alignment run.
//!
//! Every parameter that changes which feature pairs may be matched is
//! validated up front; invalid values are rejected, never clamped.
//!
//! ```toml
//! # multialign.toml
//! method = "hierarchical"
//! mass_tolerance = 0.01
//! rt_tolerance = 30.0
//! use_group_weight = true
//! alpha = 0.3
//!
//! [[filters]]
//! kind = "row_graph"
//! threshold = 0.1
//!
//! [[filters]]
//! kind = "size"
//! threshold = 2
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::filter::{FilterKind, FilterSpec};
use crate::matching::MatchParams;
use crate::model::{MassTolerance, Tolerance};

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A tolerance was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NonPositiveTolerance {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Alpha must lie in [0, 1].
    #[error("alpha must lie in [0, 1], got {0}")]
    AlphaOutOfRange(f64),

    /// A filter specification named an unknown kind.
    #[error("Unknown filter kind: {0}")]
    UnknownFilterKind(String),

    /// The alignment method tag is not recognised.
    #[error("Unknown alignment method: {0}")]
    UnknownMethod(String),

    /// A filter threshold is out of range for its kind.
    #[error("Invalid threshold {value} for filter '{kind}'")]
    InvalidThreshold {
        /// Filter kind.
        kind: FilterKind,
        /// Offending threshold.
        value: f64,
    },

    /// Config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Which concrete alignment strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Merge samples following a complete-linkage dendrogram of sample similarity.
    #[default]
    Hierarchical,
    /// Fold samples into a growing master list in input order.
    Sequential,
}

impl MethodKind {
    /// Configuration tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Hierarchical => "hierarchical",
            MethodKind::Sequential => "sequential",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hierarchical" => Ok(MethodKind::Hierarchical),
            "sequential" => Ok(MethodKind::Sequential),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// Default blend weight between closeness and group consistency.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Default RT window for greedy feature grouping.
pub const DEFAULT_GROUPING_RT_TOLERANCE: f64 = 2.0;

/// Parameters of an alignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Alignment strategy.
    pub method: MethodKind,

    /// Mass tolerance (absolute, or ppm when `use_ppm` is set).
    pub mass_tolerance: f64,

    /// Retention-time tolerance.
    pub rt_tolerance: f64,

    /// Interpret `mass_tolerance` in parts per million.
    pub use_ppm: bool,

    /// Blend the group-consistency term into matching scores.
    pub use_group_weight: bool,

    /// RT window for greedy feature grouping (only used with `use_group_weight`).
    pub grouping_rt_tolerance: f64,

    /// 0 ignores grouping, 1 lets grouping dominate.
    pub alpha: f64,

    /// Run independent work on the rayon pool (requires the `parallel` feature).
    pub parallel: bool,

    /// Result filters, applied in order.
    pub filters: Vec<FilterSpec>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            method: MethodKind::default(),
            mass_tolerance: 0.01,
            rt_tolerance: 30.0,
            use_ppm: false,
            use_group_weight: false,
            grouping_rt_tolerance: DEFAULT_GROUPING_RT_TOLERANCE,
            alpha: DEFAULT_ALPHA,
            parallel: true,
            filters: Vec::new(),
        }
    }
}

impl AlignmentConfig {
    /// Configuration with the given tolerances and defaults elsewhere.
    pub fn new(mass_tolerance: f64, rt_tolerance: f64) -> Self {
        Self {
            mass_tolerance,
            rt_tolerance,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject parameters that would silently change matching eligibility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("mass_tolerance", self.mass_tolerance)?;
        positive("rt_tolerance", self.rt_tolerance)?;
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::AlphaOutOfRange(self.alpha));
        }
        if self.use_group_weight {
            positive("grouping_rt_tolerance", self.grouping_rt_tolerance)?;
        }
        for spec in &self.filters {
            spec.validate()?;
        }
        Ok(())
    }

    /// Matching tolerances.
    pub fn tolerance(&self) -> Tolerance {
        let mass = if self.use_ppm {
            MassTolerance::Ppm(self.mass_tolerance)
        } else {
            MassTolerance::Absolute(self.mass_tolerance)
        };
        Tolerance {
            mass,
            rt: self.rt_tolerance,
        }
    }

    /// Matcher parameters derived from this configuration.
    pub fn match_params(&self) -> MatchParams {
        MatchParams {
            tolerance: self.tolerance(),
            use_group_weight: self.use_group_weight,
            alpha: self.alpha,
            parallel: self.parallel,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails this comparison as well
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveTolerance { name, value })
    }
}
