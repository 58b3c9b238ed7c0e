use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Seed used by the random control filters when none is configured.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Filter families understood by [`super::build_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Keep rows with at least `threshold` features.
    Size,
    /// Remove the lowest-scoring fraction of rows by graph-connectivity score.
    RowGraph,
    /// Remove the lowest-scoring fraction of rows by intensity consistency.
    RowIntensity,
    /// Remove a random fraction of rows.
    RowRandom,
    /// Remove rows holding one of the lowest-scoring features by graph score.
    FeatureGraph,
    /// Remove rows holding one of the lowest-scoring features by intensity consistency.
    FeatureIntensity,
    /// Remove rows holding one of a random fraction of features.
    FeatureRandom,
}

impl FilterKind {
    /// Configuration tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Size => "size",
            FilterKind::RowGraph => "row_graph",
            FilterKind::RowIntensity => "row_intensity",
            FilterKind::RowRandom => "row_random",
            FilterKind::FeatureGraph => "feature_graph",
            FilterKind::FeatureIntensity => "feature_intensity",
            FilterKind::FeatureRandom => "feature_random",
        }
    }

    /// Whether the threshold is a fraction of ranked items.
    pub fn is_fractional(&self) -> bool {
        !matches!(self, FilterKind::Size)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(FilterKind::Size),
            "row_graph" => Ok(FilterKind::RowGraph),
            "row_intensity" => Ok(FilterKind::RowIntensity),
            "row_random" => Ok(FilterKind::RowRandom),
            "feature_graph" => Ok(FilterKind::FeatureGraph),
            "feature_intensity" => Ok(FilterKind::FeatureIntensity),
            "feature_random" => Ok(FilterKind::FeatureRandom),
            other => Err(ConfigError::UnknownFilterKind(other.to_string())),
        }
    }
}

/// One entry of the ordered filter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Filter family.
    pub kind: FilterKind,
    /// Minimum row size for `size`, fraction in [0, 1] for the removal filters.
    pub threshold: f64,
    /// Seed for the random control filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl FilterSpec {
    /// Spec without a seed.
    pub fn new(kind: FilterKind, threshold: f64) -> Self {
        Self {
            kind,
            threshold,
            seed: None,
        }
    }

    /// Parse `kind:threshold`, e.g. `size:2` or `row_graph:0.1`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let (kind, threshold) = text
            .split_once(':')
            .ok_or_else(|| ConfigError::UnknownFilterKind(text.to_string()))?;
        let kind: FilterKind = kind.trim().parse()?;
        let threshold = threshold
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidThreshold {
                kind,
                value: f64::NAN,
            })?;
        let spec = Self::new(kind, threshold);
        spec.validate()?;
        Ok(spec)
    }

    /// Check the threshold against the filter family.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = self.threshold;
        let valid = if self.kind.is_fractional() {
            (0.0..=1.0).contains(&value)
        } else {
            value >= 1.0 && value.fract() == 0.0
        };
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidThreshold {
                kind: self.kind,
                value,
            })
        }
    }
}
