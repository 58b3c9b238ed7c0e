use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a sample; equals the sample's position in the aligner input.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SampleId(pub usize);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arena address of a feature: its sample and its position inside that sample.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FeatureKey {
    /// Sample the feature was detected in.
    pub sample: SampleId,
    /// Position within the sample's feature list.
    pub index: usize,
}

/// A detected chromatographic peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Arena address, assigned by [`super::SampleBuilder`].
    pub key: FeatureKey,
    /// Peak id as reported by the feature detector.
    pub peak_id: u32,
    /// Mass (m/z).
    pub mass: f64,
    /// Retention time.
    pub rt: f64,
    /// Peak intensity.
    pub intensity: f64,
}

impl Feature {
    /// Sample of origin.
    #[inline]
    pub fn sample(&self) -> SampleId {
        self.key.sample
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}@{} (m/z {:.4}, rt {:.2}, int {:.1})",
            self.peak_id, self.key.sample, self.mass, self.rt, self.intensity
        )
    }
}
