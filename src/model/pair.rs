use super::feature::Feature;
use super::tolerance::Tolerance;

/// Two features placed in the same consensus row
///
/// Pair-level scores feed the score-based removal filters.
#[derive(Debug, Clone, Copy)]
pub struct FeaturePair<'a> {
    /// First feature.
    pub first: &'a Feature,
    /// Second feature.
    pub second: &'a Feature,
}

impl<'a> FeaturePair<'a> {
    /// Pair two features.
    pub fn new(first: &'a Feature, second: &'a Feature) -> Self {
        Self { first, second }
    }

    /// Tolerance-scaled distance between the two peaks.
    pub fn distance(&self, tolerance: &Tolerance) -> f64 {
        tolerance.scaled_distance(
            self.first.mass,
            self.first.mass - self.second.mass,
            self.first.rt - self.second.rt,
        )
    }

    /// Graph-connectivity score in (0, 1]; 1 for identical positions.
    pub fn graph_score(&self, tolerance: &Tolerance) -> f64 {
        1.0 / (1.0 + self.distance(tolerance))
    }

    /// `|I1 - I2| / max(I1, I2)`; 0 when both intensities are zero.
    pub fn relative_intensity_error(&self) -> f64 {
        let max = self.first.intensity.max(self.second.intensity);
        if max <= 0.0 {
            return 0.0;
        }
        (self.first.intensity - self.second.intensity).abs() / max
    }

    /// Intensity-consistency score, `1 - relative error`.
    pub fn intensity_score(&self) -> f64 {
        1.0 - self.relative_intensity_error()
    }
}
