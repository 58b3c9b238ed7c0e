use serde::{Deserialize, Serialize};

/// Mass window used when comparing two rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MassTolerance {
    /// Absolute window in mass units.
    Absolute(f64),
    /// Relative window in parts per million of the reference mass.
    Ppm(f64),
}

impl MassTolerance {
    /// Width of the window around `reference_mass`.
    #[inline]
    pub fn window(&self, reference_mass: f64) -> f64 {
        match *self {
            MassTolerance::Absolute(tol) => tol,
            MassTolerance::Ppm(ppm) => reference_mass * ppm * 1e-6,
        }
    }

    /// The configured value, regardless of unit.
    pub fn value(&self) -> f64 {
        match *self {
            MassTolerance::Absolute(tol) | MassTolerance::Ppm(tol) => tol,
        }
    }
}

/// Mass and retention-time tolerances of one alignment run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Mass window.
    pub mass: MassTolerance,
    /// Retention-time window.
    pub rt: f64,
}

impl Tolerance {
    /// Absolute mass window and RT window.
    pub fn absolute(mass: f64, rt: f64) -> Self {
        Self {
            mass: MassTolerance::Absolute(mass),
            rt,
        }
    }

    /// True when both windows are strictly positive; otherwise nothing is ever in range.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.mass.value() > 0.0 && self.rt > 0.0
    }

    /// Whether two (mass, rt) points fall inside both windows.
    ///
    /// The mass window is evaluated at `reference_mass`. Differences strictly
    /// greater than a window are out of range.
    #[inline]
    pub fn in_range(&self, reference_mass: f64, mass_diff: f64, rt_diff: f64) -> bool {
        if !self.is_usable() {
            return false;
        }
        mass_diff.abs() <= self.mass.window(reference_mass) && rt_diff.abs() <= self.rt
    }

    /// Tolerance-scaled Euclidean distance between two (mass, rt) points.
    pub fn scaled_distance(&self, reference_mass: f64, mass_diff: f64, rt_diff: f64) -> f64 {
        let dm = mass_diff / self.mass.window(reference_mass);
        let drt = rt_diff / self.rt;
        (dm * dm + drt * drt).sqrt()
    }
}
