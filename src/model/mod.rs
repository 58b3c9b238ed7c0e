//! # Alignment Data Model
//!
//! Immutable sample data plus the consensus structures the matcher builds:
//!
//! - [`Feature`]: one detected (mass, retention time, intensity) peak
//! - [`Sample`]: all features of one LC-MS run, built with [`SampleBuilder`]
//! - [`ConsensusRow`]: features from distinct samples believed to be the same entity
//! - [`ConsensusList`]: the ordered alignment state of a set of samples
//!
//! Features are shared between rows through [`std::sync::Arc`]; a row never
//! copies feature data.

mod feature;
mod pair;
mod row;
mod sample;
mod tolerance;

#[cfg(test)]
mod tests;

pub use feature::{Feature, FeatureKey, SampleId};
pub use pair::FeaturePair;
pub use row::{ConsensusList, ConsensusRow, RowStats};
pub use sample::{Sample, SampleBuilder};
pub use tolerance::{MassTolerance, Tolerance};
