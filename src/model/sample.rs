use std::path::Path;
use std::sync::Arc;

use super::feature::{Feature, FeatureKey, SampleId};

/// All features detected in one LC-MS run
///
/// Membership is fixed once the sample is built; alignment only ever reads it.
#[derive(Debug, Clone)]
pub struct Sample {
    id: SampleId,
    label: String,
    features: Vec<Arc<Feature>>,
}

impl Sample {
    /// Sample id.
    pub fn id(&self) -> SampleId {
        self.id
    }

    /// Display label, also used to name merge-tree leaves.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Features in input order.
    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    /// Feature at `index`.
    pub fn feature(&self, index: usize) -> Option<&Arc<Feature>> {
        self.features.get(index)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the run produced no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// File name without directory and extension, e.g. `runs/std_1.csv` -> `std_1`.
    pub fn label_from_path(path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        path.file_stem()
            .or_else(|| path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Builder for constructing Sample objects fluently.
pub struct SampleBuilder {
    sample: Sample,
}

impl SampleBuilder {
    /// Create a builder for the sample at input position `id`.
    pub fn new(id: usize, label: impl Into<String>) -> Self {
        Self {
            sample: Sample {
                id: SampleId(id),
                label: label.into(),
                features: Vec::new(),
            },
        }
    }

    /// Append a feature; its key is derived from the sample and the insertion position.
    pub fn add_feature(mut self, peak_id: u32, mass: f64, rt: f64, intensity: f64) -> Self {
        let key = FeatureKey {
            sample: self.sample.id,
            index: self.sample.features.len(),
        };
        self.sample.features.push(Arc::new(Feature {
            key,
            peak_id,
            mass,
            rt,
            intensity,
        }));
        self
    }

    /// Append `(peak_id, mass, rt, intensity)` tuples.
    pub fn features<I>(self, features: I) -> Self
    where
        I: IntoIterator<Item = (u32, f64, f64, f64)>,
    {
        features
            .into_iter()
            .fold(self, |builder, (peak_id, mass, rt, intensity)| {
                builder.add_feature(peak_id, mass, rt, intensity)
            })
    }

    /// Build the sample.
    pub fn build(self) -> Sample {
        self.sample
    }
}
