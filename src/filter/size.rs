use log::info;

use super::{FilterOutcome, ResultFilter, StatusTable};
use crate::model::ConsensusList;

/// Accepts rows holding at least `min_features` features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFilter {
    min_features: usize,
}

impl SizeFilter {
    /// Filter requiring `min_features` per row.
    pub fn new(min_features: usize) -> Self {
        Self { min_features }
    }

    /// Required row size.
    pub fn min_features(&self) -> usize {
        self.min_features
    }
}

impl ResultFilter for SizeFilter {
    fn label(&self) -> String {
        format!("size filter (>= {} features)", self.min_features)
    }

    fn process(&self, list: &ConsensusList) -> FilterOutcome {
        let (accepted, rejected): (Vec<_>, Vec<_>) = list
            .iter()
            .cloned()
            .partition(|row| row.len() >= self.min_features);

        info!(
            "{}: accepted {} rows, rejected {}",
            self.label(),
            accepted.len(),
            rejected.len()
        );

        FilterOutcome {
            accepted: ConsensusList::from_rows(list.label(), accepted),
            rejected: ConsensusList::from_rows(list.label(), rejected),
            statuses: StatusTable::new(),
        }
    }
}
