//! Greedy retention-time grouping of features within each sample.
//!
//! Features eluting together in one run (isotopes, adducts, in-source
//! fragments of the same compound) tend to stay together across runs. The
//! matcher can reward candidate pairs whose neighbourhoods agree on this.

use log::debug;

use crate::model::{FeatureKey, Sample};

/// Group id of every feature, indexed by sample position then feature index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingTable {
    groups: Vec<Vec<usize>>,
}

impl GroupingTable {
    /// Group every sample with [`group_sample`].
    pub fn greedy(samples: &[Sample], rt_window: f64) -> Self {
        let groups: Vec<Vec<usize>> = samples
            .iter()
            .map(|sample| group_sample(sample, rt_window))
            .collect();
        debug!(
            "Grouped {} samples into {} feature groups (rt window {})",
            samples.len(),
            groups
                .iter()
                .map(|ids| ids.iter().max().map_or(0, |max| max + 1))
                .sum::<usize>(),
            rt_window
        );
        Self { groups }
    }

    /// Group of the feature at `key`, if the table covers it.
    pub fn group_of(&self, key: FeatureKey) -> Option<usize> {
        self.groups.get(key.sample.0)?.get(key.index).copied()
    }

    /// True if both features are known, come from the same sample and share a group.
    pub fn same_group(&self, a: FeatureKey, b: FeatureKey) -> bool {
        if a.sample != b.sample {
            return false;
        }
        match (self.group_of(a), self.group_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Number of samples covered.
    pub fn sample_count(&self) -> usize {
        self.groups.len()
    }
}

/// Scan features in input order; each still-ungrouped feature opens a new
/// group that absorbs every ungrouped feature within `rt_window` of it.
pub fn group_sample(sample: &Sample, rt_window: f64) -> Vec<usize> {
    let features = sample.features();
    let mut assigned: Vec<Option<usize>> = vec![None; features.len()];
    let mut next_group = 0;

    for seed in 0..features.len() {
        if assigned[seed].is_some() {
            continue;
        }
        let rt = features[seed].rt;
        assigned[seed] = Some(next_group);
        for (other, slot) in assigned.iter_mut().enumerate().skip(seed + 1) {
            if slot.is_none() && (features[other].rt - rt).abs() <= rt_window {
                *slot = Some(next_group);
            }
        }
        next_group += 1;
    }

    assigned.into_iter().map(|g| g.unwrap_or_default()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SampleBuilder, SampleId};

    fn sample() -> Sample {
        SampleBuilder::new(0, "s")
            .add_feature(1, 100.0, 10.0, 1.0)
            .add_feature(2, 101.0, 30.0, 1.0)
            .add_feature(3, 102.0, 11.5, 1.0)
            .add_feature(4, 103.0, 31.0, 1.0)
            .add_feature(5, 104.0, 13.0, 1.0)
            .build()
    }

    #[test]
    fn test_greedy_grouping_is_anchored_on_first_feature() {
        // 13.0 is within 2.0 of 11.5 but not of the group seed at 10.0
        assert_eq!(group_sample(&sample(), 2.0), vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_zero_window_only_groups_identical_rt() {
        assert_eq!(group_sample(&sample(), 0.0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_sample() {
        let empty = SampleBuilder::new(0, "empty").build();
        assert!(group_sample(&empty, 2.0).is_empty());
    }

    #[test]
    fn test_table_lookup() {
        let other = SampleBuilder::new(1, "t")
            .add_feature(1, 100.0, 10.0, 1.0)
            .build();
        let table = GroupingTable::greedy(&[sample(), other], 2.0);
        let key = |sample, index| FeatureKey {
            sample: SampleId(sample),
            index,
        };

        assert_eq!(table.sample_count(), 2);
        assert_eq!(table.group_of(key(0, 3)), Some(1));
        assert_eq!(table.group_of(key(0, 9)), None);
        assert!(table.same_group(key(0, 0), key(0, 2)));
        assert!(!table.same_group(key(0, 0), key(0, 1)));
        // group ids are per sample
        assert!(!table.same_group(key(0, 0), key(1, 0)));
    }
}
