use log::{debug, info};

use crate::dendrogram::{DendrogramBuilder, MergeDriver};
use crate::error::Result;
use crate::grouping::GroupingTable;
use crate::library::SimilarityLibrary;
use crate::matching::{FeatureMatcher, MatchParams};
use crate::model::{ConsensusList, Sample};

/// The strategy-specific half of an alignment: turn samples into one consensus list.
pub trait MatchStrategy: Send + Sync {
    /// Configuration tag of the strategy.
    fn name(&self) -> &'static str;

    /// Align all samples into a single consensus list, before filtering.
    fn match_features(&self, samples: &[Sample]) -> Result<ConsensusList>;
}

fn grouping(params: &MatchParams, rt_window: f64, samples: &[Sample]) -> Option<GroupingTable> {
    params
        .use_group_weight
        .then(|| GroupingTable::greedy(samples, rt_window))
}

fn matcher<'a>(params: &MatchParams, groups: Option<&'a GroupingTable>) -> FeatureMatcher<'a> {
    let matcher = FeatureMatcher::new(*params);
    match groups {
        Some(groups) => matcher.with_groups(groups),
        None => matcher,
    }
}

/// Merge samples following a complete-linkage dendrogram of sample similarity.
#[derive(Debug, Clone)]
pub struct HierarchicalAlignment {
    params: MatchParams,
    grouping_rt_tolerance: f64,
    library: Option<SimilarityLibrary>,
}

impl HierarchicalAlignment {
    /// Strategy that scores sample pairs itself before clustering.
    pub fn new(params: MatchParams, grouping_rt_tolerance: f64) -> Self {
        Self {
            params,
            grouping_rt_tolerance,
            library: None,
        }
    }

    /// Cluster with a precomputed similarity library.
    pub fn with_library(mut self, library: SimilarityLibrary) -> Self {
        self.library = Some(library);
        self
    }
}

impl MatchStrategy for HierarchicalAlignment {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn match_features(&self, samples: &[Sample]) -> Result<ConsensusList> {
        let computed;
        let library = match &self.library {
            Some(library) => library,
            None => {
                computed = SimilarityLibrary::from_pairwise_matching(samples, &self.params)?;
                &computed
            }
        };

        let tree = DendrogramBuilder::new(library).build(samples)?;
        info!(
            "Clustered {} samples, {} merges",
            samples.len(),
            tree.merges().count()
        );
        debug!("Merge tree:\n{}", tree.render());

        let groups = grouping(&self.params, self.grouping_rt_tolerance, samples);
        MergeDriver::new(matcher(&self.params, groups.as_ref()))
            .with_parallel(self.params.parallel)
            .run(&tree, samples)
    }
}

/// Fold samples into a growing master list in input order.
#[derive(Debug, Clone)]
pub struct SequentialAlignment {
    params: MatchParams,
    grouping_rt_tolerance: f64,
}

impl SequentialAlignment {
    /// Sequential strategy with the given matcher parameters.
    pub fn new(params: MatchParams, grouping_rt_tolerance: f64) -> Self {
        Self {
            params,
            grouping_rt_tolerance,
        }
    }
}

impl MatchStrategy for SequentialAlignment {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn match_features(&self, samples: &[Sample]) -> Result<ConsensusList> {
        let groups = grouping(&self.params, self.grouping_rt_tolerance, samples);
        let matcher = matcher(&self.params, groups.as_ref());

        let mut lists = samples.iter().map(ConsensusList::from_sample);
        let Some(mut master) = lists.next() else {
            return Ok(ConsensusList::new("empty"));
        };
        for candidate in lists {
            master = matcher.merge(&master, &candidate)?;
        }
        info!("Sequential merge of {} samples: {} rows", samples.len(), master.len());
        Ok(master)
    }
}
