//! # Feature Matching
//!
//! Pairwise merge of two consensus lists. Every (master row, candidate row)
//! pair inside both tolerance windows is scored; pairs outside either window
//! are never eligible, whatever their score. Eligible pairs are committed
//! greedily in a fixed total order:
//!
//! 1. score, descending
//! 2. master row index, ascending
//! 3. candidate row index, ascending
//!
//! Each row takes part in at most one match. The merged list holds the master
//! rows in order (extended in place when matched) followed by the unmatched
//! candidate rows in order, so
//! `|merged| = |master| + |candidate| - |matches|` always holds.
//!
//! ## Scoring
//!
//! Closeness is `1 - (|dm| / mass window + |drt| / rt window) / 2`. With group
//! weighting enabled, a group-consistency term computed from per-sample
//! retention-time groups is blended in: `(1 - alpha) * closeness + alpha *
//! consistency`.

mod score;


use log::{debug, warn};

pub use score::{closeness, Candidate};

use crate::error::Result;
use crate::grouping::GroupingTable;
use crate::model::{ConsensusList, ConsensusRow, Tolerance};

/// Matcher parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchParams {
    /// Mass and RT windows.
    pub tolerance: Tolerance,
    /// Blend the group-consistency term into scores.
    pub use_group_weight: bool,
    /// Weight of the group-consistency term, in [0, 1].
    pub alpha: f64,
    /// Score candidate pairs on the rayon pool.
    pub parallel: bool,
}

impl MatchParams {
    /// Closeness-only matching with the given tolerance.
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            use_group_weight: false,
            alpha: crate::config::DEFAULT_ALPHA,
            parallel: false,
        }
    }

    /// Enable group weighting with blend weight `alpha`.
    pub fn with_group_weight(mut self, alpha: f64) -> Self {
        self.use_group_weight = true;
        self.alpha = alpha;
        self
    }

    /// Toggle parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of one matcher call.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Merged list.
    pub list: ConsensusList,
    /// Committed pairs, in commit order.
    pub matches: Vec<Candidate>,
}

/// Greedy one-to-one matcher over consensus lists.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMatcher<'a> {
    params: MatchParams,
    groups: Option<&'a GroupingTable>,
}

impl<'a> FeatureMatcher<'a> {
    /// Matcher without feature groups.
    pub fn new(params: MatchParams) -> Self {
        Self {
            params,
            groups: None,
        }
    }

    /// Use `groups` for the group-consistency term.
    pub fn with_groups(mut self, groups: &'a GroupingTable) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Parameters in use.
    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Score every eligible pair between `master` and `candidate`.
    pub fn score(&self, master: &ConsensusList, candidate: &ConsensusList) -> Vec<Candidate> {
        let params = &self.params;
        let mut pairs =
            score::eligible_pairs(master, candidate, &params.tolerance, params.parallel);

        if params.use_group_weight && params.alpha > 0.0 && !pairs.is_empty() {
            match self.groups {
                Some(groups) => {
                    let master_affinity = score::row_affinity(master, groups);
                    let candidate_affinity = score::row_affinity(candidate, groups);
                    score::blend_group_term(
                        &mut pairs,
                        &master_affinity,
                        &candidate_affinity,
                        params.alpha,
                        params.parallel,
                    );
                }
                None => warn!(
                    "No feature groups for group weighting; '{}' + '{}' scored by closeness",
                    master.label(),
                    candidate.label()
                ),
            }
        }
        pairs
    }

    /// Commit scored pairs greedily; each row is used at most once.
    pub fn assign(
        &self,
        mut pairs: Vec<Candidate>,
        masters: usize,
        candidates: usize,
    ) -> Vec<Candidate> {
        pairs.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.master.cmp(&b.master))
                .then_with(|| a.candidate.cmp(&b.candidate))
        });

        let mut master_used = vec![false; masters];
        let mut candidate_used = vec![false; candidates];
        let mut committed = Vec::new();
        for pair in pairs {
            if master_used[pair.master] || candidate_used[pair.candidate] {
                continue;
            }
            master_used[pair.master] = true;
            candidate_used[pair.candidate] = true;
            committed.push(pair);
        }
        committed
    }

    /// Merge `candidate` into `master`.
    pub fn merge(&self, master: &ConsensusList, candidate: &ConsensusList) -> Result<ConsensusList> {
        Ok(self.merge_with_matches(master, candidate)?.list)
    }

    /// Merge `candidate` into `master`, also returning the committed pairs.
    pub fn merge_with_matches(
        &self,
        master: &ConsensusList,
        candidate: &ConsensusList,
    ) -> Result<MergeOutcome> {
        let pairs = self.score(master, candidate);
        let eligible = pairs.len();
        let matches = self.assign(pairs, master.len(), candidate.len());

        let mut partner: Vec<Option<usize>> = vec![None; master.len()];
        let mut taken = vec![false; candidate.len()];
        for pair in &matches {
            partner[pair.master] = Some(pair.candidate);
            taken[pair.candidate] = true;
        }

        let mut rows: Vec<ConsensusRow> =
            Vec::with_capacity(master.len() + candidate.len() - matches.len());
        for (position, (row, partner)) in master.iter().zip(&partner).enumerate() {
            match partner {
                Some(j) => rows.push(ConsensusRow::merge(row, &candidate.rows()[*j], position)?),
                None => rows.push(row.clone()),
            }
        }
        rows.extend(
            candidate
                .iter()
                .zip(&taken)
                .filter(|(_, taken)| !**taken)
                .map(|(row, _)| row.clone()),
        );

        debug!(
            "Merged '{}' ({} rows) with '{}' ({} rows): {} eligible pairs, {} matched, {} rows out",
            master.label(),
            master.len(),
            candidate.label(),
            candidate.len(),
            eligible,
            matches.len(),
            rows.len()
        );

        let label = format!("{}+{}", master.label(), candidate.label());
        Ok(MergeOutcome {
            list: ConsensusList::from_rows(label, rows),
            matches,
        })
    }
}
