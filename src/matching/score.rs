use std::collections::HashMap;

use crate::grouping::GroupingTable;
use crate::model::{ConsensusList, ConsensusRow, SampleId, Tolerance};
use crate::parallel::par_map;

/// An eligible (master row, candidate row) pair and its scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Master row index.
    pub master: usize,
    /// Candidate row index.
    pub candidate: usize,
    /// Tolerance-normalised closeness in [0, 1].
    pub closeness: f64,
    /// Final blended score used for ranking.
    pub score: f64,
}

/// `|diff| / window`, 0 for a zero difference in a zero-width window.
#[inline]
fn scaled(diff: f64, window: f64) -> f64 {
    if window > 0.0 {
        diff.abs() / window
    } else {
        0.0
    }
}

/// Closeness of two rows if they may be matched.
///
/// Rows must lie within both windows (mass window evaluated at the master
/// row's mean mass) and must not share a sample.
pub fn closeness(
    master: &ConsensusRow,
    candidate: &ConsensusRow,
    tolerance: &Tolerance,
) -> Option<f64> {
    let mass_diff = master.mean_mass() - candidate.mean_mass();
    let rt_diff = master.mean_rt() - candidate.mean_rt();
    if !tolerance.in_range(master.mean_mass(), mass_diff, rt_diff) {
        return None;
    }
    if master.shared_sample(candidate).is_some() {
        return None;
    }
    let window = tolerance.mass.window(master.mean_mass());
    let error = 0.5 * (scaled(mass_diff, window) + scaled(rt_diff, tolerance.rt));
    Some((1.0 - error).clamp(0.0, 1.0))
}

/// All eligible pairs, grouped by master row in master order.
///
/// Candidates are looked up through a mass-sorted index, so only rows inside
/// the mass window are compared.
pub fn eligible_pairs(
    master: &ConsensusList,
    candidate: &ConsensusList,
    tolerance: &Tolerance,
    parallel: bool,
) -> Vec<Candidate> {
    if !tolerance.is_usable() || master.is_empty() || candidate.is_empty() {
        return Vec::new();
    }

    let rows = candidate.rows();
    let mut by_mass: Vec<usize> = (0..rows.len()).collect();
    by_mass.sort_by(|&a, &b| rows[a].mean_mass().total_cmp(&rows[b].mean_mass()));
    let masses: Vec<f64> = by_mass.iter().map(|&j| rows[j].mean_mass()).collect();

    let per_master = par_map(master.rows(), parallel, |i, row| {
        // slightly wider than the window; `closeness` does the exact check
        let reach = tolerance.mass.window(row.mean_mass()) * (1.0 + 1e-9);
        let lo = masses.partition_point(|&m| m < row.mean_mass() - reach);
        let hi = masses.partition_point(|&m| m <= row.mean_mass() + reach);
        let mut found: Vec<Candidate> = by_mass[lo..hi]
            .iter()
            .filter_map(|&j| {
                closeness(row, &rows[j], tolerance).map(|closeness| Candidate {
                    master: i,
                    candidate: j,
                    closeness,
                    score: closeness,
                })
            })
            .collect();
        found.sort_by_key(|c| c.candidate);
        found
    });

    per_master.into_iter().flatten().collect()
}

/// Sparse row affinity of a list: for each row, `(other row, affinity)` with
/// affinity > 0.
///
/// Affinity between two rows is the fraction of their shared samples in which
/// both rows hold features of the same group.
pub fn row_affinity(list: &ConsensusList, groups: &GroupingTable) -> Vec<Vec<(usize, f64)>> {
    let mut members: HashMap<(SampleId, usize), Vec<usize>> = HashMap::new();
    for (i, row) in list.iter().enumerate() {
        for feature in row.features() {
            if let Some(group) = groups.group_of(feature.key) {
                members.entry((feature.sample(), group)).or_default().push(i);
            }
        }
    }

    list.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut agreeing: HashMap<usize, usize> = HashMap::new();
            for feature in row.features() {
                let Some(group) = groups.group_of(feature.key) else {
                    continue;
                };
                if let Some(rows) = members.get(&(feature.sample(), group)) {
                    for &k in rows.iter().filter(|&&k| k != i) {
                        *agreeing.entry(k).or_default() += 1;
                    }
                }
            }
            let mut affinity: Vec<(usize, f64)> = agreeing
                .into_iter()
                .map(|(k, agree)| {
                    let other = &list.rows()[k];
                    let shared = row.samples().filter(|&s| other.contains_sample(s)).count();
                    (k, agree as f64 / shared.max(1) as f64)
                })
                .collect();
            affinity.sort_by_key(|&(k, _)| k);
            affinity
        })
        .collect()
}

/// Blend the group-consistency term into `pairs`.
///
/// With master affinity `A`, candidate affinity `B` and closeness `W`, the
/// consistency of pair (i, j) is `(A W B)[i][j]`, normalised by its maximum
/// over eligible pairs. Final score is `(1 - alpha) W + alpha D`.
pub fn blend_group_term(
    pairs: &mut [Candidate],
    master_affinity: &[Vec<(usize, f64)>],
    candidate_affinity: &[Vec<(usize, f64)>],
    alpha: f64,
    parallel: bool,
) {
    let weights: HashMap<(usize, usize), f64> = pairs
        .iter()
        .map(|c| ((c.master, c.candidate), c.closeness))
        .collect();

    let consistency = par_map(pairs, parallel, |_, pair| {
        let mut total = 0.0;
        for &(k, a) in &master_affinity[pair.master] {
            for &(l, b) in &candidate_affinity[pair.candidate] {
                if let Some(w) = weights.get(&(k, l)) {
                    total += a * w * b;
                }
            }
        }
        total
    });

    let max = consistency.iter().copied().fold(0.0_f64, f64::max);
    for (pair, d) in pairs.iter_mut().zip(consistency) {
        let d = if max > 0.0 { d / max } else { 0.0 };
        pair.score = (1.0 - alpha) * pair.closeness + alpha * d;
    }
}
