//! Post-processing of profiles and contextual matrix profiles into rankings.
//!
//! These helpers consume finished consumer output; they apply the `+inf`
//! sentinel conventions explicitly so callers don't have to.

use crate::error::{Error, Result};

/// Indices of up to `count` highest values, greedily: take the largest
/// remaining finite value, then exclude every index within `exclusion` of it.
///
/// With a matrix profile as input this yields the top discords without
/// overlapping windows. Non-finite values (including the `+inf` sentinel for
/// never-computed entries) are never selected.
pub fn highest_value_indices(values: &[f64], count: usize, exclusion: usize) -> Vec<usize> {
    let mut available: Vec<bool> = values.iter().map(|v| v.is_finite()).collect();
    let mut picked = Vec::with_capacity(count.min(values.len()));

    while picked.len() < count {
        let best = values
            .iter()
            .enumerate()
            .filter(|&(i, _)| available[i])
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            });
        let Some((idx, _)) = best else {
            break;
        };
        picked.push(idx);

        let start = idx.saturating_sub(exclusion);
        let end = (idx + exclusion + 1).min(values.len());
        available[start..end].iter_mut().for_each(|a| *a = false);
    }

    picked
}

/// Per-context anomaly scores from a contextual matrix profile.
///
/// Contexts are split into groups of comparable contexts (e.g. working
/// days, Saturdays, holidays). For each group the CMP is restricted to the
/// group's rows and columns, untouched (`+inf`) and NaN cells count as 0, and
/// the score of context `a` is its row sum divided by the group size. A
/// context listed in several groups keeps the score of the last one; contexts
/// in no group score 0.
pub fn group_anomaly_scores(cmp: &[Vec<f64>], groups: &[Vec<usize>]) -> Result<Vec<f64>> {
    let n = cmp.len();
    if let Some(row) = cmp.iter().position(|r| r.len() != n) {
        return Err(Error::InvalidParameter(format!(
            "contextual matrix profile must be square: row {row} has {} columns, expected {n}",
            cmp[row].len()
        )));
    }

    let mut scores = vec![0.0; n];
    for (g, group) in groups.iter().enumerate() {
        if let Some(&bad) = group.iter().find(|&&c| c >= n) {
            return Err(Error::InvalidParameter(format!(
                "group {g} references context {bad}, but there are only {n} contexts"
            )));
        }
        if group.is_empty() {
            continue;
        }
        let size = group.len() as f64;
        for &a in group {
            let total: f64 = group
                .iter()
                .map(|&b| cmp[a][b])
                .filter(|d| d.is_finite())
                .sum();
            scores[a] = total / size;
        }
    }
    Ok(scores)
}

/// Indices ordered from highest to lowest score. NaN scores go last; equal
/// scores keep ascending index order.
pub fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let key = |i: usize| {
        let s = scores[i];
        if s.is_nan() {
            f64::NEG_INFINITY
        } else {
            s
        }
    };
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| key(b).total_cmp(&key(a)));
    order
}
