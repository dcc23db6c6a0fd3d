use serde::{Deserialize, Serialize};

use crate::consumers::{improves, DistanceConsumer};
use crate::error::Result;

/// Matrix profile consumer.
///
/// For every query subsequence `i`, keeps the smallest distance seen so far
/// and the index of the subsequence that produced it. Values are provisional
/// until the calculator reports completion; `profile[i]` only ever decreases.
///
/// The calculator delivers each unordered pair once as `(i, j)` with `i < j`:
/// - **bidirectional** (left-right mode): the pair updates both `i` (right
///   neighbour `j`) and `j` (left neighbour `i`), producing the full profile
///   from upper-triangle-only computation, plus separate left and right profiles.
/// - **one-directional**: only `i` is updated, so the profile holds each
///   subsequence's best match *later* in the series.
///
/// Untouched entries hold `+inf` with no index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixProfile {
    bidirectional: bool,
    /// Nearest-neighbor distances for each subsequence.
    profile: Vec<f64>,
    /// Index of the nearest neighbor for each subsequence.
    profile_index: Vec<Option<usize>>,
    /// Left nearest-neighbor distances (neighbors with smaller index).
    left_profile: Vec<f64>,
    left_profile_index: Vec<Option<usize>>,
    /// Right nearest-neighbor distances (neighbors with larger index).
    right_profile: Vec<f64>,
    right_profile_index: Vec<Option<usize>>,
}

impl MatrixProfile {
    pub fn new(bidirectional: bool) -> Self {
        Self {
            bidirectional,
            ..Self::default()
        }
    }

    /// Left-right matrix profile (full profile from upper-triangle distances).
    pub fn bidirectional() -> Self {
        Self::new(true)
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn len(&self) -> usize {
        self.profile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }

    /// Snapshot of the current profile.
    pub fn matrix_profile(&self) -> Vec<f64> {
        self.profile.clone()
    }

    /// Snapshot of the current best-match indices.
    pub fn profile_index(&self) -> Vec<Option<usize>> {
        self.profile_index.clone()
    }

    pub fn left_matrix_profile(&self) -> Vec<f64> {
        self.left_profile.clone()
    }

    pub fn left_profile_index(&self) -> Vec<Option<usize>> {
        self.left_profile_index.clone()
    }

    pub fn right_matrix_profile(&self) -> Vec<f64> {
        self.right_profile.clone()
    }

    pub fn right_profile_index(&self) -> Vec<Option<usize>> {
        self.right_profile_index.clone()
    }

    /// Update the profile at `idx` if `distance` beats the current value.
    /// `neighbor_idx` is the index of the matching subsequence.
    #[inline]
    fn update(&mut self, idx: usize, distance: f64, neighbor_idx: usize) {
        if improves(distance, neighbor_idx, self.profile[idx], self.profile_index[idx]) {
            self.profile[idx] = distance;
            self.profile_index[idx] = Some(neighbor_idx);
        }
        if neighbor_idx < idx
            && improves(
                distance,
                neighbor_idx,
                self.left_profile[idx],
                self.left_profile_index[idx],
            )
        {
            self.left_profile[idx] = distance;
            self.left_profile_index[idx] = Some(neighbor_idx);
        }
        if neighbor_idx > idx
            && improves(
                distance,
                neighbor_idx,
                self.right_profile[idx],
                self.right_profile_index[idx],
            )
        {
            self.right_profile[idx] = distance;
            self.right_profile_index[idx] = Some(neighbor_idx);
        }
    }
}

impl DistanceConsumer for MatrixProfile {
    fn initialise(&mut self, n_subsequences: usize) -> Result<()> {
        self.profile = vec![f64::INFINITY; n_subsequences];
        self.profile_index = vec![None; n_subsequences];
        self.left_profile = vec![f64::INFINITY; n_subsequences];
        self.left_profile_index = vec![None; n_subsequences];
        self.right_profile = vec![f64::INFINITY; n_subsequences];
        self.right_profile_index = vec![None; n_subsequences];
        Ok(())
    }

    fn accept(&mut self, i: usize, j: usize, value: f64) {
        self.update(i, value, j);
        if self.bidirectional {
            self.update(j, value, i);
        }
    }
}
