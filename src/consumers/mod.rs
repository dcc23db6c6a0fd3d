//! Running aggregates fed by the calculator's distance stream.

pub mod contextual;
pub mod distance_matrix;
pub mod matrix_profile;

use crate::error::Result;

/// Receives every computed distance from the generators it subscribes to.
///
/// The calculator delivers each unordered pair of subsequences outside the
/// exclusion zone exactly once per subscribed generator, as `(i, j)` with
/// `i < j`, in increasing `i` within a diagonal or column. The order of
/// diagonals is unspecified, so aggregates must only depend on the set of
/// delivered pairs (pointwise minima do).
pub trait DistanceConsumer: Send {
    /// Reset state for a calculation over `n_subsequences` subsequences.
    ///
    /// Called once when the consumer is registered.
    fn initialise(&mut self, n_subsequences: usize) -> Result<()>;

    /// Accept `d(i, j) = value`.
    fn accept(&mut self, i: usize, j: usize, value: f64);
}

/// Tie-break shared by the consumers: a smaller distance wins, and on an
/// exact tie the smaller neighbour index wins, whatever the delivery order.
#[inline]
pub(crate) fn improves(
    candidate: f64,
    candidate_idx: usize,
    current: f64,
    current_idx: Option<usize>,
) -> bool {
    candidate < current
        || (candidate == current
            && candidate.is_finite()
            && current_idx.map_or(true, |idx| candidate_idx < idx))
}

pub use contextual::{CmpCell, ContextualMatrixProfile};
pub use distance_matrix::DistanceMatrix;
pub use matrix_profile::MatrixProfile;
