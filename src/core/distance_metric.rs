use std::sync::Arc;

use crate::error::{Error, Result};

/// A distance definition that can be bound to one channel.
///
/// Implementations are lightweight descriptions (e.g. `ZNormEuclidean { noise_std }`);
/// `prepare` precomputes the per-channel statistics and returns the stateful
/// generator the calculator drives. New distance kinds are added by implementing
/// this trait and `DistanceGenerator`; the calculator only sees trait objects.
pub trait DistanceMetric {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Bind to `series` with subsequence length `m`.
    ///
    /// Fails with `InvalidWindow` unless `0 < m <= series.len()`. Samples
    /// are expected to be finite.
    fn prepare(&self, m: usize, series: Arc<[f64]>) -> Result<Box<dyn DistanceGenerator>>;
}

/// Stateful distance source for one channel.
///
/// Produces distances between subsequence `i` (query) and subsequence `j`
/// (target) in bulk, reusing running sums so a diagonal or column of length `L`
/// costs O(L) rather than O(L * m).
pub trait DistanceGenerator: Send {
    /// Number of subsequences `n - m + 1`.
    fn n_subsequences(&self) -> usize;

    /// Distances `d(i, i + offset)` for every `i` in `0..n_subsequences - offset`.
    ///
    /// Returns an empty vector when `offset >= n_subsequences`.
    fn diagonal(&mut self, offset: usize) -> Vec<f64>;

    /// Distances `d(i, column)` for every `i` in `0..n_subsequences`.
    ///
    /// Consecutive calls with increasing `column` reuse the previous column;
    /// any other access pattern recomputes the column from scratch.
    /// Returns an empty vector when `column >= n_subsequences`.
    fn column(&mut self, column: usize) -> Vec<f64>;

    /// Direct O(m) recomputation of `d(i, j)`.
    fn distance(&self, i: usize, j: usize) -> f64;
}

/// Shared window check for `DistanceMetric::prepare` implementations.
pub(crate) fn check_window(m: usize, series: &[f64]) -> Result<()> {
    if m == 0 || m > series.len() {
        return Err(Error::InvalidWindow { m, n: series.len() });
    }
    Ok(())
}
