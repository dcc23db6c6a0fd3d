use std::sync::Arc;

use crate::algorithms::common::sliding_dot_product;
use crate::core::distance_metric::{check_window, DistanceGenerator, DistanceMetric};
use crate::core::naive;
use crate::core::rolling::rolling_sum_sq;
use crate::error::Result;

/// Non-normalized Euclidean distance.
///
/// Unlike `ZNormEuclidean`, windows are compared as-is, so amplitude and
/// level matter (e.g. electrical load in kW).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    fn prepare(&self, m: usize, series: Arc<[f64]>) -> Result<Box<dyn DistanceGenerator>> {
        check_window(m, &series)?;
        Ok(Box::new(EuclideanGenerator::new(m, series)))
    }
}

/// Euclidean generator for one channel.
///
/// Tracks the squared distance `D(i, j) = sum_k (x[i+k] - x[j+k])^2` along
/// diagonals with the running-sum update
///
/// `D(i, j) = D(i-1, j-1) - (x[i-1] - x[j-1])^2 + (x[i+m-1] - x[j+m-1])^2`
///
/// which only ever adds and removes squared differences. The first row is
/// seeded from `sum_sq[0] + sum_sq[k] - 2 * QT(0, k)` on the mean-removed
/// series, which keeps the magnitudes (and the cancellation) small.
pub struct EuclideanGenerator {
    series: Arc<[f64]>,
    /// Series with its global mean removed; differences are unchanged.
    shifted: Vec<f64>,
    m: usize,
    n_subs: usize,
    sum_sq: Vec<f64>,
    sq_first: Vec<f64>,
    /// Last column index and its squared distances.
    column_cache: Option<(usize, Vec<f64>)>,
}

impl EuclideanGenerator {
    pub(crate) fn new(m: usize, series: Arc<[f64]>) -> Self {
        let n = series.len();
        let n_subs = n - m + 1;
        let level = series.iter().sum::<f64>() / n as f64;
        let shifted: Vec<f64> = series.iter().map(|x| x - level).collect();
        let sum_sq = rolling_sum_sq(&shifted, m);

        let qt_first = sliding_dot_product(&shifted[0..m], &shifted);
        let sq_first = qt_first
            .iter()
            .enumerate()
            .map(|(k, qt)| (sum_sq[0] + sum_sq[k] - 2.0 * qt).max(0.0))
            .collect();

        Self {
            series,
            shifted,
            m,
            n_subs,
            sum_sq,
            sq_first,
            column_cache: None,
        }
    }

    #[inline]
    fn step(&self, i: usize, j: usize) -> f64 {
        let ts = &self.shifted;
        let m = self.m;
        let removed = ts[i - 1] - ts[j - 1];
        let added = ts[i + m - 1] - ts[j + m - 1];
        added * added - removed * removed
    }

    fn fresh_column(&self, column: usize) -> Vec<f64> {
        let ts = &self.shifted;
        let qt = sliding_dot_product(&ts[column..column + self.m], ts);
        qt.iter()
            .enumerate()
            .map(|(i, q)| (self.sum_sq[i] + self.sum_sq[column] - 2.0 * q).max(0.0))
            .collect()
    }
}

impl DistanceGenerator for EuclideanGenerator {
    fn n_subsequences(&self) -> usize {
        self.n_subs
    }

    fn diagonal(&mut self, offset: usize) -> Vec<f64> {
        if offset >= self.n_subs {
            return Vec::new();
        }
        let diag_len = self.n_subs - offset;
        let mut out = Vec::with_capacity(diag_len);

        let mut sq = self.sq_first[offset];
        out.push(sq.sqrt());
        for i in 1..diag_len {
            sq = (sq + self.step(i, i + offset)).max(0.0);
            out.push(sq.sqrt());
        }
        out
    }

    fn column(&mut self, column: usize) -> Vec<f64> {
        if column >= self.n_subs {
            return Vec::new();
        }
        let squares = match self.column_cache.take() {
            Some((prev, prev_sq)) if prev + 1 == column => {
                let mut squares = Vec::with_capacity(self.n_subs);
                squares.push(self.sq_first[column]);
                for i in 1..self.n_subs {
                    squares.push((prev_sq[i - 1] + self.step(i, column)).max(0.0));
                }
                squares
            }
            _ => self.fresh_column(column),
        };

        let out = squares.iter().map(|sq| sq.sqrt()).collect();
        self.column_cache = Some((column, squares));
        out
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        let ts: &[f64] = &self.series;
        naive::euclidean(&ts[i..i + self.m], &ts[j..j + self.m])
    }
}
