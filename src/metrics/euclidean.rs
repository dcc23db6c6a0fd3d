use std::sync::Arc;

use crate::algorithms::common::{centered, sliding_dot_product};
use crate::core::distance_metric::{check_window, DistanceGenerator, DistanceMetric};
use crate::core::naive::{self, constant_fallback, noise_correction};
use crate::core::rolling::{same_level, RollingStats};
use crate::error::{Error, Result};

/// Z-normalized Euclidean distance.
///
/// Distance formula: `d = sqrt(2 * m * (1 - r))` where `r` is the Pearson
/// correlation of the two windows.
///
/// Edge cases:
/// - Both subsequences constant at the same level → d = 0
/// - Both constant at different levels, or one constant → d = sqrt(2m)
/// - `r` is clamped to [-1, 1] for numerical stability
/// - `noise_std > 0` subtracts the expected noise contribution
///   `2(m+1) * noise_std² / max(σi, σj)²` from `d²`, clamped at 0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZNormEuclidean {
    pub noise_std: f64,
}

impl ZNormEuclidean {
    pub fn new(noise_std: f64) -> Self {
        Self { noise_std }
    }
}

impl DistanceMetric for ZNormEuclidean {
    fn name(&self) -> &'static str {
        "znorm_euclidean"
    }

    fn prepare(&self, m: usize, series: Arc<[f64]>) -> Result<Box<dyn DistanceGenerator>> {
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(Error::invalid_noise(self.noise_std));
        }
        check_window(m, &series)?;
        Ok(Box::new(ZNormEuclideanGenerator::new(
            m,
            series,
            self.noise_std,
        )))
    }
}

/// Z-normalized Euclidean generator for one channel.
///
/// Works in the covariance domain. With `C(i, j) = sum_k (x[i+k] - mu_i)(x[j+k] - mu_j)`,
/// neighbouring cells along a diagonal satisfy
///
/// `C(i, j) = C(i-1, j-1) + df[i] * dg[j] + df[j] * dg[i]`
///
/// with `df[i] = (x[i+m-1] - x[i-1]) / 2` and
/// `dg[i] = (x[i+m-1] - mu_i) + (x[i-1] - mu_{i-1})`. The update only involves
/// mean-centered quantities, which avoids the cancellation of the raw
/// dot-product form `QT - m * mu_i * mu_j` on series with a large offset.
/// The first row `C(0, k)` is seeded with one sliding dot product of the
/// centered first window.
pub struct ZNormEuclideanGenerator {
    series: Arc<[f64]>,
    m: usize,
    n_subs: usize,
    noise_std: f64,
    stats: RollingStats,
    df: Vec<f64>,
    dg: Vec<f64>,
    cov_first: Vec<f64>,
    /// Last column index and its covariances.
    column_cache: Option<(usize, Vec<f64>)>,
}

impl ZNormEuclideanGenerator {
    pub(crate) fn new(m: usize, series: Arc<[f64]>, noise_std: f64) -> Self {
        let ts: &[f64] = &series;
        let n_subs = ts.len() - m + 1;
        let stats = RollingStats::compute(ts, m);

        let mut df = vec![0.0; n_subs];
        let mut dg = vec![0.0; n_subs];
        for i in 1..n_subs {
            df[i] = (ts[i + m - 1] - ts[i - 1]) / 2.0;
            dg[i] = (ts[i + m - 1] - stats.mean[i]) + (ts[i - 1] - stats.mean[i - 1]);
        }

        let cov_first = sliding_dot_product(&centered(&ts[0..m], stats.mean[0]), ts);

        Self {
            series,
            m,
            n_subs,
            noise_std,
            stats,
            df,
            dg,
            cov_first,
            column_cache: None,
        }
    }

    /// Convert a covariance to a distance.
    #[inline]
    fn cov_to_distance(&self, cov: f64, i: usize, j: usize) -> f64 {
        let ni = self.stats.inv_norm[i];
        let nj = self.stats.inv_norm[j];

        if ni == 0.0 || nj == 0.0 {
            return if ni == 0.0 && nj == 0.0 && same_level(self.stats.mean[i], self.stats.mean[j])
            {
                0.0
            } else {
                constant_fallback(self.m)
            };
        }

        let m_f = self.m as f64;
        let r = (cov * ni * nj).clamp(-1.0, 1.0);
        let mut dist_sq = 2.0 * m_f * (1.0 - r);
        if self.noise_std > 0.0 {
            dist_sq -= noise_correction(self.m, self.noise_std, self.stats.std[i], self.stats.std[j]);
        }
        dist_sq.max(0.0).sqrt()
    }

    #[inline]
    fn step(&self, i: usize, j: usize) -> f64 {
        self.df[i] * self.dg[j] + self.df[j] * self.dg[i]
    }

    fn fresh_column(&self, column: usize) -> Vec<f64> {
        let ts: &[f64] = &self.series;
        let window = centered(&ts[column..column + self.m], self.stats.mean[column]);
        sliding_dot_product(&window, ts)
    }
}

impl DistanceGenerator for ZNormEuclideanGenerator {
    fn n_subsequences(&self) -> usize {
        self.n_subs
    }

    fn diagonal(&mut self, offset: usize) -> Vec<f64> {
        if offset >= self.n_subs {
            return Vec::new();
        }
        let diag_len = self.n_subs - offset;
        let mut out = Vec::with_capacity(diag_len);

        let mut cov = self.cov_first[offset];
        out.push(self.cov_to_distance(cov, 0, offset));
        for i in 1..diag_len {
            let j = i + offset;
            cov += self.step(i, j);
            out.push(self.cov_to_distance(cov, i, j));
        }
        out
    }

    fn column(&mut self, column: usize) -> Vec<f64> {
        if column >= self.n_subs {
            return Vec::new();
        }
        let covs = match self.column_cache.take() {
            Some((prev, prev_covs)) if prev + 1 == column => {
                let mut covs = Vec::with_capacity(self.n_subs);
                covs.push(self.cov_first[column]);
                for i in 1..self.n_subs {
                    covs.push(prev_covs[i - 1] + self.step(i, column));
                }
                covs
            }
            _ => self.fresh_column(column),
        };

        let out = covs
            .iter()
            .enumerate()
            .map(|(i, &cov)| self.cov_to_distance(cov, i, column))
            .collect();
        self.column_cache = Some((column, covs));
        out
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        let ts: &[f64] = &self.series;
        naive::znorm_euclidean(&ts[i..i + self.m], &ts[j..j + self.m], self.noise_std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(ts: &[f64], m: usize) -> Box<dyn DistanceGenerator> {
        ZNormEuclidean::default()
            .prepare(m, Arc::from(ts))
            .expect("valid metric")
    }

    #[test]
    fn test_prepare_rejects_window_longer_than_series() {
        let ts: Arc<[f64]> = Arc::from(vec![0.5; 5]);
        assert_eq!(
            ZNormEuclidean::default().prepare(6, ts).err(),
            Some(Error::InvalidWindow { m: 6, n: 5 })
        );
    }

    #[test]
    fn test_shifted_linear_is_zero() {
        // [1,2,3,4] vs [3,4,5,6]: same shape, just shifted → d ≈ 0
        let ts = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut gen = generator(&ts, 4);
        let diag = gen.diagonal(2);
        assert_eq!(diag.len(), 1);
        assert!(diag[0] < 1e-6, "got {}", diag[0]);
    }

    #[test]
    fn test_anticorrelated() {
        // [1,2] vs [4,3] → sqrt(8)
        let ts = vec![1.0, 2.0, 4.0, 3.0];
        let mut gen = generator(&ts, 2);
        let diag = gen.diagonal(2);
        assert!((diag[0] - 8.0_f64.sqrt()).abs() < 1e-10, "got {}", diag[0]);
    }

    #[test]
    fn test_constant_windows() {
        // Windows 0 and 4 are constant at the same level; 8 is constant at another level
        let ts = vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 9.0, 9.0, 9.0, 9.0];
        let m = 4;
        let mut gen = generator(&ts, m);
        let d_same = gen.diagonal(4)[0];
        assert_eq!(d_same, 0.0);
        let d_levels = gen.diagonal(8)[0];
        assert_eq!(d_levels, constant_fallback(m));
        assert!(d_levels.is_finite());
    }

    #[test]
    fn test_one_constant() {
        let ts = vec![5.0, 5.0, 5.0, 5.0, 1.0, 2.0, 3.0, 4.0];
        let mut gen = generator(&ts, 4);
        let d = gen.diagonal(4)[0];
        assert!((d - (8.0_f64).sqrt()).abs() < 1e-10, "got {d}");
    }

    #[test]
    fn test_diagonal_matches_naive() {
        let ts: Vec<f64> = (0..120)
            .map(|i| (i as f64 * 0.3).sin() * 4.0 + ((i * 31) % 17) as f64 * 0.1 + 1000.0)
            .collect();
        let m = 9;
        let mut gen = generator(&ts, m);
        for offset in [1, 5, 40, 111] {
            let diag = gen.diagonal(offset);
            assert_eq!(diag.len(), gen.n_subsequences() - offset);
            for (i, d) in diag.iter().enumerate() {
                let expected = gen.distance(i, i + offset);
                assert!(
                    (d - expected).abs() < 1e-6,
                    "offset {offset}, i {i}: incremental={d}, naive={expected}"
                );
            }
        }
        let n_subs = gen.n_subsequences();
        assert!(gen.diagonal(n_subs).is_empty());
    }

    #[test]
    fn test_columns_match_diagonals() {
        let ts: Vec<f64> = (0..80).map(|i| ((i * i) % 23) as f64 - 11.0).collect();
        let m = 6;
        let mut gen = generator(&ts, m);
        let n_subs = gen.n_subsequences();
        // Sequential access (cached recurrence) and a random jump (fresh column)
        let mut columns: Vec<(usize, Vec<f64>)> = (0..n_subs).map(|j| (j, gen.column(j))).collect();
        columns.push((30, gen.column(30)));
        for (j, col) in columns {
            assert_eq!(col.len(), n_subs);
            for (i, d) in col.iter().enumerate() {
                let expected = gen.distance(i, j);
                assert!(
                    (d - expected).abs() < 1e-6,
                    "column {j}, row {i}: incremental={d}, naive={expected}"
                );
            }
        }
    }

    #[test]
    fn test_rejects_negative_noise() {
        let ts = vec![1.0, 2.0, 3.0, 4.0];
        let result = ZNormEuclidean::new(-1.0).prepare(2, Arc::from(ts.as_slice()));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
