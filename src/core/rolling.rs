/// Relative tolerance below which a window's standard deviation counts as zero.
pub const CONSTANT_TOL: f64 = 1e-12;

/// Sliding-window drift check: when the running sum of squared deviations
/// falls below this fraction of the raw sum of squares, it is recomputed
/// exactly from the window.
const RECOMPUTE_TOL: f64 = 1e-6;

/// Exact moments of one window: `(mean, sum of squared deviations, sum of squares)`.
///
/// Two-pass, so constant windows come out with a deviation of (almost) exactly zero.
pub fn window_moments(window: &[f64]) -> (f64, f64, f64) {
    let m_f = window.len() as f64;
    let mean = window.iter().sum::<f64>() / m_f;
    let dev = window.iter().map(|x| (x - mean) * (x - mean)).sum();
    let sum_sq = window.iter().map(|x| x * x).sum();
    (mean, dev, sum_sq)
}

/// Whether a window with the given mean and standard deviation is constant.
#[inline]
pub fn is_constant(mean: f64, std: f64) -> bool {
    std == 0.0 || std <= CONSTANT_TOL * mean.abs()
}

/// Whether two constant windows share the same level.
#[inline]
pub fn same_level(mean_a: f64, mean_b: f64) -> bool {
    mean_a == mean_b || (mean_a - mean_b).abs() <= CONSTANT_TOL * mean_a.abs().max(mean_b.abs())
}

/// Rolling mean and standard deviation for all subsequences of length `m`.
///
/// Slides a Welford-style update (`M2 += (x_new - x_old) * (x_new - mu_new + x_old - mu_old)`)
/// across the series. The window is recomputed exactly every `m` steps and whenever
/// the running deviation becomes small relative to the window energy, so constant
/// stretches are detected reliably after leaving a high-variance region.
#[derive(Debug, Clone)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    /// `1 / sqrt(sum((x - mean)^2))`, i.e. `1 / (sqrt(m) * sigma)`.
    /// Zero for constant subsequences.
    pub inv_norm: Vec<f64>,
}

impl RollingStats {
    /// Compute rolling statistics for subsequences of length `m`.
    ///
    /// Callers validate `0 < m <= ts.len()` beforehand.
    pub fn compute(ts: &[f64], m: usize) -> Self {
        debug_assert!(m > 0 && ts.len() >= m);
        let n_subs = ts.len() - m + 1;
        let m_f = m as f64;

        let mut mean = Vec::with_capacity(n_subs);
        let mut std = Vec::with_capacity(n_subs);
        let mut inv_norm = Vec::with_capacity(n_subs);

        let (mut mu, mut dev, mut sum_sq) = window_moments(&ts[0..m]);
        let mut exact = true;

        for i in 0..n_subs {
            if i > 0 {
                let old = ts[i - 1];
                let new = ts[i + m - 1];
                if i % m == 0 {
                    (mu, dev, sum_sq) = window_moments(&ts[i..i + m]);
                    exact = true;
                } else if new != old {
                    let new_mu = mu + (new - old) / m_f;
                    dev = (dev + (new - old) * (new - new_mu + old - mu)).max(0.0);
                    sum_sq += new * new - old * old;
                    mu = new_mu;
                    exact = false;
                }
                if !exact && dev <= RECOMPUTE_TOL * sum_sq.abs() {
                    (mu, dev, sum_sq) = window_moments(&ts[i..i + m]);
                    exact = true;
                }
            }

            let sigma = (dev / m_f).sqrt();
            mean.push(mu);
            std.push(sigma);
            if is_constant(mu, sigma) {
                inv_norm.push(0.0);
            } else {
                inv_norm.push(1.0 / dev.sqrt());
            }
        }

        Self {
            mean,
            std,
            inv_norm,
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Sum of squares of every window of length `m`, via cumulative sums.
pub fn rolling_sum_sq(ts: &[f64], m: usize) -> Vec<f64> {
    debug_assert!(m > 0 && ts.len() >= m);
    let n = ts.len();
    let mut cumsum_sq = vec![0.0; n + 1];
    for i in 0..n {
        cumsum_sq[i + 1] = cumsum_sq[i] + ts[i] * ts[i];
    }
    (0..n - m + 1)
        .map(|i| (cumsum_sq[i + m] - cumsum_sq[i]).max(0.0))
        .collect()
}
