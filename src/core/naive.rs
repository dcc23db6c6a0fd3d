//! Direct O(m) distance formulas.
//!
//! These recompute a single distance from the raw windows. The generators use
//! them for `DistanceGenerator::distance`, and tests use them as the reference
//! the incremental diagonal/column recurrences are checked against.

use crate::core::rolling::{is_constant, same_level, window_moments};

/// Euclidean distance between two equal-length windows.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance assigned when z-normalization is undefined for exactly one side,
/// or for two constant windows at different levels. Equal to the distance of
/// two uncorrelated z-normalized windows.
#[inline]
pub fn constant_fallback(m: usize) -> f64 {
    (2.0 * m as f64).sqrt()
}

/// Squared noise contribution removed from a z-normalized distance.
#[inline]
pub fn noise_correction(m: usize, noise_std: f64, std_a: f64, std_b: f64) -> f64 {
    let max_std = std_a.max(std_b);
    2.0 * (m as f64 + 1.0) * noise_std * noise_std / (max_std * max_std)
}

/// Z-normalized Euclidean distance between two equal-length windows.
///
/// Both windows are explicitly rescaled to zero mean and unit (population)
/// variance before the Euclidean distance is taken.
///
/// Edge cases:
/// - Both windows constant at the same level → 0
/// - Both constant at different levels, or only one constant → `sqrt(2m)`
/// - `noise_std > 0` subtracts `2(m+1) noise_std² / max(σa, σb)²` from the
///   squared distance, clamped at 0
pub fn znorm_euclidean(a: &[f64], b: &[f64], noise_std: f64) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let m = a.len();
    let m_f = m as f64;
    let (mu_a, dev_a, _) = window_moments(a);
    let (mu_b, dev_b, _) = window_moments(b);
    let std_a = (dev_a / m_f).sqrt();
    let std_b = (dev_b / m_f).sqrt();

    match (is_constant(mu_a, std_a), is_constant(mu_b, std_b)) {
        (true, true) if same_level(mu_a, mu_b) => return 0.0,
        (true, _) | (_, true) => return constant_fallback(m),
        _ => {}
    }

    let mut dist_sq: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (x - mu_a) / std_a - (y - mu_b) / std_b;
            d * d
        })
        .sum();
    if noise_std > 0.0 {
        dist_sq -= noise_correction(m, noise_std, std_a, std_b);
    }
    dist_sq.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_hand_computed() {
        // ||[1,2]-[3,4]|| = sqrt(8)
        let d = euclidean(&[1.0, 2.0], &[3.0, 4.0]);
        assert!((d - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_znorm_shifted_and_scaled() {
        // Same shape, different offset and amplitude → d ≈ 0
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [10.0, 30.0, 50.0, 70.0];
        assert!(znorm_euclidean(&a, &b, 0.0) < 1e-7);
    }

    #[test]
    fn test_znorm_anticorrelated() {
        // [1,2] → [-1,1], [4,3] → [1,-1]; d = sqrt(2*2*2)
        let d = znorm_euclidean(&[1.0, 2.0], &[4.0, 3.0], 0.0);
        assert!((d - 8.0_f64.sqrt()).abs() < 1e-10, "got {d}");
    }

    #[test]
    fn test_znorm_constant_cases() {
        let c5 = [5.0; 4];
        let c7 = [7.0; 4];
        let ramp = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(znorm_euclidean(&c5, &c5, 0.0), 0.0);
        assert_eq!(znorm_euclidean(&c5, &c7, 0.0), constant_fallback(4));
        assert_eq!(znorm_euclidean(&c5, &ramp, 0.0), constant_fallback(4));
        assert_eq!(znorm_euclidean(&ramp, &c7, 0.0), constant_fallback(4));
    }

    #[test]
    fn test_noise_correction_reduces_distance() {
        let a = [1.0, 3.0, 2.0, 5.0, 4.0];
        let b = [2.0, 3.0, 1.0, 4.0, 5.0];
        let plain = znorm_euclidean(&a, &b, 0.0);
        let corrected = znorm_euclidean(&a, &b, 0.1);
        assert!(corrected < plain);
        assert!(corrected >= 0.0);
        // Large noise clamps to zero instead of going NaN
        assert_eq!(znorm_euclidean(&a, &b, 100.0), 0.0);
    }
}
