use realfft::RealFftPlanner;

/// Size threshold (n * m) above which we dispatch to the FFT path.
/// Below this, the naive O(n*m) loop wins due to lower constant overhead.
const FFT_THRESHOLD: usize = 256 * 1024;

/// Sliding dot product between a query window `q` and every window of `ts`.
///
/// Returns a vector of length `ts.len() - q.len() + 1` where element `i` is
/// `dot(q, ts[i..i+m])`. Generators use it to seed the first row of the
/// distance matrix, and to rebuild a column when columns are not visited in order.
pub fn sliding_dot_product(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    let n = ts.len();
    debug_assert!(n >= m, "Time series shorter than query");
    if n * m > FFT_THRESHOLD {
        sliding_dot_product_fft(q, ts)
    } else {
        sliding_dot_product_naive(q, ts)
    }
}

/// Naive O(n*m) sliding dot product.
pub fn sliding_dot_product_naive(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    let n_subs = ts.len() + 1 - m;

    (0..n_subs)
        .map(|i| q.iter().zip(&ts[i..i + m]).map(|(a, b)| a * b).sum())
        .collect()
}

/// FFT-based O(n log n) sliding dot product via cross-correlation.
///
/// Falls back to the naive loop if the FFT rejects its buffers.
pub fn sliding_dot_product_fft(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    let n = ts.len();
    let n_subs = n + 1 - m;
    let fft_len = (n + m - 1).next_power_of_two();

    let mut planner = RealFftPlanner::<f64>::new();
    let fft_forward = planner.plan_fft_forward(fft_len);
    let fft_inverse = planner.plan_fft_inverse(fft_len);

    // Reversed query turns convolution into correlation
    let mut q_padded = vec![0.0; fft_len];
    for (dst, src) in q_padded.iter_mut().zip(q.iter().rev()) {
        *dst = *src;
    }
    let mut ts_padded = vec![0.0; fft_len];
    ts_padded[..n].copy_from_slice(ts);

    let mut q_spectrum = fft_forward.make_output_vec();
    let mut ts_spectrum = fft_forward.make_output_vec();
    if fft_forward.process(&mut q_padded, &mut q_spectrum).is_err()
        || fft_forward.process(&mut ts_padded, &mut ts_spectrum).is_err()
    {
        return sliding_dot_product_naive(q, ts);
    }

    for (q_val, ts_val) in q_spectrum.iter_mut().zip(ts_spectrum.iter()) {
        *q_val *= ts_val;
    }

    let mut result = vec![0.0; fft_len];
    if fft_inverse.process(&mut q_spectrum, &mut result).is_err() {
        return sliding_dot_product_naive(q, ts);
    }

    // realfft inverse is unnormalized
    let norm = 1.0 / fft_len as f64;
    result[m - 1..m - 1 + n_subs]
        .iter()
        .map(|&x| x * norm)
        .collect()
}

/// Copy of `window` with its mean removed.
pub fn centered(window: &[f64], mean: f64) -> Vec<f64> {
    window.iter().map(|x| x - mean).collect()
}
