use crate::consumers::DistanceConsumer;
use crate::error::{Error, Result};

/// Materialises the `n' x n'` distance matrix as pairs arrive.
///
/// Each delivered `(i, j)` fills both `(i, j)` and `(j, i)`. Cells never
/// delivered (the diagonal, the exclusion zone, and every diagonal not yet
/// processed) read as `+inf`. With several subscribed generators a cell
/// keeps the smallest value, as the other consumers do.
///
/// Memory is quadratic in the number of subsequences, so this is meant for
/// short series and inspection.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    n_subs: usize,
    /// Row-major, `+inf` where nothing was delivered.
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_subsequences(&self) -> usize {
        self.n_subs
    }

    /// Distance between subsequences `i` and `j`, if delivered.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.n_subs || j >= self.n_subs {
            return None;
        }
        Some(self.values[i * self.n_subs + j]).filter(|d| d.is_finite())
    }

    /// Number of cells holding a distance, counting `(i, j)` and `(j, i)`
    /// separately.
    pub fn n_filled(&self) -> usize {
        self.values.iter().filter(|d| d.is_finite()).count()
    }

    /// Snapshot as nested rows.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        if self.n_subs == 0 {
            return Vec::new();
        }
        self.values
            .chunks(self.n_subs)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

impl DistanceConsumer for DistanceMatrix {
    fn initialise(&mut self, n_subsequences: usize) -> Result<()> {
        let cells = n_subsequences.checked_mul(n_subsequences).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "distance matrix for {n_subsequences} subsequences is too large"
            ))
        })?;
        self.n_subs = n_subsequences;
        self.values = vec![f64::INFINITY; cells];
        Ok(())
    }

    fn accept(&mut self, i: usize, j: usize, value: f64) {
        let n = self.n_subs;
        if value < self.values[i * n + j] {
            self.values[i * n + j] = value;
            self.values[j * n + i] = value;
        }
    }
}
