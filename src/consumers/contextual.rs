use crate::consumers::DistanceConsumer;
use crate::context::ContextManager;
use crate::error::Result;

/// Best match between two contexts: the distance and the subsequence pair
/// (query in the row context, series in the column context) realising it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmpCell {
    pub distance: f64,
    pub query: usize,
    pub series: usize,
}

impl CmpCell {
    /// Smaller distance wins; exact ties go to the lexicographically smaller
    /// `(query, series)` pair.
    #[inline]
    fn beaten_by(&self, distance: f64, query: usize, series: usize) -> bool {
        distance < self.distance
            || (distance == self.distance && (query, series) < (self.query, self.series))
    }
}

/// Contextual matrix profile consumer.
///
/// Cell `(a, b)` holds the minimum distance between any subsequence of
/// context `a` and any subsequence of context `b`. A delivered `d(i, j)`
/// updates `(a, b)` and `(b, a)` for every `a` containing `i` and `b`
/// containing `j`. Cells no pair has reached are `None` internally and
/// `+inf` in [`distance_matrix`](Self::distance_matrix).
#[derive(Debug, Clone)]
pub struct ContextualMatrixProfile<C: ContextManager> {
    contexts: C,
    n_contexts: usize,
    /// Row-major `n_contexts x n_contexts`.
    cells: Vec<Option<CmpCell>>,
}

impl<C: ContextManager> ContextualMatrixProfile<C> {
    pub fn new(contexts: C) -> Self {
        let n_contexts = contexts.n_contexts();
        Self {
            contexts,
            n_contexts,
            cells: vec![None; n_contexts * n_contexts],
        }
    }

    pub fn n_contexts(&self) -> usize {
        self.n_contexts
    }

    pub fn contexts(&self) -> &C {
        &self.contexts
    }

    /// Best match for `(a, b)`, if any pair has reached it.
    pub fn best_match(&self, a: usize, b: usize) -> Option<CmpCell> {
        if a >= self.n_contexts || b >= self.n_contexts {
            return None;
        }
        self.cells[a * self.n_contexts + b]
    }

    /// Distance of cell `(a, b)`; `None` when untouched or out of range.
    pub fn cell(&self, a: usize, b: usize) -> Option<f64> {
        self.best_match(a, b).map(|c| c.distance)
    }

    /// Snapshot of the CMP with `+inf` for untouched cells.
    pub fn distance_matrix(&self) -> Vec<Vec<f64>> {
        self.distance_matrix_filled(f64::INFINITY)
    }

    /// Snapshot of the CMP with `fill` for untouched cells.
    pub fn distance_matrix_filled(&self, fill: f64) -> Vec<Vec<f64>> {
        self.render(|c| c.map_or(fill, |c| c.distance))
    }

    /// Query subsequence of each cell's best match, `None` when untouched.
    pub fn match_index_query(&self) -> Vec<Vec<Option<usize>>> {
        self.render(|c| c.map(|c| c.query))
    }

    /// Series subsequence of each cell's best match, `None` when untouched.
    pub fn match_index_series(&self) -> Vec<Vec<Option<usize>>> {
        self.render(|c| c.map(|c| c.series))
    }

    fn render<T>(&self, f: impl Fn(Option<CmpCell>) -> T) -> Vec<Vec<T>> {
        if self.n_contexts == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.n_contexts)
            .map(|row| row.iter().copied().map(&f).collect())
            .collect()
    }

    #[inline]
    fn update(cell: &mut Option<CmpCell>, distance: f64, query: usize, series: usize) {
        match cell {
            Some(best) if !best.beaten_by(distance, query, series) => {}
            _ => {
                *cell = Some(CmpCell {
                    distance,
                    query,
                    series,
                })
            }
        }
    }
}

impl<C: ContextManager> DistanceConsumer for ContextualMatrixProfile<C> {
    fn initialise(&mut self, n_subsequences: usize) -> Result<()> {
        self.contexts.validate(n_subsequences)?;
        self.n_contexts = self.contexts.n_contexts();
        self.cells = vec![None; self.n_contexts * self.n_contexts];
        Ok(())
    }

    fn accept(&mut self, i: usize, j: usize, value: f64) {
        if value.is_nan() {
            return;
        }
        let n = self.n_contexts;
        let rows = self.contexts.context_containing(i);
        let cols = self.contexts.context_containing(j);
        for &a in rows {
            for &b in cols {
                Self::update(&mut self.cells[a * n + b], value, i, j);
                Self::update(&mut self.cells[b * n + a], value, j, i);
            }
        }
    }
}
