use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::DiagonalOrder;

/// Which diagonals of the (upper-triangle) distance matrix have been delivered.
///
/// Owned by a single calculator. Diagonals are identified by their offset
/// `k = j - i`, from `first_diagonal` (the exclusion radius) up to
/// `n_subsequences - 1`.
#[derive(Debug, Clone)]
pub struct Progress {
    first_diagonal: usize,
    order: Vec<usize>,
    done: Vec<bool>,
    cursor: usize,
    completed: usize,
}

impl Progress {
    pub fn new(first_diagonal: usize, n_subsequences: usize, order: DiagonalOrder) -> Self {
        let mut offsets: Vec<usize> = (first_diagonal..n_subsequences.max(first_diagonal)).collect();
        if let DiagonalOrder::Shuffled { seed } = order {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            offsets.shuffle(&mut rng);
        }
        let total = offsets.len();
        Self {
            first_diagonal,
            order: offsets,
            done: vec![false; total],
            cursor: 0,
            completed: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Fraction of diagonals delivered; 1.0 when there is nothing to compute.
    pub fn fraction(&self) -> f64 {
        if self.order.is_empty() {
            1.0
        } else {
            self.completed as f64 / self.order.len() as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.order.len()
    }

    pub fn is_done(&self, offset: usize) -> bool {
        offset
            .checked_sub(self.first_diagonal)
            .and_then(|k| self.done.get(k).copied())
            .unwrap_or(false)
    }

    /// Next diagonal offset that has not been delivered yet.
    pub fn next_pending(&mut self) -> Option<usize> {
        while let Some(&offset) = self.order.get(self.cursor) {
            if !self.is_done(offset) {
                return Some(offset);
            }
            self.cursor += 1;
        }
        None
    }

    pub fn mark_done(&mut self, offset: usize) {
        if let Some(slot) = offset
            .checked_sub(self.first_diagonal)
            .and_then(|k| self.done.get_mut(k))
        {
            if !*slot {
                *slot = true;
                self.completed += 1;
            }
        }
    }

    pub fn mark_all_done(&mut self) {
        self.done.iter_mut().for_each(|d| *d = true);
        self.completed = self.order.len();
        self.cursor = self.order.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_order() {
        let mut progress = Progress::new(2, 6, DiagonalOrder::Sequential);
        assert_eq!(progress.total(), 4);
        let mut seen = Vec::new();
        while let Some(k) = progress.next_pending() {
            seen.push(k);
            progress.mark_done(k);
        }
        assert_eq!(seen, vec![2, 3, 4, 5]);
        assert!(progress.is_complete());
        assert!((progress.fraction() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shuffled_is_permutation_and_reproducible() {
        let collect = |seed| {
            let mut progress = Progress::new(3, 50, DiagonalOrder::Shuffled { seed });
            let mut seen = Vec::new();
            while let Some(k) = progress.next_pending() {
                seen.push(k);
                progress.mark_done(k);
            }
            seen
        };
        let a = collect(7);
        let b = collect(7);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (3..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_mark_done_is_idempotent() {
        let mut progress = Progress::new(1, 5, DiagonalOrder::Sequential);
        progress.mark_done(2);
        progress.mark_done(2);
        progress.mark_done(0); // inside exclusion zone, ignored
        progress.mark_done(99); // out of range, ignored
        assert_eq!(progress.completed(), 1);
        assert!(progress.is_done(2));
        assert!(!progress.is_done(0));
    }

    #[test]
    fn test_empty_range() {
        let progress = Progress::new(10, 5, DiagonalOrder::default());
        assert_eq!(progress.total(), 0);
        assert!(progress.is_complete());
        assert!((progress.fraction() - 1.0).abs() < 1e-12);
    }
}
