use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Order in which the anytime calculator visits diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalOrder {
    /// Increasing offset, starting at the exclusion-zone boundary.
    Sequential,
    /// Seeded random permutation. Partial results then cover the whole
    /// distance matrix evenly instead of only the band near the diagonal.
    Shuffled { seed: u64 },
}

impl Default for DiagonalOrder {
    fn default() -> Self {
        Self::Shuffled { seed: 0 }
    }
}

/// Configuration for an anytime calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Subsequence length.
    pub m: usize,
    /// Pairs with `|i - j| < radius` are never generated.
    /// Defaults to `ceil(m / 2)` when unset.
    #[serde(default)]
    pub exclusion_radius: Option<usize>,
    /// Diagonal traversal order for `calculate_diagonals`.
    #[serde(default)]
    pub diagonal_order: DiagonalOrder,
}

impl CalculatorConfig {
    pub fn new(m: usize) -> Self {
        Self {
            m,
            exclusion_radius: None,
            diagonal_order: DiagonalOrder::default(),
        }
    }

    pub fn with_exclusion_radius(mut self, radius: usize) -> Self {
        self.exclusion_radius = Some(radius);
        self
    }

    pub fn with_diagonal_order(mut self, order: DiagonalOrder) -> Self {
        self.diagonal_order = order;
        self
    }

    /// Effective exclusion radius.
    pub fn exclusion_radius(&self) -> usize {
        self.exclusion_radius.unwrap_or_else(|| self.m.div_ceil(2))
    }

    /// Check the configuration against a series of length `n`.
    pub fn validate(&self, n: usize) -> Result<()> {
        if self.m == 0 || self.m > n {
            return Err(Error::InvalidWindow { m: self.m, n });
        }
        let radius = self.exclusion_radius();
        if radius == 0 {
            return Err(Error::InvalidExclusionRadius(radius));
        }
        Ok(())
    }
}
