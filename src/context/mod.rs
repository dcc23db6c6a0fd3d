//! Analyst-defined groups of subsequence indices ("contexts").

pub mod general_static;

use std::ops::Range;

use crate::error::Result;

/// Partition (not necessarily disjoint or exhaustive) of the subsequence
/// index space into numbered contexts.
pub trait ContextManager: Send {
    /// Number of contexts.
    fn n_contexts(&self) -> usize;

    /// Ids of all contexts containing subsequence `index`, ascending.
    /// Indices outside every context yield an empty slice.
    fn context_containing(&self, index: usize) -> &[usize];

    /// Index ranges making up `context`, sorted and non-overlapping.
    /// Unknown ids yield an empty slice.
    fn range_of(&self, context: usize) -> &[Range<usize>];

    /// Check that every context lies within `0..n_subsequences`.
    fn validate(&self, n_subsequences: usize) -> Result<()>;
}

pub use general_static::GeneralStaticManager;
