use std::ops::Range;

use crate::context::ContextManager;
use crate::error::{Error, Result};

/// Fixed contexts given as explicit index ranges.
///
/// Contexts may overlap each other and need not cover every index; indices
/// outside all contexts simply take no part in contextual aggregation.
/// Ranges within one context are merged, so two descriptions of the same
/// index sets produce the same manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralStaticManager {
    contexts: Vec<Vec<Range<usize>>>,
    /// Disjoint ascending segments of the index space, each with the
    /// ascending ids of the contexts covering all of it.
    segments: Vec<(Range<usize>, Vec<usize>)>,
}

impl GeneralStaticManager {
    /// One context per range, numbered in iteration order.
    ///
    /// ```
    /// use anytime_mp::context::{ContextManager, GeneralStaticManager};
    ///
    /// let contexts = GeneralStaticManager::new([0..4, 10..14]).unwrap();
    /// assert_eq!(contexts.n_contexts(), 2);
    /// assert_eq!(contexts.context_containing(11), &[1]);
    /// assert!(contexts.context_containing(5).is_empty());
    /// ```
    pub fn new<I>(ranges: I) -> Result<Self>
    where
        I: IntoIterator<Item = Range<usize>>,
    {
        Self::from_range_sets(ranges.into_iter().map(|r| vec![r]))
    }

    /// One context per set of ranges.
    pub fn from_range_sets<I, R>(sets: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Range<usize>>,
    {
        let mut contexts = Vec::new();
        for (context, set) in sets.into_iter().enumerate() {
            let mut ranges: Vec<Range<usize>> = Vec::new();
            for range in set {
                if range.start > range.end {
                    return Err(Error::InvalidContextRange {
                        context,
                        start: range.start,
                        end: range.end,
                    });
                }
                if !range.is_empty() {
                    ranges.push(range);
                }
            }
            contexts.push(merge_ranges(ranges));
        }
        Ok(Self::build(contexts))
    }

    /// One context per arbitrary set of indices.
    pub fn from_index_sets<I, S>(sets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = usize>,
    {
        let mut range_sets = Vec::new();
        for (context, set) in sets.into_iter().enumerate() {
            let mut ranges = Vec::new();
            for i in set {
                let end = i.checked_add(1).ok_or_else(|| {
                    Error::InvalidParameter(format!("context {context}: index {i} overflows"))
                })?;
                ranges.push(i..end);
            }
            range_sets.push(ranges);
        }
        Self::from_range_sets(range_sets)
    }

    /// `count` contexts, context `c` covering `c * period .. c * period + width`.
    ///
    /// With `period` = samples per day this gives "windows starting in the
    /// first `width` samples of each day".
    pub fn periodic(period: usize, width: usize, count: usize) -> Result<Self> {
        if period == 0 {
            return Err(Error::InvalidParameter(
                "context period must be > 0".to_string(),
            ));
        }
        let ranges = (0..count)
            .map(|c| {
                c.checked_mul(period)
                    .and_then(|start| start.checked_add(width).map(|end| start..end))
                    .ok_or_else(|| {
                        Error::InvalidParameter(format!(
                            "periodic context {c} overflows the index space"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(ranges)
    }

    /// Fail with `ContextOutOfBounds` if any context reaches `n_subsequences`.
    pub fn bounded(self, n_subsequences: usize) -> Result<Self> {
        self.validate(n_subsequences)?;
        Ok(self)
    }

    /// Indices of `context`, ascending.
    pub fn indices_of(&self, context: usize) -> impl Iterator<Item = usize> + '_ {
        self.range_of(context).iter().flat_map(|r| r.clone())
    }

    /// Cut the index space at every range boundary; between two cuts the
    /// set of covering contexts is constant. Memory is linear in the number
    /// of ranges, not in their extent.
    fn build(contexts: Vec<Vec<Range<usize>>>) -> Self {
        let mut cuts: Vec<usize> = contexts
            .iter()
            .flatten()
            .flat_map(|r| [r.start, r.end])
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut segments: Vec<(Range<usize>, Vec<usize>)> = Vec::new();
        for cut in cuts.windows(2) {
            let segment = cut[0]..cut[1];
            let ids: Vec<usize> = contexts
                .iter()
                .enumerate()
                .filter(|(_, ranges)| covers(ranges, segment.start))
                .map(|(context, _)| context)
                .collect();
            if ids.is_empty() {
                continue;
            }
            match segments.last_mut() {
                Some((last, last_ids)) if last.end == segment.start && *last_ids == ids => {
                    last.end = segment.end
                }
                _ => segments.push((segment, ids)),
            }
        }
        Self { contexts, segments }
    }
}

impl ContextManager for GeneralStaticManager {
    fn n_contexts(&self) -> usize {
        self.contexts.len()
    }

    fn context_containing(&self, index: usize) -> &[usize] {
        let pos = self.segments.partition_point(|(r, _)| r.end <= index);
        match self.segments.get(pos) {
            Some((range, ids)) if range.start <= index => ids.as_slice(),
            _ => &[],
        }
    }

    fn range_of(&self, context: usize) -> &[Range<usize>] {
        self.contexts.get(context).map(Vec::as_slice).unwrap_or(&[])
    }

    fn validate(&self, n_subsequences: usize) -> Result<()> {
        for (context, ranges) in self.contexts.iter().enumerate() {
            if let Some(last) = ranges.last() {
                if last.end > n_subsequences {
                    return Err(Error::ContextOutOfBounds {
                        context,
                        start: ranges[0].start,
                        end: last.end,
                        n_subsequences,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Whether sorted, merged `ranges` contain `index`.
fn covers(ranges: &[Range<usize>], index: usize) -> bool {
    let pos = ranges.partition_point(|r| r.end <= index);
    ranges.get(pos).is_some_and(|r| r.start <= index)
}

/// Sort and merge overlapping or touching ranges.
fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
