//! Error types for calculator setup.
//!
//! Every variant is a configuration error raised while wiring series,
//! generators, consumers and contexts together. Nothing in the distance
//! computation itself fails: numeric degeneracies are recovered by the
//! generators.

use thiserror::Error;

/// Configuration error returned by setup calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Window length is zero or longer than the series.
    #[error("Invalid window length: m = {m} for series of length {n}")]
    InvalidWindow { m: usize, n: usize },

    /// No channels, or channels without samples.
    #[error("Invalid input: series is empty")]
    EmptySeries,

    /// Channels must share the same index space.
    #[error("Invalid input: channel {channel} has length {actual}, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// NaN or infinite sample in the input.
    #[error("Invalid input: channel {channel} has a non-finite sample at index {index}")]
    NonFiniteSample { channel: usize, index: usize },

    /// An exclusion radius of zero would match every subsequence with itself.
    #[error("Invalid exclusion radius: {0} (must be >= 1)")]
    InvalidExclusionRadius(usize),

    /// Out-of-range numeric parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generator bound to a channel that does not exist.
    #[error("Unknown channel {channel}: calculator has {n_channels} channels")]
    UnknownChannel { channel: usize, n_channels: usize },

    /// Consumer subscribed to a generator id that was never registered.
    #[error("Unknown generator id {0}")]
    UnknownGenerator(usize),

    /// Consumer subscribed to no generator at all.
    #[error("Consumer must subscribe to at least one generator")]
    NoGenerators,

    /// Context with `start > end`.
    #[error("Invalid context {context}: range {start}..{end} is reversed")]
    InvalidContextRange {
        context: usize,
        start: usize,
        end: usize,
    },

    /// Context range reaching past the last subsequence.
    #[error(
        "Context {context} range {start}..{end} out of bounds for {n_subsequences} subsequences"
    )]
    ContextOutOfBounds {
        context: usize,
        start: usize,
        end: usize,
        n_subsequences: usize,
    },

    /// Registration after distances were already delivered.
    #[error("Calculation already started: generators and consumers must be added first")]
    CalculationStarted,
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_fraction(fraction: f64) -> Self {
        Self::InvalidParameter(format!("fraction {fraction} must be in [0, 1]"))
    }

    pub(crate) fn invalid_noise(noise_std: f64) -> Self {
        Self::InvalidParameter(format!(
            "noise_std {noise_std} must be finite and non-negative"
        ))
    }
}
