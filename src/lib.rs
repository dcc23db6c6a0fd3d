//! Anytime matrix profile and contextual matrix profile computation.
//!
//! Distances between all pairs of subsequences are produced by per-channel
//! [`DistanceGenerator`]s and streamed into [`DistanceConsumer`]s that keep
//! running aggregates. The [`AnytimeCalculator`] walks the distance matrix
//! diagonal by diagonal, so it can be stopped at any point with valid
//! (provisional) results that only improve as more diagonals are processed.

pub mod algorithms;
pub mod consumers;
pub mod context;
pub mod core;
pub mod error;
pub mod insights;
pub mod metrics;

use std::sync::Arc;

use parking_lot::Mutex;

pub use crate::algorithms::anytime::{AnytimeCalculator, GeneratorId};
pub use crate::consumers::{
    CmpCell, ContextualMatrixProfile, DistanceConsumer, DistanceMatrix, MatrixProfile,
};
pub use crate::context::{ContextManager, GeneralStaticManager};
pub use crate::core::config::{CalculatorConfig, DiagonalOrder};
pub use crate::core::distance_metric::{DistanceGenerator, DistanceMetric};
pub use crate::error::{Error, Result};
pub use crate::metrics::absolute::Euclidean;
pub use crate::metrics::euclidean::ZNormEuclidean;

/// One-shot facade over [`AnytimeCalculator`] for a single channel and metric.
///
/// # Examples
///
/// ```
/// use anytime_mp::{CalculatorConfig, ZNormEngine};
///
/// let ts: Vec<f64> = (0..64).map(|i| (i as f64 * 0.5).sin()).collect();
/// let engine = ZNormEngine::new(CalculatorConfig::new(8));
/// let mp = engine.compute(&ts).unwrap();
/// assert_eq!(mp.len(), ts.len() - 8 + 1);
/// assert!(mp.matrix_profile().iter().all(|d| d.is_finite()));
/// ```
pub struct Engine<M: DistanceMetric> {
    config: CalculatorConfig,
    metric: M,
}

impl<M: DistanceMetric + Default> Engine<M> {
    /// Create a new engine with the metric's default parameters.
    pub fn new(config: CalculatorConfig) -> Self {
        Self::with_metric(config, M::default())
    }
}

impl<M: DistanceMetric> Engine<M> {
    pub fn with_metric(config: CalculatorConfig, metric: M) -> Self {
        Self { config, metric }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Full left-right matrix profile of `ts`.
    pub fn compute(&self, ts: &[f64]) -> Result<MatrixProfile> {
        self.compute_anytime(ts, 1.0)
    }

    /// Matrix profile after processing `fraction` of the diagonals.
    ///
    /// Values are upper bounds of the exact profile; `fraction = 1.0` gives
    /// the exact result.
    pub fn compute_anytime(&self, ts: &[f64], fraction: f64) -> Result<MatrixProfile> {
        let mut calc = AnytimeCalculator::with_config(self.config.clone(), vec![ts.to_vec()])?;
        let gen = calc.add_generator(0, &self.metric)?;
        let mp = calc.add_consumer(&[gen], MatrixProfile::bidirectional())?;
        calc.calculate_diagonals(fraction, false)?;
        drop(calc);
        Ok(into_inner(mp))
    }

    /// Contextual matrix profile of `ts` over `contexts`.
    pub fn contextual<C>(&self, ts: &[f64], contexts: C) -> Result<ContextualMatrixProfile<C>>
    where
        C: ContextManager + Clone + 'static,
    {
        let mut calc = AnytimeCalculator::with_config(self.config.clone(), vec![ts.to_vec()])?;
        let gen = calc.add_generator(0, &self.metric)?;
        let cmp = calc.add_consumer(&[gen], ContextualMatrixProfile::new(contexts))?;
        calc.calculate_columns()?;
        drop(calc);
        Ok(into_inner(cmp))
    }
}

/// Take a consumer back from its shared handle once the calculator is gone.
fn into_inner<T: Clone>(handle: Arc<Mutex<T>>) -> T {
    match Arc::try_unwrap(handle) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => shared.lock().clone(),
    }
}

/// Engine with z-normalized Euclidean distance (shape similarity).
pub type ZNormEngine = Engine<ZNormEuclidean>;

/// Engine with plain Euclidean distance (amplitude and level matter).
pub type EuclideanEngine = Engine<Euclidean>;
