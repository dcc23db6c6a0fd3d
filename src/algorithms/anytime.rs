use std::sync::Arc;

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::consumers::DistanceConsumer;
use crate::core::config::CalculatorConfig;
use crate::core::distance_metric::{DistanceGenerator, DistanceMetric};
use crate::core::progress::Progress;
use crate::error::{Error, Result};

/// Handle returned by [`AnytimeCalculator::add_generator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorId(usize);

impl GeneratorId {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct GeneratorSlot {
    channel: usize,
    metric: &'static str,
    generator: Box<dyn DistanceGenerator>,
}

struct ConsumerSlot {
    generators: Vec<usize>,
    consumer: Arc<Mutex<dyn DistanceConsumer>>,
}

/// Drives distance generators and feeds their output to consumers.
///
/// The distance matrix is traversed one diagonal `k = j - i` at a time,
/// `k` running from the exclusion radius to `n' - 1`. Only the upper triangle
/// is computed: each pair is delivered once as `(i, j)` with `i < j`.
/// Progress survives between calls, so
///
/// ```text
/// calc.calculate_diagonals(0.1, false)?;   // rough profile
/// calc.calculate_diagonals(1.0, false)?;   // the rest
/// ```
///
/// delivers every pair exactly once. Consumer values read before
/// [`is_complete`](Self::is_complete) are provisional upper bounds.
pub struct AnytimeCalculator {
    config: CalculatorConfig,
    channels: Vec<Arc<[f64]>>,
    n_subs: usize,
    exclusion_radius: usize,
    generators: Vec<GeneratorSlot>,
    consumers: Vec<ConsumerSlot>,
    progress: Progress,
    started: bool,
}

impl AnytimeCalculator {
    /// Calculator for aligned `channels` with subsequence length `m` and
    /// default settings.
    pub fn new(m: usize, channels: Vec<Vec<f64>>) -> Result<Self> {
        Self::with_config(CalculatorConfig::new(m), channels)
    }

    pub fn with_config(config: CalculatorConfig, channels: Vec<Vec<f64>>) -> Result<Self> {
        let n = channels.first().map_or(0, Vec::len);
        if n == 0 {
            return Err(Error::EmptySeries);
        }
        for (channel, series) in channels.iter().enumerate() {
            if series.len() != n {
                return Err(Error::ChannelLengthMismatch {
                    channel,
                    expected: n,
                    actual: series.len(),
                });
            }
            if let Some(index) = series.iter().position(|x| !x.is_finite()) {
                return Err(Error::NonFiniteSample { channel, index });
            }
        }
        config.validate(n)?;

        let n_subs = n - config.m + 1;
        let exclusion_radius = config.exclusion_radius();
        let progress = Progress::new(exclusion_radius, n_subs, config.diagonal_order);
        debug!(
            "anytime calculator: {} channel(s), n = {n}, m = {}, exclusion radius {exclusion_radius}, {} diagonals",
            channels.len(),
            config.m,
            progress.total()
        );

        Ok(Self {
            config,
            channels: channels.into_iter().map(Arc::from).collect(),
            n_subs,
            exclusion_radius,
            generators: Vec::new(),
            consumers: Vec::new(),
            progress,
            started: false,
        })
    }

    /// Bind a generator for `metric` to `channel`. A channel may carry
    /// several generators.
    pub fn add_generator<M>(&mut self, channel: usize, metric: &M) -> Result<GeneratorId>
    where
        M: DistanceMetric + ?Sized,
    {
        if self.started {
            return Err(Error::CalculationStarted);
        }
        let series = self
            .channels
            .get(channel)
            .cloned()
            .ok_or(Error::UnknownChannel {
                channel,
                n_channels: self.channels.len(),
            })?;
        let generator = metric.prepare(self.config.m, series)?;
        let id = GeneratorId(self.generators.len());
        debug!(
            "generator {} ({}) bound to channel {channel}",
            id.0,
            metric.name()
        );
        self.generators.push(GeneratorSlot {
            channel,
            metric: metric.name(),
            generator,
        });
        Ok(id)
    }

    /// Subscribe `consumer` to the listed generators and return a shared
    /// handle for reading its state.
    pub fn add_consumer<C>(&mut self, generators: &[GeneratorId], mut consumer: C) -> Result<Arc<Mutex<C>>>
    where
        C: DistanceConsumer + 'static,
    {
        if self.started {
            return Err(Error::CalculationStarted);
        }
        if generators.is_empty() {
            return Err(Error::NoGenerators);
        }
        let mut ids: Vec<usize> = generators.iter().map(GeneratorId::index).collect();
        if let Some(&unknown) = ids.iter().find(|&&id| id >= self.generators.len()) {
            return Err(Error::UnknownGenerator(unknown));
        }
        ids.sort_unstable();
        ids.dedup();

        consumer.initialise(self.n_subs)?;
        let handle = Arc::new(Mutex::new(consumer));
        let shared: Arc<Mutex<dyn DistanceConsumer>> = handle.clone();
        debug!("consumer {} subscribed to generators {ids:?}", self.consumers.len());
        self.consumers.push(ConsumerSlot {
            generators: ids,
            consumer: shared,
        });
        Ok(handle)
    }

    /// Process diagonals until at least `fraction` of them are done.
    ///
    /// Diagonals already processed by earlier calls count towards the
    /// fraction. A call after completion does nothing.
    pub fn calculate_diagonals(&mut self, fraction: f64, report_progress: bool) -> Result<()> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::invalid_fraction(fraction));
        }
        if self.progress.is_complete() {
            warn!("calculate_diagonals called on a completed calculation; nothing to do");
            return Ok(());
        }

        let total = self.progress.total();
        let target = ((fraction * total as f64).ceil() as usize).min(total);
        let mut reported = self.progress.completed() * 10 / total;

        while self.progress.completed() < target {
            let Some(offset) = self.progress.next_pending() else {
                break;
            };
            self.started = true;
            let batch = compute_all(&mut self.generators, |g| g.diagonal(offset));
            self.deliver_diagonal(offset, &batch);
            self.progress.mark_done(offset);
            trace!("diagonal {offset} delivered");

            let decile = self.progress.completed() * 10 / total;
            if report_progress && decile > reported {
                reported = decile;
                info!(
                    "{}% of diagonals computed ({}/{total})",
                    decile * 10,
                    self.progress.completed()
                );
            }
        }

        if report_progress && self.progress.is_complete() {
            info!("matrix profile calculation complete");
        }
        Ok(())
    }

    /// Process every remaining pair column by column, then mark the
    /// calculation complete.
    ///
    /// Pairs on diagonals already delivered by `calculate_diagonals` are
    /// skipped, but each column that still has a pending row is computed in
    /// full, so after a long diagonal run this costs O(n'^2) regardless.
    /// Intermediate state is not meant to be read.
    pub fn calculate_columns(&mut self) -> Result<()> {
        if self.progress.is_complete() {
            warn!("calculate_columns called on a completed calculation; nothing to do");
            return Ok(());
        }
        self.started = true;

        for column in self.exclusion_radius..self.n_subs {
            let rows: Vec<usize> = (0..=column - self.exclusion_radius)
                .filter(|&i| !self.progress.is_done(column - i))
                .collect();
            if rows.is_empty() {
                continue;
            }
            let batch = compute_all(&mut self.generators, |g| g.column(column));
            for slot in &self.consumers {
                let mut consumer = slot.consumer.lock();
                for &g in &slot.generators {
                    let values = &batch[g];
                    for &i in &rows {
                        consumer.accept(i, column, values[i]);
                    }
                }
            }
            trace!("column {column} delivered ({} rows)", rows.len());
        }

        self.progress.mark_all_done();
        debug!("column-wise calculation complete");
        Ok(())
    }

    fn deliver_diagonal(&self, offset: usize, batch: &[Vec<f64>]) {
        for slot in &self.consumers {
            let mut consumer = slot.consumer.lock();
            for &g in &slot.generators {
                for (i, &value) in batch[g].iter().enumerate() {
                    consumer.accept(i, i + offset, value);
                }
            }
        }
    }

    /// Fraction of diagonals processed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress.fraction()
    }

    pub fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }

    pub fn total_diagonals(&self) -> usize {
        self.progress.total()
    }

    pub fn completed_diagonals(&self) -> usize {
        self.progress.completed()
    }

    pub fn n_subsequences(&self) -> usize {
        self.n_subs
    }

    pub fn window(&self) -> usize {
        self.config.m
    }

    pub fn exclusion_radius(&self) -> usize {
        self.exclusion_radius
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn n_generators(&self) -> usize {
        self.generators.len()
    }

    /// Channel and metric name of a registered generator.
    pub fn generator_info(&self, id: GeneratorId) -> Option<(usize, &'static str)> {
        self.generators.get(id.0).map(|s| (s.channel, s.metric))
    }
}

/// Run `f` on every generator; with the `parallel` feature generators are
/// processed concurrently.
#[cfg(feature = "parallel")]
fn compute_all<F>(slots: &mut [GeneratorSlot], f: F) -> Vec<Vec<f64>>
where
    F: Fn(&mut dyn DistanceGenerator) -> Vec<f64> + Sync + Send,
{
    use rayon::prelude::*;

    if slots.len() < 2 {
        return slots.iter_mut().map(|s| f(s.generator.as_mut())).collect();
    }
    slots.par_iter_mut().map(|s| f(s.generator.as_mut())).collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_all<F>(slots: &mut [GeneratorSlot], f: F) -> Vec<Vec<f64>>
where
    F: Fn(&mut dyn DistanceGenerator) -> Vec<f64>,
{
    slots.iter_mut().map(|s| f(s.generator.as_mut())).collect()
}
