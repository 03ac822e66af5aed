//! Exponential backoff with jitter for failed poll cycles.
//!
//! The default policy never gives up: a cycle is retried until it succeeds or
//! the loop is cancelled. Setting `max_elapsed_time` or `max_retries` turns it
//! into a bounded policy whose exhaustion surfaces as
//! [`SqsLoopError::RetriesExhaustedError`].

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::SqsLoopError;

/// Parameters for [`ExponentialBackoff`].
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry, before jitter.
    pub initial_interval: Duration,

    /// Growth factor applied to the interval after every failed attempt.
    pub multiplier: f64,

    /// Jitter as a fraction of the interval, in `[0.0, 1.0]`.
    /// The actual delay is drawn from `interval * (1 ± randomization_factor)`.
    pub randomization_factor: f64,

    /// Upper bound for the un-jittered interval.
    pub max_interval: Duration,

    /// Give up once this much time has passed since the retry sequence started.
    pub max_elapsed_time: Option<Duration>,

    /// Give up after this many retries.
    pub max_retries: Option<u32>,
}

impl BackoffConfig {
    pub fn with_initial_interval(mut self, initial_interval: Duration) -> Self {
        self.initial_interval = initial_interval;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_randomization_factor(mut self, randomization_factor: f64) -> Self {
        self.randomization_factor = randomization_factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    pub fn with_max_elapsed_time(mut self, max_elapsed_time: Duration) -> Self {
        self.max_elapsed_time = Some(max_elapsed_time);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: None,
            max_retries: None,
        }
    }
}

/// Stateful backoff for one sequence of retries.
#[derive(Debug)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    current_interval: Duration,
    started_at: Instant,
    retries: u32,
}

impl ExponentialBackoff {
    /// Creates a backoff sequence. Out-of-range values in `config` are
    /// clamped the same way the `BackoffConfig` builders clamp them.
    pub fn new(mut config: BackoffConfig) -> Self {
        if !config.multiplier.is_finite() || config.multiplier < 1.0 {
            config.multiplier = 1.0;
        }
        config.randomization_factor = if config.randomization_factor.is_finite() {
            config.randomization_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };

        ExponentialBackoff {
            current_interval: config.initial_interval.min(config.max_interval),
            config,
            started_at: Instant::now(),
            retries: 0,
        }
    }

    /// The interval the next delay will be drawn around.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Number of delays handed out so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the delay before the next attempt, or `None` when a configured
    /// bound has been reached.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self
            .config
            .max_retries
            .is_some_and(|max_retries| self.retries >= max_retries)
        {
            return None;
        }
        if self
            .config
            .max_elapsed_time
            .is_some_and(|max_elapsed| self.started_at.elapsed() >= max_elapsed)
        {
            return None;
        }

        let delay = apply_jitter(self.current_interval, self.config.randomization_factor);
        self.increment_interval();
        self.retries += 1;

        Some(delay)
    }

    fn increment_interval(&mut self) {
        let max_secs = self.config.max_interval.as_secs_f64();
        let next_secs = self.current_interval.as_secs_f64() * self.config.multiplier;

        self.current_interval = if next_secs >= max_secs {
            self.config.max_interval
        } else {
            Duration::try_from_secs_f64(next_secs).unwrap_or(self.config.max_interval)
        };
    }
}

/// Draws a delay uniformly from `interval * (1 ± factor)`.
fn apply_jitter(interval: Duration, factor: f64) -> Duration {
    if factor <= 0.0 || interval.is_zero() {
        return interval;
    }

    let secs = interval.as_secs_f64();
    let delta = secs * factor;
    let low = (secs - delta).max(0.0);
    let high = secs + delta;

    if !high.is_finite() {
        return interval;
    }

    Duration::try_from_secs_f64(rand::rng().random_range(low..=high)).unwrap_or(interval)
}

/// Runs `operation` until it succeeds, sleeping between failures.
///
/// `notify` sees every failed attempt together with the delay about to be
/// slept. Cancellation is observed while sleeping and before each retry; an
/// attempt that is already running is never interrupted.
pub(crate) async fn retry_notify<F, Fut, N>(
    backoff: &mut ExponentialBackoff,
    cancel: &CancellationToken,
    mut operation: F,
    mut notify: N,
) -> Result<(), SqsLoopError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), SqsLoopError>>,
    N: FnMut(&SqsLoopError, Duration),
{
    loop {
        let err = match operation().await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let Some(delay) = backoff.next_backoff() else {
            return Err(SqsLoopError::RetriesExhaustedError {
                attempts: backoff.retries() + 1,
                source: Box::new(err),
            });
        };

        notify(&err, delay);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SqsLoopError::CancelledError),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
