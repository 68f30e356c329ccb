//! Repeated execution of a single plan with latency statistics.

use std::fmt;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use nfbench_types::ExecutionPlan;
use sketches_ddsketch::DDSketch;

use crate::executor::Executor;

/// Aggregated outcome of a benchmark run.
///
/// Latency statistics only cover successful calls, so a failed connection attempt does not skew the
/// average.
#[derive(Default)]
pub struct BenchmarkResult {
    /// Number of requests sent.
    pub total: u64,
    /// Number of requests that received a response below 400.
    pub success: u64,
    /// Number of requests that failed.
    pub failure: u64,
    /// Sum of the latencies of successful calls.
    pub total_time: Duration,
    /// Fastest successful call.
    pub min: Option<Duration>,
    /// Slowest successful call.
    pub max: Option<Duration>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    timings: DDSketch,
}

impl BenchmarkResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful call.
    pub fn record_success(&mut self, duration: Duration) {
        self.total += 1;
        self.success += 1;
        self.total_time += duration;
        self.min = Some(self.min.map_or(duration, |min| min.min(duration)));
        self.max = Some(self.max.map_or(duration, |max| max.max(duration)));
        self.timings.add(duration.as_secs_f64());
    }

    /// Records a failed call.
    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failure += 1;
    }

    /// Average latency of successful calls, zero if there were none.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.success) {
            Ok(0) => Duration::ZERO,
            Ok(success) => self.total_time / success,
            Err(_) => Duration::from_secs_f64(self.total_time.as_secs_f64() / self.success as f64),
        }
    }

    /// Approximate latency quantile of successful calls, for `q` between 0 and 1.
    pub fn percentile(&self, q: f64) -> Option<Duration> {
        let value = self.timings.quantile(q).ok().flatten()?;
        Some(Duration::from_secs_f64(value.max(0.0)))
    }

    /// Share of successful requests in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.success as f64 / self.total as f64 * 100.0
    }

    /// Requests per second over the wall-clock time of the run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total as f64 / secs
    }
}

impl fmt::Debug for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkResult")
            .field("total", &self.total)
            .field("success", &self.success)
            .field("failure", &self.failure)
            .field("total_time", &self.total_time)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Sends the plan `iterations` times, one request after another.
///
/// Failed requests are logged and counted, they never abort the run.
pub async fn run(executor: &Executor, plan: &ExecutionPlan, iterations: u64) -> BenchmarkResult {
    let style = ProgressStyle::with_template("{spinner} {msg} {pos}/{len} {elapsed}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new(iterations)
        .with_style(style)
        .with_message(format!("Running {} on {}:", plan.api_name, plan.nf));
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut result = BenchmarkResult::new();
    let start = Instant::now();

    for iteration in 1..=iterations {
        let (duration, outcome) = executor.call(plan).await;
        match outcome {
            Ok(()) => {
                tracing::debug!(iteration, ?duration, "request completed");
                result.record_success(duration);
            }
            Err(error) => {
                bar.suspend(|| {
                    tracing::warn!(
                        iteration,
                        ?duration,
                        error = &error as &dyn std::error::Error,
                        "request failed"
                    );
                });
                result.record_failure();
            }
        }
        bar.inc(1);
    }

    result.elapsed = start.elapsed();
    bar.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn statistics_cover_successful_calls() {
        let mut result = BenchmarkResult::new();
        result.record_success(ms(100));
        result.record_failure();
        result.record_success(ms(150));
        result.record_failure();
        result.record_success(ms(200));

        assert_eq!(result.total, 5);
        assert_eq!(result.success, 3);
        assert_eq!(result.failure, 2);
        assert_eq!(result.min, Some(ms(100)));
        assert_eq!(result.max, Some(ms(200)));
        assert_eq!(result.average(), ms(150));
        assert_eq!(result.success_rate(), 60.0);

        let p50 = result.percentile(0.5).unwrap();
        assert!(p50 >= ms(145) && p50 <= ms(155), "{p50:?}");
    }

    #[test]
    fn empty_result_is_zero() {
        let result = BenchmarkResult::new();
        assert_eq!(result.average(), Duration::ZERO);
        assert_eq!(result.min, None);
        assert_eq!(result.percentile(0.99), None);
        assert_eq!(result.success_rate(), 0.0);
        assert_eq!(result.throughput(), 0.0);
    }

    #[test]
    fn only_failures() {
        let mut result = BenchmarkResult::new();
        result.record_failure();
        result.record_failure();
        result.elapsed = Duration::from_secs(1);

        assert_eq!(result.average(), Duration::ZERO);
        assert_eq!(result.max, None);
        assert_eq!(result.throughput(), 2.0);
    }
}
