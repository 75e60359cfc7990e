//! Timing measurements.
//!
//! The parse pipeline reports how long each parse took to an optional [`MetricsSink`]. Having no
//! sink installed is normal.

use std::sync::Mutex;
use std::time::Duration;

/// Category reported for parse timings.
pub const TIMING_CATEGORY: &str = "language tools";
/// Operation reported for parse timings.
pub const TIMING_PARSE: &str = "parse";

pub trait MetricsSink: Send + Sync {
    fn log_timing(&self, category: &str, operation: &str, elapsed: Duration, content_type: &str);
}

/// Sink that emits each timing as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn log_timing(&self, category: &str, operation: &str, elapsed: Duration, content_type: &str) {
        tracing::debug!(
            category,
            operation,
            content_type,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "timing"
        );
    }
}

/// One recorded timing.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub category: String,
    pub operation: String,
    pub elapsed: Duration,
    pub content_type: String,
}

/// Sink that keeps every timing in memory.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    timings: Mutex<Vec<Timing>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the timings recorded so far.
    pub fn timings(&self) -> Vec<Timing> {
        match self.timings.lock() {
            Ok(timings) => timings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MetricsSink for RecordingMetrics {
    fn log_timing(&self, category: &str, operation: &str, elapsed: Duration, content_type: &str) {
        let timing = Timing {
            category: category.to_string(),
            operation: operation.to_string(),
            elapsed,
            content_type: content_type.to_string(),
        };
        match self.timings.lock() {
            Ok(mut timings) => timings.push(timing),
            Err(poisoned) => poisoned.into_inner().push(timing),
        }
    }
}
