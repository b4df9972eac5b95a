//! Metric names and recording helpers

use std::time::Instant;

use opentelemetry::metrics::Histogram;

/// Instrumentation scope for all Vocalis metrics
pub const METER_NAME: &str = "vocalis";

/// Record the time elapsed since `start` on a histogram, in seconds
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[opentelemetry::KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}

// Synthesis metric names
pub const SYNTHESIS_REQUEST_COUNT: &str = "synthesis.request.count";
pub const SYNTHESIS_REQUEST_DURATION: &str = "synthesis.request.duration";
pub const SYNTHESIS_INFERENCE_DURATION: &str = "synthesis.inference.duration";
pub const SYNTHESIS_TRANSCODE_DURATION: &str = "synthesis.transcode.duration";
