use std::time::Instant;

use vocalis_telemetry::{
    Counter, Histogram, KeyValue,
    metrics::{
        SYNTHESIS_INFERENCE_DURATION, SYNTHESIS_REQUEST_COUNT, SYNTHESIS_REQUEST_DURATION,
        SYNTHESIS_TRANSCODE_DURATION, record_duration,
    },
};

use crate::{error::SynthesisError, types::AudioFormat};

/// Instruments recorded by the synthesizer
pub struct SynthesisMetrics {
    requests: Counter<u64>,
    request_duration: Histogram<f64>,
    inference_duration: Histogram<f64>,
    transcode_duration: Histogram<f64>,
}

impl SynthesisMetrics {
    pub fn new() -> Self {
        let meter = vocalis_telemetry::meter();

        Self {
            requests: meter
                .u64_counter(SYNTHESIS_REQUEST_COUNT)
                .with_description("Synthesis requests by format and outcome")
                .build(),
            request_duration: meter.f64_histogram(SYNTHESIS_REQUEST_DURATION).with_unit("s").build(),
            inference_duration: meter.f64_histogram(SYNTHESIS_INFERENCE_DURATION).with_unit("s").build(),
            transcode_duration: meter.f64_histogram(SYNTHESIS_TRANSCODE_DURATION).with_unit("s").build(),
        }
    }

    pub fn record_request<T>(&self, format: AudioFormat, result: &Result<T, SynthesisError>, start: Instant) {
        let outcome = match result {
            Ok(_) => "success",
            Err(e) => e.error_type(),
        };
        let attributes = [KeyValue::new("format", format.extension()), KeyValue::new("outcome", outcome)];

        self.requests.add(1, &attributes);
        record_duration(&self.request_duration, start, &attributes);
    }

    pub fn record_inference(&self, start: Instant) {
        record_duration(&self.inference_duration, start, &[]);
    }

    pub fn record_transcode(&self, start: Instant) {
        record_duration(&self.transcode_duration, start, &[]);
    }
}

impl Default for SynthesisMetrics {
    fn default() -> Self {
        Self::new()
    }
}
