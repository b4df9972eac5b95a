//! In-process stand-ins for the synthesis engine and the transcoder

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use synthesis::{SynthesisEngine, SynthesisError, Transcoder};

use super::workspace::sine_wav;

/// Sample rate of the audio produced by [`FakeEngine`]
pub const FAKE_SAMPLE_RATE: u32 = 16_000;

/// Engine that speaks a short sine tone for every request
///
/// Like a real engine it fails when the reference sample is missing.
#[derive(Default)]
pub struct FakeEngine {
    calls: AtomicU32,
    failure: Option<String>,
    texts: Mutex<Vec<String>>,
    references: Mutex<Vec<PathBuf>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that writes partial output and then fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn references(&self) -> Vec<PathBuf> {
        self.references.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisEngine for FakeEngine {
    async fn infer(&self, reference: &Path, text: &str, output: &Path) -> synthesis::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_owned());
        self.references.lock().unwrap().push(reference.to_owned());

        if !reference.exists() {
            return Err(SynthesisError::Inference(format!(
                "reference audio {} not found",
                reference.display()
            )));
        }

        if let Some(message) = &self.failure {
            tokio::fs::write(output, b"RIFF").await.unwrap();
            return Err(SynthesisError::Inference(message.clone()));
        }

        tokio::fs::write(output, sine_wav(FAKE_SAMPLE_RATE, 0.1)).await.unwrap();
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Marker prepended by [`RecordingTranscoder`] so tests can tell its output apart
pub const OPUS_MARKER: &[u8] = b"OggS";

/// Transcoder that records requested bitrates and wraps the input unchanged
#[derive(Default)]
pub struct RecordingTranscoder {
    bitrates: Mutex<Vec<u32>>,
    fail: bool,
}

impl RecordingTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcoder that leaves partial output behind and then fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn bitrates(&self) -> Vec<u32> {
        self.bitrates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn transcode(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> synthesis::Result<()> {
        self.bitrates.lock().unwrap().push(bitrate_kbps);

        if self.fail {
            tokio::fs::write(output, OPUS_MARKER).await.unwrap();
            return Err(SynthesisError::Transcode("Invalid argument".to_owned()));
        }

        let waveform = tokio::fs::read(input).await.unwrap();
        let mut encoded = OPUS_MARKER.to_vec();
        encoded.extend_from_slice(&waveform);
        tokio::fs::write(output, encoded).await.unwrap();
        Ok(())
    }
}
