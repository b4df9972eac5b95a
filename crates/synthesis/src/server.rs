use std::{path::Path, sync::Arc, time::Instant};

use tokio::sync::Semaphore;
use vocalis_config::TranscoderConfig;

use crate::{
    audio,
    engine::{self, EngineSlot, SynthesisEngine},
    error::{Result, SynthesisError},
    metrics::SynthesisMetrics,
    scratch::{ScratchDir, ScratchSet},
    transcoder::{FfmpegTranscoder, Transcoder},
    types::{AudioFormat, SynthesisRequest, SynthesizedAudio},
    voice::{Voice, VoiceLibrary},
};

/// Runs synthesis requests against the shared engine
///
/// Engine calls are admitted through a semaphore sized by
/// `engine.max_concurrency`, so with the default of one permit requests
/// queue for the engine one at a time.
pub struct Synthesizer {
    engine: EngineSlot,
    permits: Semaphore,
    transcoder: Arc<dyn Transcoder>,
    voices: VoiceLibrary,
    scratch: ScratchDir,
    bitrates: TranscoderConfig,
    metrics: SynthesisMetrics,
}

/// A validated request
struct Job {
    text: String,
    voice: Voice,
    format: AudioFormat,
    bitrate: u32,
}

impl Synthesizer {
    /// Synthesize `request` and return audio in `format`
    ///
    /// Once the engine has been invoked the request runs to completion even
    /// if the caller goes away; scratch files are removed either way.
    pub async fn synthesize(self: &Arc<Self>, request: SynthesisRequest, format: AudioFormat) -> Result<SynthesizedAudio> {
        let started = Instant::now();
        let result = self.dispatch(request, format).await;
        self.metrics.record_request(format, &result, started);

        match &result {
            Ok(audio) => tracing::info!(
                token = %audio.token,
                %format,
                bytes = audio.bytes.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "synthesis complete"
            ),
            Err(e) if e.status_code().is_client_error() => tracing::debug!(%format, "rejected synthesis request: {e}"),
            Err(e) => tracing::error!(%format, "error during synthesis: {e}"),
        }

        result
    }

    async fn dispatch(self: &Arc<Self>, request: SynthesisRequest, format: AudioFormat) -> Result<SynthesizedAudio> {
        let engine = self.engine.ready()?;
        let job = self.plan(request, format)?;

        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(engine, job).await })
            .await
            .map_err(|e| SynthesisError::Internal(format!("synthesis task failed: {e}")))?
    }

    fn plan(&self, request: SynthesisRequest, format: AudioFormat) -> Result<Job> {
        if request.text.trim().is_empty() {
            return Err(SynthesisError::InvalidRequest("text must not be empty".to_string()));
        }

        let voice = self.voices.resolve(request.voice_id.as_deref())?;
        let bitrate = request.bitrate.unwrap_or(self.bitrates.default_bitrate);

        if format == AudioFormat::Opus && !self.bitrates.accepts_bitrate(bitrate) {
            return Err(SynthesisError::InvalidRequest(format!(
                "bitrate must be between {} and {} kbps, got {bitrate}",
                self.bitrates.min_bitrate, self.bitrates.max_bitrate
            )));
        }

        Ok(Job {
            text: request.text,
            voice,
            format,
            bitrate,
        })
    }

    async fn run(&self, engine: Arc<dyn SynthesisEngine>, job: Job) -> Result<SynthesizedAudio> {
        let ScratchSet {
            token,
            waveform,
            compressed,
        } = self.scratch.allocate().await?;

        tracing::debug!(%token, voice = %job.voice.id, format = %job.format, "synthesizing");

        {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| SynthesisError::Internal("engine queue closed".to_string()))?;

            let started = Instant::now();
            let outcome = engine.infer(&job.voice.reference, &job.text, waveform.path()).await;
            self.metrics.record_inference(started);
            outcome?;
        }

        if !tokio::fs::try_exists(waveform.path()).await.unwrap_or(false) {
            return Err(SynthesisError::Inference(format!(
                "engine `{}` reported success but wrote no audio",
                engine.name()
            )));
        }

        let bytes = match job.format {
            AudioFormat::Wav => {
                let bytes = read_output(waveform.path()).await?;
                waveform.discard();

                match audio::inspect(&bytes) {
                    Ok(info) => tracing::debug!(
                        %token,
                        sample_rate = info.sample_rate,
                        channels = info.channels,
                        duration_secs = info.duration_secs,
                        "waveform generated"
                    ),
                    Err(e) => tracing::debug!(%token, "waveform header unreadable: {e}"),
                }

                bytes
            }
            AudioFormat::Opus => {
                let started = Instant::now();
                let outcome = self
                    .transcoder
                    .transcode(waveform.path(), job.bitrate, compressed.path())
                    .await;
                self.metrics.record_transcode(started);
                outcome?;
                waveform.discard();

                let bytes = read_output(compressed.path()).await?;
                compressed.discard();
                bytes
            }
        };

        Ok(SynthesizedAudio {
            token,
            format: job.format,
            bytes,
        })
    }
}

async fn read_output(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SynthesisError::Io(format!("failed to read {}: {e}", path.display())))
}

/// Builder for constructing the synthesizer from configuration
///
/// The engine and transcoder come from configuration unless supplied here.
pub struct SynthesizerBuilder<'a> {
    config: &'a vocalis_config::Config,
    engine: Option<EngineSlot>,
    transcoder: Option<Arc<dyn Transcoder>>,
}

impl<'a> SynthesizerBuilder<'a> {
    pub const fn new(config: &'a vocalis_config::Config) -> Self {
        Self {
            config,
            engine: None,
            transcoder: None,
        }
    }

    /// Use an already constructed engine
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn SynthesisEngine>) -> Self {
        self.engine = Some(EngineSlot::Ready(engine));
        self
    }

    /// Use a custom transcoder instead of `ffmpeg`
    #[must_use]
    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    pub async fn build(self) -> Result<Synthesizer> {
        let config = self.config;

        let max_concurrency = config.engine.max_concurrency;
        if max_concurrency == 0 || max_concurrency > Semaphore::MAX_PERMITS {
            return Err(SynthesisError::Config(format!(
                "engine.max_concurrency must be between 1 and {}, got {max_concurrency}",
                Semaphore::MAX_PERMITS
            )));
        }

        let scratch = ScratchDir::prepare(&config.storage.output_dir)?;

        let engine = self.engine.unwrap_or_else(|| engine::initialize(&config.engine));

        let transcoder = match self.transcoder {
            Some(transcoder) => transcoder,
            None => {
                let ffmpeg = FfmpegTranscoder::new(&config.transcoder);
                if !ffmpeg.probe().await {
                    tracing::warn!(
                        "transcoder `{}` could not be run; opus requests will fail",
                        config.transcoder.program
                    );
                }
                Arc::new(ffmpeg)
            }
        };

        tracing::debug!(
            output_dir = %scratch.path().display(),
            voice_dir = %config.storage.voice_dir.display(),
            max_concurrency = config.engine.max_concurrency,
            "synthesizer initialized"
        );

        Ok(Synthesizer {
            engine,
            permits: Semaphore::new(max_concurrency),
            transcoder,
            voices: VoiceLibrary::new(&config.storage),
            scratch,
            bitrates: config.transcoder.clone(),
            metrics: SynthesisMetrics::new(),
        })
    }
}
