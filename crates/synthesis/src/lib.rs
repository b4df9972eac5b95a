#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod audio;
mod engine;
mod error;
mod http_client;
mod metrics;
mod process;
mod request;
mod scratch;
mod server;
mod transcoder;
mod types;
mod voice;

use std::sync::Arc;

use axum::{Json, Router, extract::State, response::Response, routing::post};

pub use engine::{EngineSettings, SynthesisEngine};
pub use error::{Result, SynthesisError};
pub use server::{Synthesizer, SynthesizerBuilder};
pub use transcoder::{FfmpegTranscoder, Transcoder};
pub use types::{AudioFormat, EncodedAudio, SYNTHESIS_ID_HEADER, SynthesisRequest, SynthesizedAudio};
use request::ExtractPayload;

/// Build the synthesizer from configuration
pub async fn build_server(config: &vocalis_config::Config) -> anyhow::Result<Arc<Synthesizer>> {
    let synthesizer = SynthesizerBuilder::new(config)
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize synthesizer: {e}"))?;

    Ok(Arc::new(synthesizer))
}

/// Create the endpoint router for synthesis
pub fn endpoint_router() -> Router<Arc<Synthesizer>> {
    Router::new()
        .route("/generate-opus", post(generate_opus))
        .route("/generate-wav", post(generate_wav))
        .route("/generate-opus-json", post(generate_opus_json))
        .route("/generate-wav-json", post(generate_wav_json))
}

async fn generate_opus(
    State(synthesizer): State<Arc<Synthesizer>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Response> {
    let audio = synthesizer.synthesize(request, AudioFormat::Opus).await?;
    Ok(audio.into_attachment())
}

async fn generate_wav(
    State(synthesizer): State<Arc<Synthesizer>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Response> {
    let audio = synthesizer.synthesize(request, AudioFormat::Wav).await?;
    Ok(audio.into_attachment())
}

async fn generate_opus_json(
    State(synthesizer): State<Arc<Synthesizer>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Json<EncodedAudio>> {
    let audio = synthesizer.synthesize(request, AudioFormat::Opus).await?;
    Ok(Json(audio.into_encoded()))
}

async fn generate_wav_json(
    State(synthesizer): State<Arc<Synthesizer>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Json<EncodedAudio>> {
    let audio = synthesizer.synthesize(request, AudioFormat::Wav).await?;
    Ok(Json(audio.into_encoded()))
}
