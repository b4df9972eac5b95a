use std::path::Path;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;
use vocalis_config::HttpEngineConfig;

use super::{EngineSettings, SynthesisEngine};
use crate::{
    error::{Result, SynthesisError},
    http_client::http_client,
};

/// Engine served by a sidecar inference process over HTTP
///
/// The reference sample travels in the request body, so the sidecar does not
/// need to share a filesystem with this server.
pub(crate) struct HttpEngine {
    client: Client,
    url: Url,
    api_key: Option<SecretString>,
    settings: EngineSettings,
}

impl HttpEngine {
    pub fn new(config: &HttpEngineConfig, settings: EngineSettings) -> Result<Self> {
        if !matches!(config.url.scheme(), "http" | "https") {
            return Err(SynthesisError::Config(format!(
                "engine url must use http or https, got `{}`",
                config.url.scheme()
            )));
        }

        let client =
            http_client().map_err(|e| SynthesisError::Config(format!("failed to build engine HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            settings,
        })
    }
}

#[derive(Serialize)]
struct InferRequest<'a> {
    text: &'a str,
    /// Base64 of the reference WAV
    reference_audio: String,
    use_fp16: bool,
    use_cuda_kernel: bool,
    use_deepspeed: bool,
}

#[async_trait]
impl SynthesisEngine for HttpEngine {
    async fn infer(&self, reference: &Path, text: &str, output: &Path) -> Result<()> {
        let reference_audio = tokio::fs::read(reference).await.map_err(|e| {
            SynthesisError::Inference(format!("failed to read reference audio {}: {e}", reference.display()))
        })?;

        tracing::debug!(
            "engine request: url={}, reference={}, text_len={}",
            self.url,
            reference.display(),
            text.len(),
        );

        let body = InferRequest {
            text,
            reference_audio: STANDARD.encode(&reference_audio),
            use_fp16: self.settings.use_fp16,
            use_cuda_kernel: self.settings.use_cuda_kernel,
            use_deepspeed: self.settings.use_deepspeed,
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("engine request failed: {e}");
            SynthesisError::Inference(format!("failed to reach engine at {}: {e}", self.url))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("engine error ({status}): {error_text}");
            return Err(SynthesisError::Inference(failure_detail(status, &error_text)));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Inference(format!("failed to read engine response: {e}")))?;

        tokio::fs::write(output, &audio)
            .await
            .map_err(|e| SynthesisError::Io(format!("failed to write {}: {e}", output.display())))?;

        tracing::debug!("engine response written, {} bytes", audio.len());

        Ok(())
    }

    fn name(&self) -> &str {
        self.url.as_str()
    }
}

/// Error message for a non-2xx engine response
fn failure_detail(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    if body.is_empty() {
        format!("engine returned {status}")
    } else {
        body.to_string()
    }
}
