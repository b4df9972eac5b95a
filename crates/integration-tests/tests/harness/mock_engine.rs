//! Mock inference sidecar for the HTTP engine backend
//!
//! Answers every request with a short WAV tone unless told to fail.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::workspace::sine_wav;

/// Sample rate of the audio the mock returns
pub const MOCK_SAMPLE_RATE: u32 = 22_050;

/// Mock sidecar that records what it was asked to synthesize
pub struct MockEngine {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockEngineState>,
}

struct MockEngineState {
    request_count: AtomicU32,
    failure: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// One request as seen by the sidecar
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub text: String,
    pub reference_audio: Vec<u8>,
    pub use_fp16: bool,
    pub use_cuda_kernel: bool,
    pub use_deepspeed: bool,
    pub authorization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InferRequest {
    text: String,
    reference_audio: String,
    use_fp16: bool,
    use_cuda_kernel: bool,
    use_deepspeed: bool,
}

impl MockEngine {
    /// Start the mock sidecar, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a sidecar that answers every request with 500 and `message`
    pub async fn start_failing(message: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some(message.to_owned())).await
    }

    async fn start_inner(failure: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockEngineState {
            request_count: AtomicU32::new(0),
            failure,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/infer", routing::post(handle_infer))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Inference endpoint URL for configuring the HTTP backend
    pub fn url(&self) -> String {
        format!("http://{}/infer", self.addr)
    }

    /// Number of inference requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_infer(
    State(state): State<Arc<MockEngineState>>,
    headers: HeaderMap,
    Json(request): Json<InferRequest>,
) -> impl IntoResponse {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let Ok(reference_audio) = STANDARD.decode(&request.reference_audio) else {
        return (StatusCode::BAD_REQUEST, "reference_audio is not base64").into_response();
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        text: request.text,
        reference_audio,
        use_fp16: request.use_fp16,
        use_cuda_kernel: request.use_cuda_kernel,
        use_deepspeed: request.use_deepspeed,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
    });

    if let Some(message) = &state.failure {
        return (StatusCode::INTERNAL_SERVER_ERROR, message.clone()).into_response();
    }

    ([(header::CONTENT_TYPE, "audio/wav")], sine_wav(MOCK_SAMPLE_RATE, 0.1)).into_response()
}
