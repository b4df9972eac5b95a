//! Test server wrapper that starts Vocalis on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use synthesis::{SynthesisEngine, SynthesizerBuilder, Transcoder};
use vocalis_config::Config;
use vocalis_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the engine and transcoder named in `config`
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config).await?;
        Self::spawn(server).await
    }

    /// Start a test server with in-process engine and transcoder
    pub async fn start_with(
        config: Config,
        engine: Arc<dyn SynthesisEngine>,
        transcoder: Arc<dyn Transcoder>,
    ) -> anyhow::Result<Self> {
        let synthesizer = SynthesizerBuilder::new(&config)
            .with_engine(engine)
            .with_transcoder(transcoder)
            .build()
            .await?;

        Self::spawn(Server::with_synthesizer(&config, Arc::new(synthesizer))).await
    }

    /// Start a test server with a real engine backend and an in-process transcoder
    pub async fn start_with_transcoder(config: Config, transcoder: Arc<dyn Transcoder>) -> anyhow::Result<Self> {
        let synthesizer = SynthesizerBuilder::new(&config)
            .with_transcoder(transcoder)
            .build()
            .await?;

        Self::spawn(Server::with_synthesizer(&config, Arc::new(synthesizer))).await
    }

    async fn spawn(server: Server) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a JSON body to `path`
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(body).send().await.unwrap()
    }

    /// Server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
