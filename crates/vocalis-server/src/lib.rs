mod docs;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use synthesis::Synthesizer;
use tower_http::trace::TraceLayer;
use vocalis_config::Config;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be prepared
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let synthesizer = synthesis::build_server(&config).await?;
        Ok(Self::with_synthesizer(&config, synthesizer))
    }

    /// Build the server around an existing synthesizer
    pub fn with_synthesizer(config: &Config, synthesizer: Arc<Synthesizer>) -> Self {
        let mut app = Router::new().route("/", get(docs::index_handler));

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health::health_handler));
        }

        app = app.merge(synthesis::endpoint_router().with_state(synthesizer));
        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address: config.server.listen_address(),
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
