#![allow(clippy::must_use_candidate)]

pub mod engine;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod transcoder;

use serde::Deserialize;

pub use engine::*;
pub use health::*;
pub use server::*;
pub use storage::*;
pub use telemetry::TelemetryConfig;
pub use transcoder::*;

/// Top-level Vocalis configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Scratch output and voice sample locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Synthesis engine configuration
    pub engine: EngineConfig,
    /// Opus transcoder configuration
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
