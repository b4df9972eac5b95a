use std::path::PathBuf;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Synthesis engine configuration
///
/// The model settings here are handed to the engine as-is when it is
/// constructed. Nothing on disk is rewritten to apply them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Model checkpoint directory, consumed only at startup
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Model configuration file, defaults to `<checkpoint_dir>/config.yaml`
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    /// Run inference in half precision
    #[serde(default)]
    pub use_fp16: bool,
    /// Use the fused CUDA kernels
    #[serde(default)]
    pub use_cuda_kernel: bool,
    /// Use `DeepSpeed` acceleration
    #[serde(default)]
    pub use_deepspeed: bool,
    /// Number of engine calls allowed to run at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// How the engine is reached
    pub backend: EngineBackend,
}

impl EngineConfig {
    /// Model configuration file, resolved against the checkpoint directory
    pub fn config_file(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.checkpoint_dir.join("config.yaml"))
    }
}

/// Engine backends
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineBackend {
    /// One inference subprocess per request
    Command(CommandEngineConfig),
    /// Sidecar inference service reached over HTTP
    Http(HttpEngineConfig),
}

/// Subprocess engine configuration
///
/// `args` may contain the placeholders `{reference}`, `{text}`, `{output}`,
/// `{checkpoint_dir}`, `{config_file}`, `{use_fp16}`, `{use_cuda_kernel}`
/// and `{use_deepspeed}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEngineConfig {
    /// Program to execute
    pub program: String,
    /// Program arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

/// HTTP engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpEngineConfig {
    /// Inference endpoint
    pub url: Url,
    /// Bearer token sent with each request
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// Upper bound for `engine.max_concurrency`
pub const MAX_ENGINE_CONCURRENCY: usize = 1024;

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_concurrency() -> usize {
    1
}
