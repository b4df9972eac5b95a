pub mod command;
pub mod http;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use vocalis_config::{EngineBackend, EngineConfig};

use crate::error::{Result, SynthesisError};

/// Speech synthesis engine
///
/// Implementations write a waveform for `text`, spoken in the voice of the
/// `reference` sample, to `output`.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    async fn infer(&self, reference: &Path, text: &str, output: &Path) -> Result<()>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Model settings handed to an engine when it is constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub checkpoint_dir: PathBuf,
    pub config_file: PathBuf,
    pub use_fp16: bool,
    pub use_cuda_kernel: bool,
    pub use_deepspeed: bool,
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            checkpoint_dir: config.checkpoint_dir.clone(),
            config_file: config.config_file(),
            use_fp16: config.use_fp16,
            use_cuda_kernel: config.use_cuda_kernel,
            use_deepspeed: config.use_deepspeed,
        }
    }

    /// Ensure the checkpoint directory and model configuration are present
    pub fn require_local_model(&self) -> Result<()> {
        if !self.checkpoint_dir.is_dir() {
            return Err(SynthesisError::Config(format!(
                "checkpoint directory {} does not exist",
                self.checkpoint_dir.display()
            )));
        }

        if !self.config_file.is_file() {
            return Err(SynthesisError::Config(format!(
                "model configuration {} does not exist",
                self.config_file.display()
            )));
        }

        Ok(())
    }
}

/// Engine as seen by request handlers
#[derive(Clone)]
pub enum EngineSlot {
    Ready(Arc<dyn SynthesisEngine>),
    /// Initialization failed; every request is refused with this reason
    Unavailable(Arc<str>),
}

impl EngineSlot {
    pub fn ready(&self) -> Result<Arc<dyn SynthesisEngine>> {
        match self {
            Self::Ready(engine) => Ok(Arc::clone(engine)),
            Self::Unavailable(reason) => Err(SynthesisError::EngineUnavailable(reason.to_string())),
        }
    }
}

/// Construct the configured engine
///
/// Failure is logged and recorded in the slot rather than returned, so the
/// server still starts and answers synthesis requests with an unavailability error.
pub fn initialize(config: &EngineConfig) -> EngineSlot {
    tracing::info!(checkpoint_dir = %config.checkpoint_dir.display(), "loading synthesis engine");

    match connect(config) {
        Ok(engine) => {
            tracing::info!(engine = engine.name(), "synthesis engine loaded");
            EngineSlot::Ready(engine)
        }
        Err(e) => {
            tracing::error!("error loading synthesis engine: {e}");
            EngineSlot::Unavailable(Arc::from(e.to_string()))
        }
    }
}

fn connect(config: &EngineConfig) -> Result<Arc<dyn SynthesisEngine>> {
    let settings = EngineSettings::from_config(config);

    let engine: Arc<dyn SynthesisEngine> = match &config.backend {
        EngineBackend::Command(command) => Arc::new(command::CommandEngine::new(command, settings)?),
        EngineBackend::Http(http) => Arc::new(http::HttpEngine::new(http, settings)?),
    };

    Ok(engine)
}
