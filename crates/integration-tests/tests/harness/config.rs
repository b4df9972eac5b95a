//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use indexmap::IndexMap;
use secrecy::SecretString;
use vocalis_config::{
    CommandEngineConfig, Config, EngineBackend, EngineConfig, HealthConfig, HttpEngineConfig, ServerConfig,
    StorageConfig, TranscoderConfig,
};

use super::workspace::{DEFAULT_VOICE, TestWorkspace};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder rooted in `workspace`
    ///
    /// The engine is a command backend whose checkpoints do not exist, so it
    /// only becomes usable once the workspace gets checkpoints or a fake
    /// engine is supplied.
    pub fn new(workspace: &TestWorkspace) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                storage: StorageConfig {
                    output_dir: workspace.output_dir(),
                    voice_dir: workspace.voice_dir(),
                    default_voice: DEFAULT_VOICE.to_owned(),
                },
                engine: EngineConfig {
                    checkpoint_dir: workspace.checkpoint_dir(),
                    config_file: None,
                    use_fp16: false,
                    use_cuda_kernel: false,
                    use_deepspeed: false,
                    max_concurrency: 1,
                    backend: EngineBackend::Command(CommandEngineConfig {
                        program: "indextts-infer".to_owned(),
                        args: vec!["{output}".to_owned()],
                        env: IndexMap::new(),
                    }),
                },
                transcoder: TranscoderConfig {
                    program: workspace.root().join("missing-ffmpeg").display().to_string(),
                    ..TranscoderConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Run the engine as a subprocess
    pub fn with_command_engine(mut self, program: &str, args: &[&str]) -> Self {
        self.config.engine.backend = EngineBackend::Command(CommandEngineConfig {
            program: program.to_owned(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            env: IndexMap::new(),
        });
        self
    }

    /// Reach the engine through an inference sidecar
    pub fn with_http_engine(mut self, url: &str, api_key: Option<&str>) -> Self {
        self.config.engine.backend = EngineBackend::Http(HttpEngineConfig {
            url: url.parse().expect("valid URL"),
            api_key: api_key.map(SecretString::from),
        });
        self
    }

    /// Set model flags forwarded to the engine
    pub fn with_model_flags(mut self, use_fp16: bool, use_cuda_kernel: bool, use_deepspeed: bool) -> Self {
        self.config.engine.use_fp16 = use_fp16;
        self.config.engine.use_cuda_kernel = use_cuda_kernel;
        self.config.engine.use_deepspeed = use_deepspeed;
        self
    }

    /// Allow `n` engine calls at once
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.config.engine.max_concurrency = n;
        self
    }

    /// Narrow the accepted Opus bitrates
    pub fn with_bitrates(mut self, min: u32, default: u32, max: u32) -> Self {
        self.config.transcoder.min_bitrate = min;
        self.config.transcoder.default_bitrate = default;
        self.config.transcoder.max_bitrate = max;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
