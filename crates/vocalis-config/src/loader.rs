use std::path::Path;

use crate::{Config, EngineBackend, MAX_ENGINE_CONCURRENCY, storage::is_valid_voice_id};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_storage()?;
        self.validate_engine()?;
        self.validate_transcoder()?;
        Ok(())
    }

    fn validate_storage(&self) -> anyhow::Result<()> {
        if !is_valid_voice_id(&self.storage.default_voice) {
            anyhow::bail!(
                "storage.default_voice `{}` is not a valid voice identifier",
                self.storage.default_voice
            );
        }

        Ok(())
    }

    fn validate_engine(&self) -> anyhow::Result<()> {
        if self.engine.max_concurrency == 0 {
            anyhow::bail!("engine.max_concurrency must be at least 1");
        }

        if self.engine.max_concurrency > MAX_ENGINE_CONCURRENCY {
            anyhow::bail!(
                "engine.max_concurrency must be at most {MAX_ENGINE_CONCURRENCY}, got {}",
                self.engine.max_concurrency
            );
        }

        if let EngineBackend::Command(ref command) = self.engine.backend {
            if command.program.trim().is_empty() {
                anyhow::bail!("engine.backend.program must not be empty");
            }

            if !command.args.iter().any(|arg| arg.contains("{output}")) {
                anyhow::bail!("engine.backend.args must pass the `{{output}}` placeholder to the engine");
            }
        }

        Ok(())
    }

    fn validate_transcoder(&self) -> anyhow::Result<()> {
        let transcoder = &self.transcoder;

        if transcoder.min_bitrate == 0 {
            anyhow::bail!("transcoder.min_bitrate must be greater than 0");
        }

        if transcoder.min_bitrate > transcoder.max_bitrate {
            anyhow::bail!("transcoder.min_bitrate must not exceed transcoder.max_bitrate");
        }

        if !transcoder.accepts_bitrate(transcoder.default_bitrate) {
            anyhow::bail!(
                "transcoder.default_bitrate {} is outside {}..={} kbps",
                transcoder.default_bitrate,
                transcoder.min_bitrate,
                transcoder.max_bitrate
            );
        }

        Ok(())
    }
}
