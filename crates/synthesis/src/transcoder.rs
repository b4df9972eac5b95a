use std::{ffi::OsString, path::Path, process::Stdio};

use async_trait::async_trait;
use vocalis_config::TranscoderConfig;

use crate::{
    error::{Result, SynthesisError},
    process::stderr_excerpt,
};

/// Converts a waveform file into compressed audio
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> Result<()>;
}

/// Transcoder backed by an `ffmpeg` executable
pub struct FfmpegTranscoder {
    program: String,
    codec: String,
}

impl FfmpegTranscoder {
    pub fn new(config: &TranscoderConfig) -> Self {
        Self {
            program: config.program.clone(),
            codec: config.codec.clone(),
        }
    }

    fn arguments(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();

        args.push(input.into());
        args.extend(["-c:a", self.codec.as_str(), "-b:a"].map(OsString::from));
        args.push(format!("{bitrate_kbps}k").into());
        args.push(output.into());
        args
    }

    /// Check that the executable can be run
    pub async fn probe(&self) -> bool {
        tokio::process::Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, bitrate_kbps: u32, output: &Path) -> Result<()> {
        tracing::debug!("transcoding {} to {} at {bitrate_kbps}k", input.display(), self.codec);

        let result = tokio::process::Command::new(&self.program)
            .args(self.arguments(input, bitrate_kbps, output))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SynthesisError::Transcode(format!("failed to run `{}`: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = stderr_excerpt(&result.stderr);
            tracing::error!("`{}` exited with {}: {stderr}", self.program, result.status);
            return Err(SynthesisError::Transcode(format!("`{}` exited with {}: {stderr}", self.program, result.status)));
        }

        Ok(())
    }
}
