use std::{ffi::OsString, path::Path, process::Stdio};

use async_trait::async_trait;
use indexmap::IndexMap;
use vocalis_config::CommandEngineConfig;

use super::{EngineSettings, SynthesisEngine};
use crate::{
    error::{Result, SynthesisError},
    process::stderr_excerpt,
};

/// Engine that runs one inference subprocess per request
pub(crate) struct CommandEngine {
    program: String,
    args: Vec<String>,
    env: IndexMap<String, String>,
    settings: EngineSettings,
}

impl CommandEngine {
    pub fn new(config: &CommandEngineConfig, settings: EngineSettings) -> Result<Self> {
        settings.require_local_model()?;

        Ok(Self {
            program: config.program.clone(),
            args: config.args.clone(),
            env: config.env.clone(),
            settings,
        })
    }

    fn render_args(&self, reference: &Path, text: &str, output: &Path) -> Vec<OsString> {
        let lookup = |key: &str| -> Option<OsString> {
            let flag = |on: bool| OsString::from(if on { "true" } else { "false" });

            Some(match key {
                "reference" => reference.as_os_str().to_owned(),
                "text" => OsString::from(text),
                "output" => output.as_os_str().to_owned(),
                "checkpoint_dir" => self.settings.checkpoint_dir.as_os_str().to_owned(),
                "config_file" => self.settings.config_file.as_os_str().to_owned(),
                "use_fp16" => flag(self.settings.use_fp16),
                "use_cuda_kernel" => flag(self.settings.use_cuda_kernel),
                "use_deepspeed" => flag(self.settings.use_deepspeed),
                _ => return None,
            })
        };

        self.args.iter().map(|arg| render(arg, &lookup)).collect()
    }
}

/// Substitute `{name}` placeholders in a single pass
///
/// Substituted values are never rescanned, so text containing `{output}`
/// reaches the engine verbatim. Unknown placeholders are kept as written.
fn render(template: &str, lookup: impl Fn(&str) -> Option<OsString>) -> OsString {
    let mut rendered = OsString::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}').and_then(|close| lookup(&after[..close]).map(|value| (close, value))) {
            Some((close, value)) => {
                rendered.push(value);
                rest = &after[close + 1..];
            }
            None => {
                rendered.push("{");
                rest = after;
            }
        }
    }

    rendered.push(rest);
    rendered
}

#[async_trait]
impl SynthesisEngine for CommandEngine {
    async fn infer(&self, reference: &Path, text: &str, output: &Path) -> Result<()> {
        tracing::debug!(
            "engine command: program={}, reference={}, text_len={}",
            self.program,
            reference.display(),
            text.len(),
        );

        let result = tokio::process::Command::new(&self.program)
            .args(self.render_args(reference, text, output))
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SynthesisError::Inference(format!("failed to start engine `{}`: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = stderr_excerpt(&result.stderr);
            tracing::error!("engine `{}` exited with {}: {stderr}", self.program, result.status);

            return Err(SynthesisError::Inference(if stderr.is_empty() {
                format!("engine exited with {}", result.status)
            } else {
                stderr
            }));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
