use std::path::PathBuf;

use vocalis_config::{StorageConfig, is_valid_voice_id};

use crate::error::{Result, SynthesisError};

/// A resolved reference voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    /// Reference sample handed to the engine
    pub reference: PathBuf,
}

/// Maps voice identifiers to reference samples in the voice directory
///
/// Existence is not checked here: a missing sample surfaces as an engine failure.
#[derive(Debug, Clone)]
pub struct VoiceLibrary {
    dir: PathBuf,
    default_voice: String,
}

impl VoiceLibrary {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: config.voice_dir.clone(),
            default_voice: config.default_voice.clone(),
        }
    }

    /// Resolve `voice_id`, or the default voice when absent
    pub fn resolve(&self, voice_id: Option<&str>) -> Result<Voice> {
        let id = voice_id.unwrap_or(&self.default_voice);

        if !is_valid_voice_id(id) {
            return Err(SynthesisError::InvalidRequest(format!(
                "voice_id `{id}` may only contain letters, digits, '_', '-' and '.'"
            )));
        }

        Ok(Voice {
            id: id.to_string(),
            reference: self.dir.join(format!("{id}.wav")),
        })
    }
}
