use std::path::PathBuf;

use serde::Deserialize;

/// Longest accepted voice identifier
pub const MAX_VOICE_ID_LEN: usize = 128;

/// Filesystem locations used while serving requests
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding per-request scratch files, created at startup
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory holding one `<voice_id>.wav` reference sample per voice
    #[serde(default = "default_voice_dir")]
    pub voice_dir: PathBuf,
    /// Voice used when a request does not name one
    #[serde(default = "default_voice")]
    pub default_voice: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            voice_dir: default_voice_dir(),
            default_voice: default_voice(),
        }
    }
}

/// Whether `voice_id` can be used as a file stem inside the voice directory
///
/// Accepts ASCII letters, digits, `_`, `-` and `.`, but never a leading `.`,
/// so an identifier cannot climb out of the voice directory or name a hidden file.
pub fn is_valid_voice_id(voice_id: &str) -> bool {
    !voice_id.is_empty()
        && voice_id.len() <= MAX_VOICE_ID_LEN
        && !voice_id.starts_with('.')
        && voice_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_voice_dir() -> PathBuf {
    PathBuf::from("voices")
}

fn default_voice() -> String {
    "default".to_string()
}
