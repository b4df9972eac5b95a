use serde::Deserialize;

/// Opus transcoder configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscoderConfig {
    /// Transcoder executable
    #[serde(default = "default_program")]
    pub program: String,
    /// Audio codec passed to the transcoder
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Bitrate in kbps used when a request does not set one
    #[serde(default = "default_bitrate")]
    pub default_bitrate: u32,
    /// Lowest accepted bitrate in kbps
    #[serde(default = "default_min_bitrate")]
    pub min_bitrate: u32,
    /// Highest accepted bitrate in kbps
    #[serde(default = "default_max_bitrate")]
    pub max_bitrate: u32,
}

impl TranscoderConfig {
    /// Whether `bitrate` (kbps) falls inside the accepted range
    pub const fn accepts_bitrate(&self, bitrate: u32) -> bool {
        bitrate >= self.min_bitrate && bitrate <= self.max_bitrate
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            codec: default_codec(),
            default_bitrate: default_bitrate(),
            min_bitrate: default_min_bitrate(),
            max_bitrate: default_max_bitrate(),
        }
    }
}

fn default_program() -> String {
    "ffmpeg".to_string()
}

fn default_codec() -> String {
    "libopus".to_string()
}

const fn default_bitrate() -> u32 {
    128
}

// libopus accepts 6 to 510 kbps
const fn default_min_bitrate() -> u32 {
    6
}

const fn default_max_bitrate() -> u32 {
    510
}
