use std::fmt;

use axum::response::{IntoResponse, Response};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the request token on binary responses
pub const SYNTHESIS_ID_HEADER: &str = "x-synthesis-id";

/// Speech synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesisRequest {
    /// Utterance to synthesize
    pub text: String,
    /// Reference voice, defaults to the configured default voice
    #[serde(default)]
    pub voice_id: Option<String>,
    /// Opus bitrate in kbps, ignored for waveform output
    #[serde(default)]
    pub bitrate: Option<u32>,
}

/// Output formats the service can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// Uncompressed waveform straight from the engine
    Wav,
    /// Opus, produced by the transcoder
    Opus,
}

impl AudioFormat {
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Opus => "opus",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Audio produced for one request
#[derive(Debug)]
pub struct SynthesizedAudio {
    /// Request token
    pub token: Uuid,
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
}

impl SynthesizedAudio {
    /// Raw bytes as a file download
    pub fn into_attachment(self) -> Response {
        let headers = [
            (http::header::CONTENT_TYPE.as_str(), self.format.content_type().to_string()),
            (
                http::header::CONTENT_DISPOSITION.as_str(),
                format!("attachment; filename=\"speech.{}\"", self.format.extension()),
            ),
            (SYNTHESIS_ID_HEADER, self.token.to_string()),
        ];

        (headers, self.bytes).into_response()
    }

    /// Bytes wrapped in a base64 JSON envelope
    pub fn into_encoded(self) -> EncodedAudio {
        EncodedAudio::encode(&self.bytes)
    }
}

/// JSON envelope for base64-encoded audio
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodedAudio {
    /// Standard base64 with padding
    pub data: String,
    /// Length of the raw audio in bytes
    pub length: usize,
}

impl EncodedAudio {
    pub fn encode(bytes: &[u8]) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            length: bytes.len(),
        }
    }

    /// Recover the raw audio bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}
