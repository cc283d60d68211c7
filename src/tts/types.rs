//! TTS (Text-to-Speech) types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "opus" | "ogg" => Some(Self::Opus),
            "aac" | "m4a" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            "wav" => Some(Self::Wav),
            "pcm" | "raw" => Some(Self::Pcm),
            _ => None,
        }
    }

    /// Format implied by the path's extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A written audio artifact. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    pub format: Option<AudioFormat>,
    pub bytes_written: u64,
}

impl AudioFile {
    pub(crate) fn new(path: &Path, bytes_written: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            format: AudioFormat::from_path(path),
            bytes_written,
        }
    }

    /// Describe a file some other party already wrote.
    pub(crate) fn inspect(path: &Path) -> std::io::Result<Self> {
        let len = std::fs::metadata(path)?.len();
        Ok(Self::new(path, len))
    }
}

/// Arguments of the most specific synthesis call shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub model: String,
    pub output_format: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: super::client::DEFAULT_VOICE_ID.to_string(),
            model: super::client::DEFAULT_MODEL_ID.to_string(),
            output_format: super::client::DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }

    /// Request shape used for probed (non-preferred) entry points.
    pub fn probing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: "Aria".to_string(),
            model: "eleven_turbo_v2".to_string(),
            output_format: "mp3_22050_32".to_string(),
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }
}

/// A voice entry from the provider's voice listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    #[serde(alias = "id", alias = "voiceId")]
    pub voice_id: String,
    #[serde(default, alias = "voice_name")]
    pub name: Option<String>,
}
