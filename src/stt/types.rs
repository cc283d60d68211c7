//! STT (Speech-to-Text) types.

use serde::{Deserialize, Serialize};

/// Transcription result from STT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TranscriptionSegment>>,
}

impl Transcription {
    /// True when nothing intelligible was said.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A segment of transcribed text with timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub start: f32,
    pub end: f32,
    pub text: String,
}

/// Options for STT transcription.
#[derive(Debug, Clone, Default)]
pub struct SttOptions {
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
    pub response_format: Option<String>,
}

impl SttOptions {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn said(text: &str) -> Transcription {
        Transcription {
            text: text.into(),
            language: None,
            confidence: None,
            segments: None,
        }
    }

    #[test]
    fn whitespace_only_transcript_is_blank() {
        assert!(said("").is_blank());
        assert!(said(" \n\t ").is_blank());
        assert!(!said(" It hurts here. ").is_blank());
    }

    #[test]
    fn deserializes_whisper_json() {
        let t: Transcription = serde_json::from_str(r#"{"text":"  "}"#).unwrap();
        assert!(t.is_blank());
        assert!(t.segments.is_none());
    }
}
