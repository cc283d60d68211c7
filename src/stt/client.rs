//! STT (Speech-to-Text) client.

use super::types::{SttOptions, Transcription};
use crate::config;
use crate::transport::{Auth, HttpTransport};
use crate::{Error, ErrorContext, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::path::Path;
use tracing::info;

/// Client for speech-to-text transcription.
pub struct SttClient {
    transport: HttpTransport,
    model: String,
    endpoint_path: String,
}

impl SttClient {
    pub fn builder() -> SttClientBuilder {
        SttClientBuilder::new()
    }

    pub fn transcribe(&self, audio: &[u8], file_name: &str, options: &SttOptions) -> Result<Transcription> {
        let mime = mime_for(file_name);
        let part = Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| Error::configuration(format!("Invalid mime: {}", e)))?;
        let mut form = Form::new().part("file", part).text("model", self.model.clone());
        if let Some(lang) = &options.language {
            form = form.text("language", lang.clone());
        }
        if let Some(prompt) = &options.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(temp) = options.temperature {
            form = form.text("temperature", temp.to_string());
        }
        if let Some(rf) = &options.response_format {
            form = form.text("response_format", rf.clone());
        }

        info!(model = %self.model, file = file_name, bytes = audio.len(), "transcribing audio");
        let body = self.transport.post_multipart(&self.endpoint_path, form)?.text()?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        Ok(Transcription {
            text,
            language: json.get("language").and_then(|v| v.as_str()).map(String::from),
            confidence: None,
            segments: None,
        })
    }

    /// Transcribe a recording on disk.
    pub fn transcribe_file(&self, path: &Path, options: &SttOptions) -> Result<Transcription> {
        let audio = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3");
        self.transcribe(&audio, file_name, options)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "opus" => "audio/ogg",
        "m4a" => "audio/mp4",
        "webm" => "audio/webm",
        _ => "audio/mpeg",
    }
}

pub struct SttClientBuilder {
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    endpoint_path: Option<String>,
    timeout_secs: u64,
}

impl SttClientBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            endpoint_path: None,
            timeout_secs: 60,
        }
    }
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = Some(path.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<SttClient> {
        let model = self
            .model
            .ok_or_else(|| Error::configuration("Model must be specified"))?;
        let api_key = self
            .api_key
            .or_else(|| config::lookup_api_key(config::GROQ))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new().with_field_path("GROQ_API_KEY").with_source("stt"),
                )
            })?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.groq.com/openai".to_string());
        let endpoint_path = self
            .endpoint_path
            .unwrap_or_else(|| "/v1/audio/transcriptions".to_string());
        let endpoint_path = if endpoint_path.starts_with('/') {
            endpoint_path
        } else {
            format!("/{}", endpoint_path)
        };
        Ok(SttClient {
            transport: HttpTransport::new(&base_url, Auth::Bearer(api_key), self.timeout_secs)?,
            model,
            endpoint_path,
        })
    }
}

impl Default for SttClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("clip.WAV"), "audio/wav");
        assert_eq!(mime_for("clip.mp3"), "audio/mpeg");
        assert_eq!(mime_for("clip"), "audio/mpeg");
    }

    #[test]
    fn transcribes_multipart_upload() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/v1/audio/transcriptions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::Regex("whisper-large-v3".into()))
            .with_status(200)
            .with_body(r#"{"text":"my skin itches","language":"en"}"#)
            .create();

        let client = SttClient::builder()
            .model("whisper-large-v3")
            .api_key("test-key")
            .base_url(server.url())
            .build()
            .unwrap();
        let t = client
            .transcribe(b"ID3fake", "patient.mp3", &SttOptions::default())
            .unwrap();
        assert_eq!(t.text, "my skin itches");
        assert_eq!(t.language.as_deref(), Some("en"));
        m.assert();
    }

    #[test]
    fn model_is_required() {
        let err = SttClient::builder().api_key("k").build().err().unwrap();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
