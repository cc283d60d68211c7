//! ElevenLabs TTS client.

use super::probe::{CallArgs, EntryPoint, SpeechClient};
use super::result::{Chunk, SynthesisResult};
use super::types::{SpeechRequest, Voice};
use crate::config;
use crate::error::{BoxError, CallError};
use crate::transport::{Auth, HttpTransport};
use crate::{Error, Result};
use bytes::Bytes;
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info, warn};

/// Voice used when neither configuration nor the voice listing yields one.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

const STREAM_READ_SIZE: usize = 8 * 1024;

/// Client for the ElevenLabs text-to-speech API.
pub struct ElevenLabsClient {
    transport: HttpTransport,
    voice_id: Option<String>,
    model: String,
    output_format: String,
}

#[derive(Deserialize)]
struct VoiceListing {
    #[serde(default)]
    voices: Vec<Voice>,
}

impl ElevenLabsClient {
    pub fn builder() -> ElevenLabsClientBuilder {
        ElevenLabsClientBuilder::new()
    }

    /// Request for `text` with this client's voice, model and format.
    pub fn request(&self, text: &str) -> SpeechRequest {
        SpeechRequest::new(text)
            .voice(self.voice_id.as_deref().unwrap_or(DEFAULT_VOICE_ID))
            .model(self.model.clone())
            .output_format(self.output_format.clone())
    }

    /// Pick a voice: configured id, else the first listed voice, else the default.
    pub fn resolve_voice_id(&self) -> String {
        if let Some(id) = &self.voice_id {
            debug!(voice_id = %id, "using configured voice");
            return id.clone();
        }
        match self.list_voices() {
            Ok(voices) => {
                if let Some(first) = voices.into_iter().next() {
                    info!(
                        voice_id = %first.voice_id,
                        name = first.name.as_deref().unwrap_or("-"),
                        "auto-discovered voice"
                    );
                    return first.voice_id;
                }
            }
            Err(e) => warn!(error = %e, "voice listing failed"),
        }
        debug!(voice_id = DEFAULT_VOICE_ID, "using default voice");
        DEFAULT_VOICE_ID.to_string()
    }

    pub fn list_voices(&self) -> Result<Vec<Voice>> {
        let listing: VoiceListing = self.transport.get("/v1/voices", &[])?.json()?;
        Ok(listing.voices)
    }

    /// `text_to_speech.convert`: the whole clip in one response.
    pub fn convert(&self, request: &SpeechRequest) -> Result<SynthesisResult> {
        info!(voice_id = %request.voice, model_id = %request.model, "calling text_to_speech.convert");
        let bytes = self.post_speech(request, "")?.bytes()?;
        Ok(SynthesisResult::RawBytes(bytes))
    }

    /// Streaming variant: the body is handed back as a chunk stream.
    pub fn convert_stream(&self, request: &SpeechRequest) -> Result<SynthesisResult> {
        info!(voice_id = %request.voice, model_id = %request.model, "calling text_to_speech.stream");
        let response = self.post_speech(request, "/stream")?;
        Ok(SynthesisResult::ChunkStream(Box::new(BodyChunks {
            response,
            done: false,
        })))
    }

    fn post_speech(&self, request: &SpeechRequest, suffix: &str) -> Result<reqwest::blocking::Response> {
        let path = format!("/v1/text-to-speech/{}{}", request.voice, suffix);
        let body = serde_json::json!({
            "text": request.text,
            "model_id": request.model,
        });
        self.transport.post_json(
            &path,
            &[("output_format", request.output_format.as_str())],
            &body,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl SpeechClient for ElevenLabsClient {
    fn preferred(&self) -> Option<EntryPoint<'_>> {
        Some(Box::new(move |args: CallArgs<'_>| {
            let request = match args {
                CallArgs::Full(r) => r.clone(),
                CallArgs::TextOnly(text) => self.request(text),
            };
            self.convert(&request).map_err(CallError::from)
        }))
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint<'_>> {
        match name {
            "convert" => self.preferred(),
            "stream" => Some(Box::new(move |args: CallArgs<'_>| {
                let request = match args {
                    CallArgs::Full(r) => r.clone(),
                    CallArgs::TextOnly(text) => self.request(text),
                };
                self.convert_stream(&request).map_err(CallError::from)
            })),
            _ => None,
        }
    }
}

/// Reads a blocking response body in fixed-size pieces.
struct BodyChunks {
    response: reqwest::blocking::Response,
    done: bool,
}

impl Iterator for BodyChunks {
    type Item = std::result::Result<Chunk, BoxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0u8; STREAM_READ_SIZE];
        match self.response.read(&mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                buf.truncate(n);
                Some(Ok(Chunk::Bytes(Bytes::from(buf))))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

pub struct ElevenLabsClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    voice_id: Option<String>,
    model: Option<String>,
    output_format: Option<String>,
    timeout_secs: u64,
}

impl ElevenLabsClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            voice_id: None,
            model: None,
            output_format: None,
            timeout_secs: 60,
        }
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<ElevenLabsClient> {
        let api_key = self
            .api_key
            .or_else(|| config::lookup_api_key(config::ELEVENLABS))
            .ok_or_else(|| {
                Error::configuration("ELEVENLABS_API_KEY not set in environment (or ELEVEN_API_KEY)")
            })?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let transport = HttpTransport::new(
            &base_url,
            Auth::Header {
                name: "xi-api-key",
                value: api_key,
            },
            self.timeout_secs,
        )?;
        Ok(ElevenLabsClient {
            transport,
            voice_id: self.voice_id,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            output_format: self
                .output_format
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string()),
        })
    }
}

impl Default for ElevenLabsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
