//! Keyless fallback TTS through the Google Translate speech endpoint.
//!
//! The client has no `convert` call; its only entry point is `speak`, which
//! returns a [`FileSaver`] that fetches the audio when asked to persist it.

use super::probe::{CallArgs, EntryPoint, SpeechClient};
use super::result::{FileSaver, OpaqueValue, SynthesisResult};
use crate::error::CallError;
use crate::transport::{Auth, HttpTransport};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://translate.google.com";

/// The endpoint rejects longer inputs.
const MAX_PART_CHARS: usize = 100;

pub struct GttsClient {
    transport: Arc<HttpTransport>,
    lang: String,
    slow: bool,
}

impl GttsClient {
    pub fn new(lang: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, lang, 30)
    }

    pub fn with_base_url(base_url: &str, lang: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(base_url, Auth::None, timeout_secs)?),
            lang: lang.into(),
            slow: false,
        })
    }

    pub fn slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    /// Audio handle for `text`; nothing is fetched until it is saved or streamed.
    pub fn speak(&self, text: &str) -> Result<GttsAudio> {
        let parts = split_text(text, MAX_PART_CHARS);
        if parts.is_empty() {
            return Err(Error::validation_with_context(
                "no text to speak",
                ErrorContext::new().with_source("gtts"),
            ));
        }
        Ok(GttsAudio {
            transport: Arc::clone(&self.transport),
            parts,
            lang: self.lang.clone(),
            slow: self.slow,
        })
    }
}

impl SpeechClient for GttsClient {
    fn preferred(&self) -> Option<EntryPoint<'_>> {
        None
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint<'_>> {
        match name {
            "speak" => Some(Box::new(move |args: CallArgs<'_>| {
                if let CallArgs::Full(request) = args {
                    // Voice and model ids belong to other providers.
                    return Err(CallError::ArgumentMismatch(format!(
                        "speak() takes no voice argument (got {:?})",
                        request.voice
                    )));
                }
                let audio = self.speak(args.text())?;
                Ok(SynthesisResult::FileSaver(Box::new(audio)))
            })),
            _ => None,
        }
    }
}

/// Synthesized speech that has not been downloaded yet.
pub struct GttsAudio {
    transport: Arc<HttpTransport>,
    parts: Vec<String>,
    lang: String,
    slow: bool,
}

impl GttsAudio {
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    fn fetch(&self, idx: usize) -> Result<Bytes> {
        let part = &self.parts[idx];
        let total = self.parts.len().to_string();
        let idx_s = idx.to_string();
        let textlen = part.chars().count().to_string();
        let speed = if self.slow { "0.3" } else { "1" };
        debug!(part = idx, total = self.parts.len(), "fetching speech part");
        let response = self.transport.get(
            "/translate_tts",
            &[
                ("ie", "UTF-8"),
                ("q", part.as_str()),
                ("tl", self.lang.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
                ("total", total.as_str()),
                ("idx", idx_s.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )?;
        Ok(response.bytes()?)
    }
}

impl OpaqueValue for GttsAudio {
    fn type_name(&self) -> &str {
        "gtts::GttsAudio"
    }
}

/// Persisting is the only way out. A chunk stream would download every part again.
impl FileSaver for GttsAudio {
    fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut audio = Vec::new();
        for idx in 0..self.parts.len() {
            audio.extend_from_slice(&self.fetch(idx)?);
        }
        std::fs::write(path, audio)?;
        Ok(())
    }
}

/// Split `text` into parts of at most `max_chars` characters, breaking on
/// whitespace and hard-splitting words that are longer than a part.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            parts.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current.is_empty() { word.len() } else { current.chars().count() + 1 + word.len() };
        if needed > max_chars && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
