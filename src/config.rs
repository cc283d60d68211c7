//! Assistant configuration.
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables. API keys are looked up in the system keyring first, then in the
//! environment; a missing key is only an error once a client needs it.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keyring service name under which provider keys are stored.
pub const KEYRING_SERVICE: &str = "voice-assistant";

/// Where to find one provider's credential.
#[derive(Debug, Clone, Copy)]
pub struct CredentialSource {
    /// Keyring user name.
    pub provider: &'static str,
    /// Environment variables, checked in order.
    pub env_vars: &'static [&'static str],
}

pub const GROQ: CredentialSource = CredentialSource {
    provider: "groq",
    env_vars: &["GROQ_API_KEY"],
};

pub const ELEVENLABS: CredentialSource = CredentialSource {
    provider: "elevenlabs",
    env_vars: &["ELEVENLABS_API_KEY", "ELEVEN_API_KEY"],
};

/// Look up an API key: keyring, then environment.
pub fn lookup_api_key(source: CredentialSource) -> Option<String> {
    if let Ok(entry) = Entry::new(KEYRING_SERVICE, source.provider) {
        if let Ok(key) = entry.get_password() {
            debug!(provider = source.provider, "API key found in keyring");
            return Some(key);
        }
    }
    first_env(source.env_vars)
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| env::var(n).ok())
        .find(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub elevenlabs_api_key: Option<String>,

    pub groq_base_url: String,
    pub elevenlabs_base_url: String,
    pub gtts_base_url: String,

    pub vision_model: String,
    pub stt_model: String,
    pub tts_model: String,
    pub voice_id: Option<String>,
    pub output_format: String,
    /// Language for the keyless fallback voice.
    pub language: String,

    pub output_path: PathBuf,
    pub system_prompt: String,
    pub timeout_secs: u64,
    pub autoplay: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            elevenlabs_api_key: None,
            groq_base_url: "https://api.groq.com/openai".to_string(),
            elevenlabs_base_url: "https://api.elevenlabs.io".to_string(),
            gtts_base_url: "https://translate.google.com".to_string(),
            vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            stt_model: "whisper-large-v3".to_string(),
            tts_model: crate::tts::DEFAULT_MODEL_ID.to_string(),
            voice_id: None,
            output_format: crate::tts::DEFAULT_OUTPUT_FORMAT.to_string(),
            language: "en".to_string(),
            output_path: PathBuf::from("final.mp3"),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_secs: 60,
            autoplay: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a doctor talking to a patient for a learning exercise. \
Look at what the patient shows and describes, say what you think might be wrong and suggest simple remedies. \
Answer in plain speech without lists, numbers or markdown, in at most two sentences, starting right away.";

impl AssistantConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Fill credentials and apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if self.groq_api_key.is_none() {
            self.groq_api_key = lookup_api_key(GROQ);
        }
        if self.elevenlabs_api_key.is_none() {
            self.elevenlabs_api_key = lookup_api_key(ELEVENLABS);
        }
        if let Some(voice) = first_env(&["ELEVEN_VOICE_ID", "ELEVEN_VOICEID"]) {
            self.voice_id = Some(voice);
        }
        if let Some(secs) = env::var("AI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }
        if let Some(out) = first_env(&["VOICE_ASSISTANT_OUTPUT"]) {
            self.output_path = PathBuf::from(out);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("groq_base_url", &self.groq_base_url),
            ("elevenlabs_base_url", &self.elevenlabs_base_url),
            ("gtts_base_url", &self.gtts_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base url '{}'", value),
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_details(e.to_string())
                        .with_source("config"),
                )
            })?;
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be at least one second",
                ErrorContext::new()
                    .with_field_path("timeout_secs")
                    .with_source("config"),
            ));
        }
        Ok(())
    }
}
