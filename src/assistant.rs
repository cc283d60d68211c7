//! End-to-end assistant: transcribe the question, ask the vision model, speak the answer.
//!
//! Failures along the way do not abort [`Assistant::process`]; they become the
//! answer text the user sees, and no audio is produced.

use crate::config::AssistantConfig;
use crate::playback::{NoopPlayer, Player, SystemPlayer};
use crate::tts::{
    AudioFile, ElevenLabsClient, GttsClient, Normalizer, SpeechClient, SpeechPipeline, SpeechRequest,
};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Turns a recorded question into text.
pub trait Transcriber {
    fn transcribe_file(&self, path: &Path) -> Result<String>;
}

/// Answers a text query, optionally about an image.
pub trait Analyst {
    fn analyze(&self, query: &str, image: Option<&Path>) -> Result<String>;
}

#[cfg(feature = "stt")]
impl Transcriber for crate::stt::SttClient {
    fn transcribe_file(&self, path: &Path) -> Result<String> {
        Ok(crate::stt::SttClient::transcribe_file(self, path, &Default::default())?.text)
    }
}

#[cfg(feature = "vision")]
impl Analyst for crate::vision::VisionClient {
    fn analyze(&self, query: &str, image: Option<&Path>) -> Result<String> {
        let encoded = image.map(crate::vision::EncodedImage::from_file).transpose()?;
        crate::vision::VisionClient::analyze(self, query, encoded.as_ref())
    }
}

pub const NOTHING_TO_ANALYZE: &str = "No image or audio provided for analysis.";

#[derive(Debug, Clone, Default)]
pub struct AssistantInputs {
    pub audio: Option<PathBuf>,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub transcript: String,
    pub answer: String,
    pub audio: Option<AudioFile>,
}

impl AssistantReply {
    fn error(message: String) -> Self {
        Self {
            transcript: String::new(),
            answer: message,
            audio: None,
        }
    }
}

pub struct Assistant<P: Player = SystemPlayer> {
    transcriber: Option<Box<dyn Transcriber>>,
    analyst: Option<Box<dyn Analyst>>,
    speech: Box<dyn SpeechClient>,
    pipeline: SpeechPipeline<P>,
    voice: String,
    model: String,
    output_format: String,
    system_prompt: String,
    output_path: PathBuf,
}

impl<P: Player> Assistant<P> {
    pub fn new(speech: Box<dyn SpeechClient>, player: P) -> Self {
        let defaults = AssistantConfig::default();
        Self {
            transcriber: None,
            analyst: None,
            speech,
            pipeline: SpeechPipeline::new(Normalizer::new(player)),
            voice: crate::tts::DEFAULT_VOICE_ID.to_string(),
            model: defaults.tts_model,
            output_format: defaults.output_format,
            system_prompt: defaults.system_prompt,
            output_path: defaults.output_path,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_analyst(mut self, analyst: Box<dyn Analyst>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Synthesize `text` to `path` and play it.
    pub fn speak(&self, text: &str, path: &Path) -> Result<AudioFile> {
        let request = SpeechRequest::new(text)
            .voice(self.voice.clone())
            .model(self.model.clone())
            .output_format(self.output_format.clone());
        self.pipeline.run(self.speech.as_ref(), &request, path)
    }

    pub fn process(&self, inputs: &AssistantInputs) -> AssistantReply {
        let (Some(transcriber), Some(analyst)) = (&self.transcriber, &self.analyst) else {
            return AssistantReply::error("Error: GROQ_API_KEY not set".to_string());
        };

        let transcript = match &inputs.audio {
            Some(path) => match transcriber.transcribe_file(path) {
                Ok(text) => text,
                Err(e) => return AssistantReply::error(format!("Error transcribing audio: {e}")),
            },
            None => String::new(),
        };

        let query = format!("{}\n\nPatient Query:\n{}", self.system_prompt, transcript);
        let analysis = if let Some(image) = &inputs.image {
            analyst.analyze(&query, Some(image))
        } else if !transcript.trim().is_empty() {
            analyst.analyze(&query, None)
        } else {
            Ok(NOTHING_TO_ANALYZE.to_string())
        };
        let mut answer = analysis.unwrap_or_else(|e| format!("Error running model: {e}"));

        let audio = match self.speak(&answer, &self.output_path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(error = %e, "speech synthesis failed");
                answer = format!("TTS error: {e}");
                None
            }
        };

        AssistantReply {
            transcript,
            answer,
            audio,
        }
    }
}

impl Assistant<Box<dyn Player>> {
    /// Wire up real clients from configuration. Plays audio unless `config.autoplay` is off.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        config.validate()?;
        let player: Box<dyn Player> = if config.autoplay {
            Box::new(SystemPlayer::new())
        } else {
            Box::new(NoopPlayer)
        };

        let (speech, voice): (Box<dyn SpeechClient>, String) = match &config.elevenlabs_api_key {
            Some(key) => {
                let mut builder = ElevenLabsClient::builder()
                    .api_key(key.clone())
                    .base_url(config.elevenlabs_base_url.clone())
                    .model(config.tts_model.clone())
                    .output_format(config.output_format.clone())
                    .timeout_secs(config.timeout_secs);
                if let Some(voice) = &config.voice_id {
                    builder = builder.voice_id(voice.clone());
                }
                let client = builder.build()?;
                let voice = client.resolve_voice_id();
                (Box::new(client), voice)
            }
            None => {
                info!("no ElevenLabs key, using gTTS, using keyless fallback voice");
                let client = GttsClient::with_base_url(
                    &config.gtts_base_url,
                    config.language.clone(),
                    config.timeout_secs,
                )?;
                (Box::new(client), crate::tts::DEFAULT_VOICE_ID.to_string())
            }
        };

        let mut assistant = Assistant::new(speech, player)
            .voice(voice)
            .system_prompt(config.system_prompt.clone())
            .output_path(config.output_path.clone());
        assistant.model = config.tts_model.clone();
        assistant.output_format = config.output_format.clone();

        if let Some(key) = &config.groq_api_key {
            #[cfg(feature = "stt")]
            {
                let stt = crate::stt::SttClient::builder()
                    .model(config.stt_model.clone())
                    .api_key(key.clone())
                    .base_url(config.groq_base_url.clone())
                    .timeout_secs(config.timeout_secs)
                    .build()?;
                assistant = assistant.with_transcriber(Box::new(stt));
            }
            #[cfg(feature = "vision")]
            {
                let vision = crate::vision::VisionClient::builder()
                    .model(config.vision_model.clone())
                    .api_key(key.clone())
                    .base_url(config.groq_base_url.clone())
                    .timeout_secs(config.timeout_secs)
                    .build()?;
                assistant = assistant.with_analyst(Box::new(vision));
            }
        }

        Ok(assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::tts::{CallArgs, EntryPoint, SynthesisResult};
    use crate::Error;

    struct Silent;
    impl SpeechClient for Silent {
        fn preferred(&self) -> Option<EntryPoint<'_>> {
            Some(Box::new(|args: CallArgs<'_>| {
                Ok(SynthesisResult::from(args.text().as_bytes().to_vec()))
            }))
        }
        fn entry_point(&self, _name: &str) -> Option<EntryPoint<'_>> {
            None
        }
    }

    struct Broken;
    impl SpeechClient for Broken {
        fn preferred(&self) -> Option<EntryPoint<'_>> {
            Some(Box::new(|_args: CallArgs<'_>| {
                Err(CallError::Failed(Error::Remote {
                    status: 401,
                    message: "invalid api key".into(),
                }))
            }))
        }
        fn entry_point(&self, _name: &str) -> Option<EntryPoint<'_>> {
            None
        }
    }

    struct Echo;
    impl Transcriber for Echo {
        fn transcribe_file(&self, _path: &Path) -> Result<String> {
            Ok("it itches".to_string())
        }
    }
    impl Analyst for Echo {
        fn analyze(&self, query: &str, image: Option<&Path>) -> Result<String> {
            let last = query.lines().last().unwrap_or_default();
            Ok(format!("{} / image={}", last, image.is_some()))
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("assistant-{}.mp3", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_vision_key_is_reported_without_audio() {
        let reply = Assistant::new(Box::new(Silent), NoopPlayer).process(&AssistantInputs::default());
        assert_eq!(reply.answer, "Error: GROQ_API_KEY not set");
        assert!(reply.audio.is_none());
    }

    #[test]
    fn nothing_to_analyze_is_still_spoken() {
        let out = temp_path();
        let assistant = Assistant::new(Box::new(Silent), NoopPlayer)
            .with_transcriber(Box::new(Echo))
            .with_analyst(Box::new(Echo))
            .output_path(&out);
        let reply = assistant.process(&AssistantInputs::default());
        assert_eq!(reply.answer, NOTHING_TO_ANALYZE);
        assert_eq!(std::fs::read(&out).unwrap(), NOTHING_TO_ANALYZE.as_bytes());
        std::fs::remove_file(out).ok();
    }

    #[test]
    fn transcript_drives_text_only_analysis() {
        let out = temp_path();
        let assistant = Assistant::new(Box::new(Silent), NoopPlayer)
            .with_transcriber(Box::new(Echo))
            .with_analyst(Box::new(Echo))
            .output_path(&out);
        let reply = assistant.process(&AssistantInputs {
            audio: Some(PathBuf::from("question.mp3")),
            image: None,
        });
        assert_eq!(reply.transcript, "it itches");
        assert_eq!(reply.answer, "it itches / image=false");
        assert!(reply.audio.is_some());
        std::fs::remove_file(out).ok();
    }

    #[test]
    fn speech_failure_replaces_answer() {
        let assistant = Assistant::new(Box::new(Broken), NoopPlayer)
            .with_transcriber(Box::new(Echo))
            .with_analyst(Box::new(Echo))
            .output_path(temp_path());
        let reply = assistant.process(&AssistantInputs::default());
        assert!(reply.answer.starts_with("TTS error: "), "{}", reply.answer);
        assert!(reply.answer.contains("401"));
        assert!(reply.audio.is_none());
    }
}
