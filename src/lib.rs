//! # voice-assistant
//!
//! 语音/图像助手运行时：把用户的语音问题和图片交给多模态模型，再把回答合成为语音并播放。
//!
//! Voice and image assistant runtime. A spoken question (and optionally a photo)
//! goes in; a spoken answer comes out.
//!
//! ## Overview
//!
//! The interesting part is the speech path. Synthesis backends disagree about
//! what "the audio" is: raw bytes, an object wrapping bytes, an object that can
//! save itself, a lazy chunk stream, or something else entirely. [`tts`]
//! normalizes every one of those into a file on disk, finds a usable call on
//! clients that lack the preferred one, and hands the file to [`playback`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voice_assistant::tts::{ElevenLabsClient, SpeechPipeline};
//! use std::path::Path;
//!
//! fn main() -> voice_assistant::Result<()> {
//!     let client = ElevenLabsClient::builder().build()?;
//!     let request = client.request("Hello there");
//!     let file = SpeechPipeline::system().run(&client, &request, Path::new("final.mp3"))?;
//!     println!("wrote {} bytes", file.bytes_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tts`] | Synthesis result normalization, stream draining, entry-point probing |
//! | [`playback`] | OS-specific best-effort audio playback |
//! | [`assistant`] | End-to-end question → answer → speech orchestration |
//! | [`config`] | YAML/env configuration and credential lookup |
//! | [`transport`] | Blocking HTTP transport shared by the remote clients |
//! | `stt` | Speech-to-text (feature `stt`) |
//! | `vision` | Vision-language chat (feature `vision`) |

pub mod assistant;
pub mod config;
pub mod playback;
pub mod transport;
pub mod tts;

#[cfg(feature = "stt")]
pub mod stt;

#[cfg(feature = "vision")]
pub mod vision;

// Re-export main types for convenience
pub use assistant::{Assistant, AssistantInputs, AssistantReply};
pub use config::AssistantConfig;
pub use playback::{NoopPlayer, OsKind, Player, SystemPlayer};
pub use tts::{AudioFile, SpeechClient, SpeechPipeline, SpeechRequest, SynthesisResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
