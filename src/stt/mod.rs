//! STT（语音转文字）模块：通过 Whisper 兼容接口将患者录音转录为文本。

mod client;
mod types;

pub use client::{SttClient, SttClientBuilder};
pub use types::{SttOptions, Transcription, TranscriptionSegment};
