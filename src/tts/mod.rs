//! TTS（文字转语音）模块：调用语音合成服务，把各种形态的返回值规范化为音频文件并播放。
//!
//! Data flow:
//!
//! ```text
//! text ─► preferred call ─┐
//!          (absent?)      ├─► SynthesisResult ─► normalize ─► AudioFile ─► play
//!          └─► Prober ────┘
//! ```

mod client;
mod gtts;
mod normalize;
mod probe;
mod result;
mod stream;
mod types;

pub use client::{
    ElevenLabsClient, ElevenLabsClientBuilder, DEFAULT_MODEL_ID, DEFAULT_OUTPUT_FORMAT,
    DEFAULT_VOICE_ID,
};
pub use gtts::{split_text, GttsAudio, GttsClient};
pub use normalize::{resolve, Normalizer};
pub use probe::{
    ArgShape, CallArgs, EntryPoint, ProbeCandidate, Prober, SpeechClient, CLIENT_CANDIDATES,
    NAMESPACE_CANDIDATES,
};
pub use result::{Chunk, ChunkStream, FileSaver, OpaqueValue, SynthesisResult};
pub use stream::drain;
pub use types::{AudioFile, AudioFormat, SpeechRequest, Voice};

use crate::playback::{Player, SystemPlayer};
use crate::Result;
use std::path::Path;
use tracing::info;

/// Namespace probed when a client lacks the preferred call.
pub const TTS_NAMESPACE: &str = "text_to_speech";

/// Obtain a synthesis result from `client`.
///
/// Uses the preferred call when the client has it. Otherwise probes the
/// `text_to_speech` namespace if there is one, else the client itself; probed
/// calls use `probe_request`.
pub fn obtain(
    client: &dyn SpeechClient,
    request: &SpeechRequest,
    probe_request: &SpeechRequest,
) -> Result<SynthesisResult> {
    if let Some(preferred) = client.preferred() {
        return Ok(preferred(CallArgs::Full(request))?);
    }

    if let Some(namespace) = client.namespace(TTS_NAMESPACE) {
        info!(namespace = TTS_NAMESPACE, "preferred call not found, probing namespace");
        return Prober::namespace().probe(namespace, probe_request);
    }

    info!("preferred call not found, probing client methods");
    Prober::default().probe(client, probe_request)
}

/// Text in, played audio file out.
pub struct SpeechPipeline<P: Player = SystemPlayer> {
    normalizer: Normalizer<P>,
}

impl SpeechPipeline<SystemPlayer> {
    pub fn system() -> Self {
        Self::new(Normalizer::system())
    }
}

impl<P: Player> SpeechPipeline<P> {
    pub fn new(normalizer: Normalizer<P>) -> Self {
        Self { normalizer }
    }

    /// Synthesize `request` with `client`, write it to `path` and play it.
    /// A single attempt; failures are returned, never retried.
    pub fn run(
        &self,
        client: &dyn SpeechClient,
        request: &SpeechRequest,
        path: &Path,
    ) -> Result<AudioFile> {
        let probe_request = SpeechRequest::probing(request.text.clone());
        let result = obtain(client, request, &probe_request)?;
        self.normalizer.normalize(result, path)
    }
}
