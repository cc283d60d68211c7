//! Result shape normalizer.
//!
//! Turns a [`SynthesisResult`] into a non-empty audio file on disk. A file is
//! only reported as written when it actually holds bytes; empty output is an
//! error, never a quiet success.

use super::result::{FileSaver, SynthesisResult};
use super::stream::drain;
use super::types::AudioFile;
use crate::playback::{OsKind, Player, SystemPlayer};
use crate::{Error, Result};
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info, warn};

/// Write the audio carried by `result` to `path`.
///
/// Resolution order, first match wins:
/// 1. raw bytes
/// 2. a byte-content field
/// 3. persist-to-path; on failure keep going with content, chunks, coercion
/// 4. chunk stream, drained in order
/// 5. whole-value coercion, else [`Error::UnsupportedResponseShape`]
pub fn resolve(result: SynthesisResult, path: &Path) -> Result<AudioFile> {
    info!(shape = result.shape(), path = %path.display(), "normalizing TTS result");
    match result {
        SynthesisResult::RawBytes(bytes) => write_bytes(path, &bytes, "raw_bytes"),
        SynthesisResult::ContentWrapper(bytes) => write_bytes(path, &bytes, "content"),
        SynthesisResult::FileSaver(saver) => resolve_saver(saver.as_ref(), path),
        SynthesisResult::ChunkStream(stream) => {
            let bytes = drain(stream)?;
            write_bytes(path, &bytes, "chunk_stream")
        }
        SynthesisResult::Unknown(value) => match value.to_bytes() {
            Some(bytes) => write_bytes(path, &bytes, "coerced"),
            None => Err(Error::UnsupportedResponseShape {
                type_name: value.type_name().to_string(),
            }),
        },
    }
}

type SaverFallback = fn(&dyn FileSaver, &Path) -> Option<Result<AudioFile>>;

/// Tried in order after `save_to_file` failed. `None` means the capability is absent.
const SAVER_FALLBACKS: &[(&str, SaverFallback)] = &[
    ("content", from_content),
    ("chunks", from_chunks),
    ("coerced", from_coercion),
];

fn from_content(saver: &dyn FileSaver, path: &Path) -> Option<Result<AudioFile>> {
    saver.content().map(|b| write_bytes(path, &b, "content"))
}

fn from_chunks(saver: &dyn FileSaver, path: &Path) -> Option<Result<AudioFile>> {
    saver
        .chunks()
        .map(|s| drain(s).and_then(|b| write_bytes(path, &b, "chunk_stream")))
}

fn from_coercion(saver: &dyn FileSaver, path: &Path) -> Option<Result<AudioFile>> {
    saver.to_bytes().map(|b| write_bytes(path, &b, "coerced"))
}

fn resolve_saver(saver: &dyn FileSaver, path: &Path) -> Result<AudioFile> {
    match persist(saver, path) {
        Ok(file) => {
            debug!(bytes = file.bytes_written, "save_to_file succeeded");
            return Ok(file);
        }
        Err(e) => warn!(
            error = %e,
            saver = saver.type_name(),
            "save_to_file failed, trying remaining strategies"
        ),
    }

    for (name, fallback) in SAVER_FALLBACKS {
        if let Some(outcome) = fallback(saver, path) {
            debug!(strategy = *name, "file saver fallback matched");
            return outcome;
        }
    }

    Err(Error::UnsupportedResponseShape {
        type_name: saver.type_name().to_string(),
    })
}

fn persist(saver: &dyn FileSaver, path: &Path) -> Result<AudioFile> {
    saver.save_to_file(path)?;
    let file = AudioFile::inspect(path)?;
    if file.bytes_written == 0 {
        return Err(Error::EmptyAudio { shape: "file_saver" });
    }
    Ok(file)
}

fn write_bytes(path: &Path, bytes: &Bytes, shape: &'static str) -> Result<AudioFile> {
    if bytes.is_empty() {
        return Err(Error::EmptyAudio { shape });
    }
    std::fs::write(path, bytes)?;
    info!(shape, bytes = bytes.len(), path = %path.display(), "wrote audio");
    Ok(AudioFile::new(path, bytes.len() as u64))
}

/// [`resolve`] followed by best-effort playback of the written file.
pub struct Normalizer<P: Player = SystemPlayer> {
    player: P,
    os: OsKind,
}

impl Normalizer<SystemPlayer> {
    pub fn system() -> Self {
        Self::new(SystemPlayer::new())
    }
}

impl<P: Player> Normalizer<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            os: OsKind::current(),
        }
    }

    /// Pretend to run on `os` when choosing a playback strategy.
    pub fn with_os(mut self, os: OsKind) -> Self {
        self.os = os;
        self
    }

    pub fn normalize(&self, result: SynthesisResult, path: &Path) -> Result<AudioFile> {
        let file = resolve(result, path)?;
        self.player.play(&file.path, &self.os);
        Ok(file)
    }
}
