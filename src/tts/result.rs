//! Shapes a remote synthesis call may hand back.
//!
//! Producers (SDK adapters, HTTP clients) classify their value once, at the
//! boundary, into a [`SynthesisResult`]; everything downstream matches on the
//! variant instead of probing the value again.

use crate::error::BoxError;
use crate::Result;
use bytes::Bytes;
use std::fmt;
use std::path::Path;

/// A finite, single-pass, ordered sequence of chunks.
///
/// An `Err` item means iterating the underlying source failed, not that one
/// chunk could not be converted.
pub type ChunkStream = Box<dyn Iterator<Item = std::result::Result<Chunk, BoxError>> + Send>;

/// A value of otherwise unknown shape.
pub trait OpaqueValue: Send {
    /// Runtime type name, used in diagnostics.
    fn type_name(&self) -> &str;

    /// Best-effort conversion of the whole value into bytes.
    fn to_bytes(&self) -> Option<Bytes> {
        None
    }

    /// Textual representation, the last resort for stream chunks.
    fn describe(&self) -> String {
        format!("<{}>", self.type_name())
    }
}

/// A value that knows how to persist itself to a path.
///
/// The optional capabilities are consulted, in order, only when
/// `save_to_file` fails.
pub trait FileSaver: OpaqueValue {
    fn save_to_file(&self, path: &Path) -> Result<()>;

    fn content(&self) -> Option<Bytes> {
        None
    }

    /// A fresh chunk stream over the same audio.
    fn chunks(&self) -> Option<ChunkStream> {
        None
    }
}

/// Value returned by a synthesis call.
pub enum SynthesisResult {
    RawBytes(Bytes),
    /// A structured value exposing a byte-content field.
    ContentWrapper(Bytes),
    FileSaver(Box<dyn FileSaver>),
    ChunkStream(ChunkStream),
    Unknown(Box<dyn OpaqueValue>),
}

impl SynthesisResult {
    pub fn chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        I::IntoIter: Send + 'static,
        C: Into<Chunk>,
    {
        SynthesisResult::ChunkStream(Box::new(
            chunks.into_iter().map(|c| Ok::<Chunk, BoxError>(c.into())),
        ))
    }

    /// Variant name as it appears in trace output.
    pub fn shape(&self) -> &'static str {
        match self {
            SynthesisResult::RawBytes(_) => "raw_bytes",
            SynthesisResult::ContentWrapper(_) => "content_wrapper",
            SynthesisResult::FileSaver(_) => "file_saver",
            SynthesisResult::ChunkStream(_) => "chunk_stream",
            SynthesisResult::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Debug for SynthesisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisResult::RawBytes(b) => f.debug_tuple("RawBytes").field(&b.len()).finish(),
            SynthesisResult::ContentWrapper(b) => {
                f.debug_tuple("ContentWrapper").field(&b.len()).finish()
            }
            SynthesisResult::FileSaver(s) => f.debug_tuple("FileSaver").field(&s.type_name()).finish(),
            SynthesisResult::ChunkStream(_) => f.write_str("ChunkStream"),
            SynthesisResult::Unknown(v) => f.debug_tuple("Unknown").field(&v.type_name()).finish(),
        }
    }
}

impl From<Vec<u8>> for SynthesisResult {
    fn from(bytes: Vec<u8>) -> Self {
        SynthesisResult::RawBytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for SynthesisResult {
    fn from(bytes: Bytes) -> Self {
        SynthesisResult::RawBytes(bytes)
    }
}

/// One element of a [`ChunkStream`].
pub enum Chunk {
    Nil,
    Bytes(Bytes),
    /// A wrapper item exposing a byte-content field.
    Wrapper(Bytes),
    Other(Box<dyn OpaqueValue>),
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Nil => f.write_str("Nil"),
            Chunk::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Chunk::Wrapper(b) => f.debug_tuple("Wrapper").field(&b.len()).finish(),
            Chunk::Other(v) => f.debug_tuple("Other").field(&v.type_name()).finish(),
        }
    }
}

impl From<Bytes> for Chunk {
    fn from(b: Bytes) -> Self {
        Chunk::Bytes(b)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(b: Vec<u8>) -> Self {
        Chunk::Bytes(Bytes::from(b))
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(b: &'static [u8]) -> Self {
        Chunk::Bytes(Bytes::from_static(b))
    }
}

impl<T: Into<Chunk>> From<Option<T>> for Chunk {
    fn from(c: Option<T>) -> Self {
        c.map(Into::into).unwrap_or(Chunk::Nil)
    }
}

impl From<serde_json::Value> for Chunk {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Chunk::Nil,
            other => Chunk::Other(Box::new(other)),
        }
    }
}

/// JSON values show up as chunks when a provider streams framed payloads.
impl OpaqueValue for serde_json::Value {
    fn type_name(&self) -> &str {
        match self {
            serde_json::Value::Null => "json::null",
            serde_json::Value::Bool(_) => "json::bool",
            serde_json::Value::Number(_) => "json::number",
            serde_json::Value::String(_) => "json::string",
            serde_json::Value::Array(_) => "json::array",
            serde_json::Value::Object(_) => "json::object",
        }
    }

    /// Only arrays of byte-sized integers convert losslessly.
    fn to_bytes(&self) -> Option<Bytes> {
        let items = self.as_array()?;
        items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Bytes::from)
    }

    fn describe(&self) -> String {
        match self {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
