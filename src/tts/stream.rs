//! Stream consumer: drains a chunked synthesis result into one buffer.

use super::result::{Chunk, ChunkStream};
use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use tracing::debug;

/// Drain `stream` in delivery order.
///
/// - `Nil` chunks are skipped.
/// - Byte and wrapper chunks are appended verbatim.
/// - Any other chunk is coerced to bytes, falling back to its textual
///   representation; a non-nil chunk always contributes to the output.
///
/// An iteration failure aborts with [`Error::StreamConsumption`] and discards
/// whatever was accumulated.
pub fn drain(stream: ChunkStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    let mut chunks = 0usize;
    let mut skipped = 0usize;

    for item in stream {
        let chunk = item.map_err(Error::stream_consumption)?;
        match chunk {
            Chunk::Nil => {
                skipped += 1;
                continue;
            }
            Chunk::Bytes(b) | Chunk::Wrapper(b) => buf.extend_from_slice(&b),
            Chunk::Other(value) => match value.to_bytes() {
                Some(b) => buf.extend_from_slice(&b),
                None => {
                    debug!(
                        chunk_type = value.type_name(),
                        "chunk not byte-coercible, using its text form"
                    );
                    buf.extend_from_slice(value.describe().as_bytes());
                }
            },
        }
        chunks += 1;
    }

    debug!(chunks, skipped, bytes = buf.len(), "drained chunk stream");
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::result::SynthesisResult;

    fn stream_of(result: SynthesisResult) -> ChunkStream {
        match result {
            SynthesisResult::ChunkStream(s) => s,
            other => panic!("expected a chunk stream, got {:?}", other),
        }
    }

    #[test]
    fn concatenates_in_delivery_order() {
        let s = stream_of(SynthesisResult::chunks(vec![
            Chunk::Bytes(Bytes::from_static(b"ab")),
            Chunk::Wrapper(Bytes::from_static(b"cd")),
            Chunk::Bytes(Bytes::from_static(b"e")),
        ]));
        assert_eq!(drain(s).unwrap(), Bytes::from_static(b"abcde"));
    }

    #[test]
    fn empty_stream_drains_to_nothing() {
        let s = stream_of(SynthesisResult::chunks(Vec::<Chunk>::new()));
        assert!(drain(s).unwrap().is_empty());
    }

    #[test]
    fn iteration_failure_discards_partial_bytes() {
        let items: Vec<std::result::Result<Chunk, crate::error::BoxError>> = vec![
            Ok(Chunk::Bytes(Bytes::from_static(b"partial"))),
            Err("connection reset".into()),
            Ok(Chunk::Bytes(Bytes::from_static(b"never"))),
        ];
        let err = drain(Box::new(items.into_iter())).unwrap_err();
        assert!(matches!(err, Error::StreamConsumption { .. }));
        assert!(err.to_string().contains("connection reset"));
    }
}
