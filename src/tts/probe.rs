//! Entry-point prober.
//!
//! Speech SDKs move their synthesis call around between versions. When a
//! client does not expose the preferred call, the prober walks a fixed list of
//! conventional method names and takes the first one that returns.

use super::result::SynthesisResult;
use super::types::SpeechRequest;
use crate::error::CallError;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Argument shape handed to an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// text + voice + model + output format
    Full,
    TextOnly,
}

/// Concrete arguments for one invocation.
#[derive(Debug, Clone, Copy)]
pub enum CallArgs<'a> {
    Full(&'a SpeechRequest),
    TextOnly(&'a str),
}

impl<'a> CallArgs<'a> {
    pub fn new(shape: ArgShape, request: &'a SpeechRequest) -> Self {
        match shape {
            ArgShape::Full => CallArgs::Full(request),
            ArgShape::TextOnly => CallArgs::TextOnly(&request.text),
        }
    }

    pub fn text(&self) -> &'a str {
        match self {
            CallArgs::Full(r) => &r.text,
            CallArgs::TextOnly(t) => t,
        }
    }

    pub fn shape(&self) -> ArgShape {
        match self {
            CallArgs::Full(_) => ArgShape::Full,
            CallArgs::TextOnly(_) => ArgShape::TextOnly,
        }
    }
}

/// A callable synthesis entry point borrowed from a client.
pub type EntryPoint<'a> =
    Box<dyn Fn(CallArgs<'_>) -> std::result::Result<SynthesisResult, CallError> + 'a>;

/// The call surface of a speech client, as far as it is known at runtime.
pub trait SpeechClient {
    /// The preferred synthesis call (`text_to_speech.convert`), if this client has it.
    fn preferred(&self) -> Option<EntryPoint<'_>>;

    /// Look up an alternative entry point by name.
    fn entry_point(&self, name: &str) -> Option<EntryPoint<'_>>;

    /// A nested call surface, e.g. `text_to_speech`.
    fn namespace(&self, _name: &str) -> Option<&dyn SpeechClient> {
        None
    }
}

/// One method name and the argument shapes to try on it, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct ProbeCandidate {
    pub method: &'static str,
    pub shapes: &'static [ArgShape],
}

const FULL_THEN_TEXT: &[ArgShape] = &[ArgShape::Full, ArgShape::TextOnly];

const fn candidate(method: &'static str) -> ProbeCandidate {
    ProbeCandidate {
        method,
        shapes: FULL_THEN_TEXT,
    }
}

/// Names probed on a client object.
pub const CLIENT_CANDIDATES: &[ProbeCandidate] = &[
    candidate("generate"),
    candidate("synthesize"),
    candidate("create"),
    candidate("stream"),
    candidate("speak"),
];

/// Names probed on a `text_to_speech` namespace object.
pub const NAMESPACE_CANDIDATES: &[ProbeCandidate] = &[
    candidate("convert"),
    candidate("synthesize"),
    candidate("create"),
    candidate("stream"),
    candidate("speak"),
    candidate("generate"),
];

/// Walks an ordered candidate list; first success wins.
#[derive(Debug, Clone, Copy)]
pub struct Prober {
    candidates: &'static [ProbeCandidate],
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(CLIENT_CANDIDATES)
    }
}

impl Prober {
    pub fn new(candidates: &'static [ProbeCandidate]) -> Self {
        Self { candidates }
    }

    pub fn namespace() -> Self {
        Self::new(NAMESPACE_CANDIDATES)
    }

    pub fn candidates(&self) -> &'static [ProbeCandidate] {
        self.candidates
    }

    /// Find and invoke a usable entry point on `client`.
    ///
    /// An entry point is retried with the next (reduced) argument shape only
    /// when it reports an argument mismatch; any other failure moves on to the
    /// next candidate.
    pub fn probe(&self, client: &dyn SpeechClient, request: &SpeechRequest) -> Result<SynthesisResult> {
        let mut last: Option<CallError> = None;

        for candidate in self.candidates {
            let Some(entry) = client.entry_point(candidate.method) else {
                debug!(method = candidate.method, "entry point not present");
                continue;
            };

            for &shape in candidate.shapes {
                match entry(CallArgs::new(shape, request)) {
                    Ok(result) => {
                        info!(
                            method = candidate.method,
                            shape = ?shape,
                            result = result.shape(),
                            "using TTS entry point"
                        );
                        return Ok(result);
                    }
                    Err(CallError::ArgumentMismatch(reason)) => {
                        debug!(method = candidate.method, shape = ?shape, %reason, "argument mismatch");
                        last = Some(CallError::ArgumentMismatch(reason));
                    }
                    Err(e) => {
                        warn!(method = candidate.method, error = %e, "entry point failed");
                        last = Some(e);
                        break;
                    }
                }
            }
        }

        Err(Error::NoEntrypointFound {
            checked: self.candidates.iter().map(|c| c.method.to_string()).collect(),
            last: last.map(Box::new),
        })
    }
}
