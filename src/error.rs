use thiserror::Error;

/// Boxed error used where the underlying cause comes from an arbitrary producer
/// (chunk iterators, SDK adapters).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.elevenlabs_base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "tts", "stt", "vision")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the assistant runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The synthesis result matched no known shape and whole-value coercion failed.
    #[error("Unknown response type from TTS call: {type_name}")]
    UnsupportedResponseShape { type_name: String },

    /// Iterating a chunked synthesis result raised.
    #[error("Failed while consuming streamed TTS response: {source}")]
    StreamConsumption {
        #[source]
        source: BoxError,
    },

    #[error("No TTS entrypoint found on client (checked: {})", .checked.join(", "))]
    NoEntrypointFound {
        checked: Vec<String>,
        #[source]
        last: Option<Box<CallError>>,
    },

    /// Only ever logged by the playback dispatcher, never returned from the pipeline.
    #[error("Playback via {program} failed: {message}")]
    Playback { program: String, message: String },

    #[error("TTS result resolved to empty audio ({shape})")]
    EmptyAudio { shape: &'static str },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Remote error: HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure of a single entry-point invocation.
#[derive(Debug, Error)]
pub enum CallError {
    /// The entry point rejected the argument shape; a reduced shape may still work.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    #[error(transparent)]
    Failed(#[from] Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Wrap an iteration failure of a chunked result.
    pub fn stream_consumption(source: impl Into<BoxError>) -> Self {
        Error::StreamConsumption {
            source: source.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. } => Some(context),
            _ => None,
        }
    }
}

impl From<CallError> for Error {
    fn from(err: CallError) -> Self {
        match err {
            CallError::ArgumentMismatch(message) => Error::validation_with_context(
                message,
                ErrorContext::new().with_source("tts_entrypoint"),
            ),
            CallError::Failed(inner) => inner,
        }
    }
}
