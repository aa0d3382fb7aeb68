// Error taxonomy for the pattern engine.
//
// - Validation: bad parameters, rejected before any generation work starts.
// - Input: a source phrase that cannot feed the requested transformation.
// - Encoding: a malformed or truncated MIDI byte stream.
// - Io / Config: CLI and config-file plumbing.
//
// An empty generated pattern is not an error; callers present it as a warning.

use thiserror::Error;

/// Result type for engine operations.
pub type PatternResult<T> = Result<T, PatternError>;

/// Errors raised by generation, variation, inspiration and the codec.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A parameter is out of range or unparseable.
    #[error("invalid parameter '{name}': {message}")]
    Validation {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// The source phrase cannot be transformed.
    #[error("unusable source phrase: {0}")]
    Input(String),

    /// The binary stream could not be decoded or encoded.
    #[error("MIDI encoding error: {0}")]
    Encoding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PatternError {
    pub(crate) fn validation(name: &str, message: impl Into<String>) -> Self {
        PatternError::Validation {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

impl From<midly::Error> for PatternError {
    fn from(err: midly::Error) -> Self {
        PatternError::Encoding(err.to_string())
    }
}
