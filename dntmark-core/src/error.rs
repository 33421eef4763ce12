//! Error types for the substitution engine
//!
//! Only run-level failures live here. A rejected entity or a discarded
//! sentence pair is a normal outcome and never surfaces as a `CoreError`.

use thiserror::Error;

/// Run-level errors
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid engine or tag configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parallel input streams ran out of records at different points
    #[error("stream '{stream}' ended early at record {record}")]
    StreamMismatch {
        /// Index of the first record missing from `stream`
        record: usize,
        /// Name of the stream that ended early
        stream: String,
    },

    /// A tagged record could not be decoded
    #[error("malformed tagged record {record}: {reason}")]
    MalformedRecord {
        /// Zero-based record index
        record: usize,
        /// Decoder message
        reason: String,
    },

    /// An alignment token is not of the form `<int>-<int>`
    #[error("malformed alignment token '{token}'")]
    MalformedAlignment {
        /// The offending token
        token: String,
    },

    /// I/O failure while reading a stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, CoreError>;
