//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// Configuration error
    ConfigError(String),
    /// Processing error from core
    ProcessingError(String),
    /// Source and target outputs carry different placeholder multisets
    PlaceholderMismatch(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::ProcessingError(msg) => write!(f, "Processing error: {msg}"),
            CliError::PlaceholderMismatch(msg) => write!(f, "Placeholder mismatch: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error_display() {
        let error = CliError::FileNotFound("corpus.src.jsonl".to_string());
        assert_eq!(error.to_string(), "File not found: corpus.src.jsonl");
    }

    #[test]
    fn test_config_error_display() {
        let error = CliError::ConfigError("alignment file required".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: alignment file required"
        );
    }

    #[test]
    fn test_processing_error_display() {
        let error = CliError::ProcessingError("stream ended early".to_string());
        assert_eq!(error.to_string(), "Processing error: stream ended early");
    }

    #[test]
    fn test_placeholder_mismatch_display() {
        let error = CliError::PlaceholderMismatch("id 7: 2 vs 1".to_string());
        assert_eq!(error.to_string(), "Placeholder mismatch: id 7: 2 vs 1");
    }

    #[test]
    fn test_error_downcasts_from_anyhow() {
        let result: CliResult<()> = Err(CliError::ConfigError("bad".into()).into());
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::ConfigError(_))
        ));
    }
}
