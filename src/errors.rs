//! Error types for quiztrack
//!
//! Most anomalies in session state are recovered and logged rather than
//! surfaced; the variants here cover the I/O and decoding failures callers
//! can actually act on.

use thiserror::Error;

/// Main error type for session tracking operations
#[derive(Error, Debug)]
pub enum QuizError {
    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// CSV export errors
    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    /// Atomic rename of a temporary session file failed
    #[error("Failed to persist session file: {0}")]
    PersistError(#[from] tempfile::PersistError),

    /// Session document written by a newer schema
    #[error("Unsupported session schema version {found} (supported up to {supported})")]
    MigrationError { found: u64, supported: u64 },

    /// Archived session lookup found nothing
    #[error("Session not found: {query}")]
    SessionNotFound { query: String, known: Vec<String> },

    /// Row source errors
    #[error("Row source error: {0}")]
    RowSourceError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for quiztrack operations
pub type Result<T> = std::result::Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuizError::MigrationError {
            found: 7,
            supported: 1,
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_not_found_keeps_hint() {
        let err = QuizError::SessionNotFound {
            query: "2026".to_string(),
            known: vec!["20260214_120040".to_string()],
        };
        assert_eq!(err.to_string(), "Session not found: 2026");
        if let QuizError::SessionNotFound { known, .. } = err {
            assert_eq!(known.len(), 1);
        }
    }
}
