//! Error handling for CamKit
//!
//! Provides error types for all layers of the toolpath core:
//! - Document errors (settings document syntax and file access)
//! - Job errors (toolpath run preparation and execution)
//! - Engine errors (the external path-generation backend)
//!
//! All error types use `thiserror` for ergonomic error handling.
//! Field coercion failures during record resolution are deliberately NOT
//! errors: the affected field is omitted from the record instead.

use thiserror::Error;

/// Settings document error type
///
/// Represents syntax and file-access failures while loading or saving a
/// machining settings document. A failed load leaves the previous document
/// state untouched.
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    /// A key/value line appeared before any section header
    #[error("Line {line_number}: key/value pair outside of any section")]
    KeyOutsideSection {
        /// The 1-based line number of the offending line.
        line_number: usize,
    },

    /// A section header is missing its closing bracket
    #[error("Line {line_number}: unterminated section header")]
    UnterminatedHeader {
        /// The 1-based line number of the offending line.
        line_number: usize,
    },

    /// A section header with an empty name
    #[error("Line {line_number}: empty section name")]
    EmptySectionName {
        /// The 1-based line number of the offending line.
        line_number: usize,
    },

    /// A non-comment line has no `:` or `=` separator
    #[error("Line {line_number}: missing key/value separator")]
    MissingSeparator {
        /// The 1-based line number of the offending line.
        line_number: usize,
    },

    /// A key/value line with an empty key
    #[error("Line {line_number}: empty key")]
    EmptyKey {
        /// The 1-based line number of the offending line.
        line_number: usize,
    },

    /// File access failed while reading or writing a document
    #[error("Document I/O error: {reason}")]
    IoError {
        /// The reason for the I/O failure.
        reason: String,
    },

    /// Generic document error
    #[error("Document error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Engine error type
///
/// Represents failures reported by the external path-generation backend.
/// Cancellation is never an engine error; it is a run outcome.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// The backend cannot build the requested cutter shape
    #[error("Unsupported cutter shape: {shape}")]
    UnsupportedShape {
        /// The shape token that was rejected.
        shape: String,
    },

    /// Path generation failed inside the backend
    #[error("Path generation failed: {reason}")]
    GenerationFailed {
        /// The reason generation failed.
        reason: String,
    },

    /// The collision model could not be built
    #[error("Collision model unavailable: {reason}")]
    CollisionUnavailable {
        /// The reason the collision model could not be built.
        reason: String,
    },

    /// Generic engine error
    #[error("Engine error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Toolpath job error type
///
/// Represents errors raised while preparing or executing a toolpath run.
/// These are non-fatal to the application: the run guard is released and
/// the caller decides how to surface them.
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// A resolved record is missing a field the run requires
    #[error("{category} record is missing required field '{field}'")]
    IncompleteRecord {
        /// The record category name (for example "Tool").
        category: String,
        /// The missing field name.
        field: String,
    },

    /// The generator family does not accept the configured direction
    #[error("Path direction '{direction}' is not supported by {family}")]
    UnsupportedDirection {
        /// The generator family name.
        family: String,
        /// The rejected direction token.
        direction: String,
    },

    /// A task referenced a tool or process that is no longer available
    #[error("Task references a missing {category} record")]
    DanglingReference {
        /// The referenced category name.
        category: String,
    },

    /// The external backend failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Generic job error
    #[error("Job error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for CamKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Settings document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Toolpath job error
    #[error(transparent)]
    Job(#[from] JobError),

    /// Path-generation engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a settings document error
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::Document(_))
    }

    /// Check if this is a toolpath job error
    pub fn is_job_error(&self) -> bool {
        matches!(self, Error::Job(_))
    }

    /// Check if this is an engine error
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_) | Error::Job(JobError::Engine(_)))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_display() {
        let err = DocumentError::KeyOutsideSection { line_number: 3 };
        assert_eq!(
            err.to_string(),
            "Line 3: key/value pair outside of any section"
        );

        let err = DocumentError::UnterminatedHeader { line_number: 12 };
        assert_eq!(err.to_string(), "Line 12: unterminated section header");

        let err = DocumentError::MissingSeparator { line_number: 7 };
        assert_eq!(err.to_string(), "Line 7: missing key/value separator");
    }

    #[test]
    fn test_job_error_display() {
        let err = JobError::IncompleteRecord {
            category: "Tool".to_string(),
            field: "tool_radius".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tool record is missing required field 'tool_radius'"
        );

        let err = JobError::UnsupportedDirection {
            family: "DropCutter".to_string(),
            direction: "xy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Path direction 'xy' is not supported by DropCutter"
        );
    }

    #[test]
    fn test_engine_error_conversion() {
        let engine_err = EngineError::GenerationFailed {
            reason: "mesh is degenerate".to_string(),
        };
        let job_err: JobError = engine_err.into();
        assert!(matches!(job_err, JobError::Engine(_)));

        let err: Error = job_err.into();
        assert!(err.is_engine_error());
        assert!(err.is_job_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_document_error());
    }

    #[test]
    fn test_error_other() {
        let err = Error::other("something odd");
        assert_eq!(err.to_string(), "something odd");
    }
}
