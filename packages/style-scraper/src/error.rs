//! Typed errors for the style scraper.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::pipeline::PipelineStatus;
use crate::security::RejectReason;

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// The URL gate rejected the target
    #[error("URL rejected ({reason}): {url}")]
    Rejected { url: String, reason: RejectReason },

    /// A single-use fetch tool was invoked a second time
    #[error("this tool instance has already been used (single-use enforcement)")]
    AlreadyUsed,
}

/// Errors raised by the extraction and analysis collaborators.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Security validation failed
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Page navigation or transport failed
    #[error("navigation failed for {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// The collaborator did not finish in time
    #[error("extraction timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },

    /// A queried element does not exist on the page
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    /// A CSS selector could not be parsed
    #[error("invalid CSS selector: {selector}")]
    InvalidSelector { selector: String },

    /// The extractor returned a record flagged as unsuccessful
    #[error("extractor reported an unsuccessful scrape of {url}")]
    Unsuccessful { url: String },

    /// The analysis collaborator failed
    #[error("analysis failed: {0}")]
    Analysis(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The HTTP client could not be constructed
    #[error("client setup failed: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ExtractionError {
    /// Whether this failure was caused by the timeout bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The record is not a JSON object
    #[error("record must be a JSON object")]
    NotAnObject,

    /// Raw text could not be parsed as JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Top-level fields outside the closed schema
    #[error("unknown fields not permitted: {}", .0.join(", "))]
    UnknownFields(Vec<String>),

    /// A required field is absent or null
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field holds the wrong JSON type
    #[error("field {path} must be {expected}")]
    WrongType { path: String, expected: &'static str },

    /// A color matched none of the accepted grammars
    #[error(
        "invalid color format for {path}: {value}. Must be hex (#RGB), rgb(r,g,b), or hsl(h,s,l)"
    )]
    InvalidColor { path: String, value: String },
}

impl ValidationError {
    /// Field paths this error refers to.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::NotAnObject | Self::InvalidJson(_) => Vec::new(),
            Self::UnknownFields(names) => names.iter().map(String::as_str).collect(),
            Self::MissingField(path)
            | Self::WrongType { path, .. }
            | Self::InvalidColor { path, .. } => vec![path.as_str()],
        }
    }
}

/// The complete list of violations found in one record.
///
/// Never empty when returned from the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", .0.len(), join_errors(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any error refers to the given field path.
    pub fn mentions(&self, path: &str) -> bool {
        self.0.iter().any(|e| e.fields().contains(&path))
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

/// Color string did not match the comparator's input format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorFormatError {
    #[error("invalid hex color: {0}")]
    InvalidHex(String),

    #[error("invalid RGB string: {0}")]
    InvalidRgb(String),

    #[error("unrecognized color: {0}")]
    Unrecognized(String),
}

/// Errors writing or reading configuration artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The event id cannot be used as a file name
    #[error("invalid artifact name: {0:?}")]
    InvalidArtifactName(String),

    /// Filesystem failure
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stored artifact no longer satisfies the schema
    #[error("artifact {} is invalid: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationErrors,
    },
}

/// Errors surfaced by a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The analyst produced nothing that could become a config
    #[error("no usable output: {reason}")]
    NoUsableOutput { reason: String },

    /// Strict grounding found palette colors absent from the page
    #[error("palette colors not observed on page: {}", .fields.join(", "))]
    UngroundedColors { fields: Vec<String> },

    /// A state transition that would revisit or skip a state
    #[error("invalid pipeline transition from {from} to {to}")]
    InvalidTransition {
        from: PipelineStatus,
        to: PipelineStatus,
    },
}

impl PipelineError {
    /// Whether the run failed because of the timeout bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Extraction(e) if e.is_timeout())
    }
}

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

/// Result type alias for collaborator operations.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_display_lists_every_error() {
        let errors = ValidationErrors::new(vec![
            ValidationError::MissingField("event_id".into()),
            ValidationError::InvalidColor {
                path: "colors.primary".into(),
                value: "purple".into(),
            },
        ]);

        let message = errors.to_string();
        assert!(message.starts_with("2 validation error(s): "));
        assert!(message.contains("missing required field: event_id; invalid color format"));

        let boxed: Box<dyn std::error::Error> = Box::new(errors);
        assert!(boxed.source().is_none());
    }
}
