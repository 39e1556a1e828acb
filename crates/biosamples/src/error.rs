//! Error types for the BioSamples write path.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Main error type for BioSamples operations.
#[derive(Debug, Error)]
pub enum BioSamplesError {
    /// The incoming record failed structural validation.
    #[error("Validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// A non-privileged caller wrote against an accession with no stored record.
    #[error("Accession conflict for '{accession}': {message}")]
    AccessionConflict { accession: String, message: String },

    /// A protected record invariant would be broken by the write.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The sequence store could not hand out a number.
    #[error("Accession allocation failed for namespace '{namespace}': {message}")]
    Allocation { namespace: String, message: String },

    /// An external-reference URL could not be parsed.
    #[error("Malformed external reference '{url}': {message}")]
    MalformedReference { url: String, message: String },

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Error reading or writing persisted state.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Downstream notification failed. Never surfaced from a write.
    #[error("Notification failed for '{accession}': {message}")]
    Notification { accession: String, message: String },

    /// String does not match the accession grammar.
    #[error("Invalid accession '{0}'")]
    InvalidAccession(String),

    /// String is not a lowercase hex SHA-256 digest.
    #[error("Invalid content hash '{0}'")]
    InvalidHash(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BioSamplesError {
    /// Whether this error ends a write in the rejected state, as opposed to
    /// an infrastructure failure (allocation, store, I/O).
    pub fn rejects_write(&self) -> bool {
        matches!(
            self,
            BioSamplesError::Validation(_)
                | BioSamplesError::AccessionConflict { .. }
                | BioSamplesError::InvariantViolation(_)
                | BioSamplesError::MalformedReference { .. }
                | BioSamplesError::InvalidAccession(_)
        )
    }

    /// Validation issues carried by this error, if any.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            BioSamplesError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Result type alias for BioSamples operations.
pub type Result<T> = std::result::Result<T, BioSamplesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_joins_issues() {
        let err = BioSamplesError::Validation(vec![
            ValidationIssue::new("name", "must not be blank"),
            ValidationIssue::new("release", "is required"),
        ]);

        assert_eq!(
            err.to_string(),
            "Validation failed: name: must not be blank|release: is required"
        );
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_rejects_write_classification() {
        assert!(BioSamplesError::InvariantViolation("x".into()).rejects_write());
        assert!(
            !BioSamplesError::Allocation {
                namespace: "sample".into(),
                message: "down".into()
            }
            .rejects_write()
        );
        assert!(!BioSamplesError::StoreUnavailable("down".into()).rejects_write());
    }
}
