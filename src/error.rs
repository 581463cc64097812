//! Error taxonomy
//!
//! Load-time failures (`KnowledgeBaseError`) and structural problems in the
//! knowledge base (`ValidationError`) are kept apart from inference faults so
//! callers can tell "system misconfigured" from "refine your input".
//! Input anomalies are not errors; see [`crate::utils::normalization::InputAnomaly`].

use std::path::PathBuf;
use thiserror::Error;

/// Knowledge base could not be produced from its source
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("knowledge base file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read knowledge base {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid knowledge base: {0}")]
    Validation(#[from] ValidationError),
}

impl KnowledgeBaseError {
    /// True when the source was readable but violated a structural invariant
    pub fn is_validation(&self) -> bool {
        matches!(self, KnowledgeBaseError::Validation(_))
    }
}

/// Structural, referential or range violation in a knowledge base document
///
/// Every variant names the record and field so the source data can be fixed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("knowledge base root must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("knowledge base is missing required key '{key}'")]
    MissingCollection { key: &'static str },

    #[error("key '{key}' must be a list, found {found}")]
    NotAList { key: &'static str, found: &'static str },

    #[error("{collection} at index {index} must be an object")]
    RecordNotObject { collection: &'static str, index: usize },

    #[error("{collection} at index {index} is missing key '{field}'")]
    MissingField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{collection} at index {index} has non-string '{field}'")]
    InvalidField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("duplicate {collection} code: {code}")]
    DuplicateCode { collection: &'static str, code: String },

    #[error("rule at index {index} references {field} code '{code}' which does not exist")]
    UnknownReference {
        index: usize,
        field: &'static str,
        code: String,
    },

    #[error("rule at index {index} has an invalid cf value: {value}")]
    InvalidConfidence { index: usize, value: String },

    #[error("rule at index {index} has cf value {value} outside range 0.0-1.0")]
    ConfidenceOutOfRange { index: usize, value: f64 },
}

/// Failure while evaluating rules
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    KnowledgeBase(#[from] KnowledgeBaseError),

    /// A rule slipped past load-time validation; the snapshot is inconsistent.
    #[error("rule for nutrient '{nutrient}' references unknown symptom '{symptom}'")]
    DanglingRule { nutrient: String, symptom: String },
}
