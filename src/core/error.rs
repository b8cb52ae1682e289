use thiserror::Error;

use super::types::{DocumentKind, DraftState};

/// Errors that can occur while numbering, editing or saving a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocketError {
    /// One or more validation rules failed; submission is blocked.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The previous documents could not be read to derive a number.
    #[error("number allocation failed: {0}")]
    Allocation(String),

    /// Header or item write failed. Nothing is assumed committed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Another document already uses this number in the same scope.
    #[error("document number {0} is already in use")]
    UniquenessConflict(String),

    /// A downstream send (vendors, customers) failed after the save.
    #[error("notification failed: {0}")]
    Notification(String),

    /// The only remaining line item cannot be removed.
    #[error("a document must keep at least one line item")]
    LastItem,

    /// Line index does not exist.
    #[error("line index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Document number does not match `{PREFIX}-{year}-{sequence}`.
    #[error("invalid document number: {0}")]
    InvalidNumber(String),

    /// Operation not allowed in the draft's current state.
    #[error("cannot {action} while draft is {state:?}")]
    InvalidState {
        state: DraftState,
        action: &'static str,
    },

    /// A saved document cannot be converted into the requested kind.
    #[error("cannot convert {from} into {to}")]
    InvalidConversion { from: DocumentKind, to: DocumentKind },

    /// Configuration could not be loaded or is out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DocketError {
    /// Transient errors the caller may simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Allocation(_) | Self::Persistence(_) | Self::UniquenessConflict(_)
        )
    }

    /// Field-level errors, if this is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the invalid field (e.g. "items[1].quantity", "header.customer_id").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Short machine-readable code (e.g. "required", "unconfirmed").
    pub code: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{}] {}: {}", code, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }
}
