//! Workflow error types for the document signature lifecycle.
//!
//! Every failure a caller can observe from the workflow falls into one of
//! five kinds (see [`ErrorKind`]). Storage failures carry the name of the
//! step that failed so they can be diagnosed without exposing driver
//! messages as part of the error kind.

use std::fmt;

use thiserror::Error;

use chancery_shared::AppError;
use chancery_shared::types::StatusId;

use crate::workflow::types::DocumentRef;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Status code is not present in the lookup table.
    #[error("Document status '{0}' not found")]
    StatusNotFound(String),

    /// Document does not exist in its store.
    #[error("Document {0} not found")]
    DocumentNotFound(DocumentRef),

    /// Document kind is outside the allow-list.
    #[error("Invalid document type: '{0}'")]
    InvalidDocumentType(String),

    /// Document is not awaiting signature.
    #[error("Document {document} is not pending signature (current status id {current})")]
    InvalidState {
        /// The document.
        document: DocumentRef,
        /// The status it holds.
        current: StatusId,
    },

    /// Due date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid due date '{0}': expected YYYY-MM-DD")]
    InvalidDueDate(String),

    /// Storage failure.
    #[error("Database error during {operation}")]
    Database {
        /// Step that failed.
        operation: &'static str,
        /// Driver message. Logged by the store, never rendered to callers.
        message: String,
    },
}

/// Caller-facing classification of workflow errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown status code or document.
    NotFound,
    /// Kind outside the allow-list.
    InvalidDocumentType,
    /// Document not in `pending_signature`.
    InvalidState,
    /// Malformed input.
    InvalidInput,
    /// Storage or other unexpected failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::InvalidDocumentType => "invalid_document_type",
            Self::InvalidState => "invalid_state",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl WorkflowError {
    /// Wraps a storage error with the step that produced it.
    pub fn database(operation: &'static str, err: impl fmt::Display) -> Self {
        Self::Database {
            operation,
            message: err.to_string(),
        }
    }

    /// Returns the caller-facing kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::StatusNotFound(_) | Self::DocumentNotFound(_) => ErrorKind::NotFound,
            Self::InvalidDocumentType(_) => ErrorKind::InvalidDocumentType,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidDueDate(_) => ErrorKind::InvalidInput,
            Self::Database { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP-style status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidDocumentType | ErrorKind::InvalidInput => 400,
            ErrorKind::InvalidState => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::StatusNotFound(_) => "STATUS_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::InvalidDocumentType(_) => "INVALID_DOCUMENT_TYPE",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::InvalidDueDate(_) => "INVALID_DUE_DATE",
            Self::Database { .. } => "DATABASE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::InvalidDocumentType | ErrorKind::InvalidInput => Self::Validation(message),
            ErrorKind::InvalidState => Self::Conflict(message),
            ErrorKind::Internal => Self::Database(message),
        }
    }
}
