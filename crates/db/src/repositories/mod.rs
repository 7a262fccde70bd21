//! Repository abstractions for data access.
//!
//! Repositories hide the `SeaORM` details of the workflow tables from the
//! rest of the application.

pub mod approval;
pub mod audit_trail;
pub mod pending;
pub mod status;

use std::fmt;

use tracing::error;

use chancery_core::workflow::WorkflowError;

pub use approval::ApprovalRepository;
pub use audit_trail::AuditTrailRepository;
pub use pending::PendingDocumentRepository;
pub use status::StatusRepository;

/// Logs the driver message and wraps it as a database error.
///
/// The message stays out of the error's display text, so this log line is
/// the only place it surfaces.
pub(crate) fn database_error(operation: &'static str, err: impl fmt::Display) -> WorkflowError {
    let message = err.to_string();
    error!(operation, message = %message, "database operation failed");
    WorkflowError::database(operation, message)
}
