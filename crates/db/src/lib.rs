//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the lookup, directory and audit tables
//! - The `ApprovalStore` implementation backing the signature workflow
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    ApprovalRepository, AuditTrailRepository, PendingDocumentRepository, StatusRepository,
};

use std::time::Duration;

use chancery_core::workflow::{ApprovalWorkflow, WorkflowError};
use chancery_shared::{DatabaseConfig, WorkflowConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Signature workflow bound to the `PostgreSQL` store.
pub type DocumentWorkflow = ApprovalWorkflow<ApprovalRepository>;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the application settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Builds the signature workflow over `db`, loading the status registry once.
///
/// # Errors
///
/// Returns an error if `document_statuses` cannot be read.
pub async fn document_workflow(
    db: DatabaseConnection,
    codes: WorkflowConfig,
) -> Result<DocumentWorkflow, WorkflowError> {
    ApprovalWorkflow::load(std::sync::Arc::new(ApprovalRepository::new(db)), codes).await
}
