//! Status lookup repository.

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::info;

use chancery_core::workflow::{DocumentStatus, StatusRegistry, WorkflowError};
use chancery_shared::types::StatusId;

use crate::entities::document_statuses;

use super::database_error;

/// Reads the `document_statuses` lookup table.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    db: DatabaseConnection,
}

impl StatusRepository {
    /// Creates a new status repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every status, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<DocumentStatus>, WorkflowError> {
        load_statuses(&self.db).await
    }

    /// Builds a registry snapshot from the lookup table.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails.
    pub async fn load_registry(&self) -> Result<StatusRegistry, WorkflowError> {
        let registry = StatusRegistry::new(self.list_all().await?);
        info!(statuses = registry.len(), "status registry loaded");
        Ok(registry)
    }
}

pub(crate) async fn load_statuses(
    db: &DatabaseConnection,
) -> Result<Vec<DocumentStatus>, WorkflowError> {
    let models = document_statuses::Entity::find()
        .order_by_asc(document_statuses::Column::Id)
        .all(db)
        .await
        .map_err(|e| database_error("load_statuses", e))?;
    Ok(models.into_iter().map(to_status).collect())
}

fn to_status(model: document_statuses::Model) -> DocumentStatus {
    DocumentStatus {
        id: StatusId::new(model.id),
        code: model.code,
        name: model.name,
    }
}
