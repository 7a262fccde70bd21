//! Status code registry.
//!
//! The status lookup table is reference data seeded by migrations. It is
//! read once at process start into an immutable [`StatusRegistry`] and
//! shared through a [`StatusCache`], which only changes on an explicit
//! reload.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use chancery_shared::WorkflowConfig;
use chancery_shared::types::StatusId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::DocumentStatus;

/// Immutable map from status code to status row.
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    by_code: HashMap<String, DocumentStatus>,
    code_by_id: HashMap<StatusId, String>,
}

/// Status ids a guarded transition moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStatuses {
    /// Status the document must hold.
    pub pending: StatusId,
    /// Status the document moves to.
    pub target: StatusId,
}

impl StatusRegistry {
    /// Builds a registry from the rows of the lookup table.
    pub fn new(statuses: impl IntoIterator<Item = DocumentStatus>) -> Self {
        let mut by_code = HashMap::new();
        let mut code_by_id = HashMap::new();
        for status in statuses {
            code_by_id.insert(status.id, status.code.clone());
            by_code.insert(status.code.clone(), status);
        }
        Self { by_code, code_by_id }
    }

    /// Looks up the numeric id of a status code.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StatusNotFound` if the code is unknown.
    pub fn resolve_status_id(&self, code: &str) -> Result<StatusId, WorkflowError> {
        self.by_code
            .get(code)
            .map(|s| s.id)
            .ok_or_else(|| WorkflowError::StatusNotFound(code.to_string()))
    }

    /// Returns the status row for an id.
    #[must_use]
    pub fn by_id(&self, id: StatusId) -> Option<&DocumentStatus> {
        self.code_by_id.get(&id).and_then(|code| self.by_code.get(code))
    }

    /// Returns the code for an id.
    #[must_use]
    pub fn code_of(&self, id: StatusId) -> Option<&str> {
        self.code_by_id.get(&id).map(String::as_str)
    }

    /// Number of known statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Returns true if the registry holds no statuses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Resolves the `pending -> signed` pair.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StatusNotFound` if either code is unknown.
    pub fn sign_statuses(&self, codes: &WorkflowConfig) -> Result<TransitionStatuses, WorkflowError> {
        Ok(TransitionStatuses {
            pending: self.resolve_status_id(&codes.pending_status_code)?,
            target: self.resolve_status_id(&codes.signed_status_code)?,
        })
    }

    /// Resolves the `pending -> rejected` pair.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StatusNotFound` if either code is unknown.
    pub fn reject_statuses(
        &self,
        codes: &WorkflowConfig,
    ) -> Result<TransitionStatuses, WorkflowError> {
        Ok(TransitionStatuses {
            pending: self.resolve_status_id(&codes.pending_status_code)?,
            target: self.resolve_status_id(&codes.rejected_status_code)?,
        })
    }
}

/// Shared handle to the current registry snapshot.
///
/// Readers get an `Arc` to an immutable snapshot and never block a reload
/// for longer than the pointer swap.
#[derive(Debug, Default)]
pub struct StatusCache {
    current: RwLock<Arc<StatusRegistry>>,
}

impl StatusCache {
    /// Creates a cache holding `registry`.
    #[must_use]
    pub fn new(registry: StatusRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Returns the current snapshot.
    pub async fn snapshot(&self) -> Arc<StatusRegistry> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replaces the snapshot.
    pub async fn replace(&self, registry: StatusRegistry) {
        *self.current.write().await = Arc::new(registry);
    }
}
