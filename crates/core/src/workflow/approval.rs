//! Approval workflow orchestration.
//!
//! [`ApprovalWorkflow`] validates caller input, resolves status codes from
//! the shared registry snapshot and hands a planning closure to an
//! [`ApprovalStore`]. The store owns the transaction: it locks the
//! document, feeds the current status to the closure, and persists the
//! resulting [`Transition`] or nothing at all.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use chancery_shared::WorkflowConfig;
use chancery_shared::types::{DocumentId, StatusId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::kind::{DocumentKindResolver, StoreDescriptor};
use crate::workflow::service::WorkflowService;
use crate::workflow::status::{StatusCache, StatusRegistry};
use crate::workflow::types::{
    DocumentRef, DocumentStatus, PendingDocument, RejectRequest, SignRequest, SignatureEntry,
    Transition,
};

/// Persistence port for the signature workflow.
///
/// Implemented by the db crate; tests substitute an in-memory store.
pub trait ApprovalStore: Send + Sync {
    /// Reads every row of the status lookup table.
    fn load_statuses(
        &self,
    ) -> impl Future<Output = Result<Vec<DocumentStatus>, WorkflowError>> + Send;

    /// Runs one guarded transition atomically.
    ///
    /// Implementations must, inside a single transaction: lock the document
    /// row and read its status (`DocumentNotFound` if absent), call `plan`
    /// with that status, append `transition.signature` to the audit trail,
    /// apply `transition.update` only while the row still holds
    /// `transition.from` (`InvalidState` otherwise), then commit. Any error
    /// leaves no trace.
    fn apply_transition<F>(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
        plan: F,
    ) -> impl Future<Output = Result<Transition, WorkflowError>> + Send
    where
        F: FnOnce(StatusId) -> Result<Transition, WorkflowError> + Send;

    /// Reads a document's current status id.
    fn current_status_id(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> impl Future<Output = Result<StatusId, WorkflowError>> + Send;

    /// Lists the audit trail of a document, most recent first.
    fn list_signatures(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> impl Future<Output = Result<Vec<SignatureEntry>, WorkflowError>> + Send;

    /// Lists documents of every kind holding `pending`, newest first.
    fn list_pending(
        &self,
        pending: StatusId,
    ) -> impl Future<Output = Result<Vec<PendingDocument>, WorkflowError>> + Send;
}

/// Sign/reject orchestrator over an injected store.
pub struct ApprovalWorkflow<S: ApprovalStore> {
    store: Arc<S>,
    statuses: Arc<StatusCache>,
    codes: WorkflowConfig,
}

impl<S: ApprovalStore> ApprovalWorkflow<S> {
    /// Creates a workflow over `store` using an already loaded status cache.
    #[must_use]
    pub fn new(store: Arc<S>, statuses: Arc<StatusCache>, codes: WorkflowConfig) -> Self {
        Self {
            store,
            statuses,
            codes,
        }
    }

    /// Creates a workflow, loading the status registry from `store` once.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup table cannot be read.
    pub async fn load(store: Arc<S>, codes: WorkflowConfig) -> Result<Self, WorkflowError> {
        let registry = StatusRegistry::new(store.load_statuses().await?);
        Ok(Self::new(store, Arc::new(StatusCache::new(registry)), codes))
    }

    /// Re-reads the status lookup table and swaps the cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup table cannot be read; the previous
    /// snapshot stays in place.
    pub async fn reload_statuses(&self) -> Result<usize, WorkflowError> {
        let registry = StatusRegistry::new(self.store.load_statuses().await?);
        let count = registry.len();
        self.statuses.replace(registry).await;
        Ok(count)
    }

    /// Resolves a status code to its id.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StatusNotFound` if the code is unknown.
    pub async fn resolve_status_id(&self, code: &str) -> Result<StatusId, WorkflowError> {
        self.statuses.snapshot().await.resolve_status_id(code)
    }

    /// Signs a document that is pending signature.
    ///
    /// # Errors
    ///
    /// * `StatusNotFound` / `InvalidDocumentType` before any transaction
    /// * `DocumentNotFound`, `InvalidState`, `InvalidDueDate`, `Database`
    ///   from inside the transaction, which is rolled back
    pub async fn sign(
        &self,
        kind: &str,
        id: DocumentId,
        request: SignRequest,
        actor: UserId,
    ) -> Result<Transition, WorkflowError> {
        let statuses = self.statuses.snapshot().await.sign_statuses(&self.codes)?;
        let store = DocumentKindResolver::resolve(kind)?;
        let document = DocumentRef::new(store.kind, id);

        self.store
            .apply_transition(store, id, move |current| {
                WorkflowService::sign(document, current, statuses, &request, actor, Utc::now())
            })
            .await
    }

    /// Rejects a document that is pending signature.
    ///
    /// # Errors
    ///
    /// Same as [`ApprovalWorkflow::sign`], minus `InvalidDueDate`.
    pub async fn reject(
        &self,
        kind: &str,
        id: DocumentId,
        request: RejectRequest,
        actor: UserId,
    ) -> Result<Transition, WorkflowError> {
        let statuses = self.statuses.snapshot().await.reject_statuses(&self.codes)?;
        let store = DocumentKindResolver::resolve(kind)?;
        let document = DocumentRef::new(store.kind, id);

        self.store
            .apply_transition(store, id, move |current| {
                WorkflowService::reject(document, current, statuses, &request, actor, Utc::now())
            })
            .await
    }

    /// Returns a document's current status, e.g. to refresh a view after
    /// an `InvalidState` failure.
    ///
    /// # Errors
    ///
    /// * `InvalidDocumentType`, `DocumentNotFound`, `Database`
    /// * `StatusNotFound` if the document references a status missing from
    ///   the registry snapshot
    pub async fn current_status(
        &self,
        kind: &str,
        id: DocumentId,
    ) -> Result<DocumentStatus, WorkflowError> {
        let store = DocumentKindResolver::resolve(kind)?;
        let status_id = self.store.current_status_id(store, id).await?;
        self.statuses
            .snapshot()
            .await
            .by_id(status_id)
            .cloned()
            .ok_or_else(|| WorkflowError::StatusNotFound(status_id.to_string()))
    }

    /// Returns a document's audit trail, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocumentType` or `Database`.
    pub async fn signatures(
        &self,
        kind: &str,
        id: DocumentId,
    ) -> Result<Vec<SignatureEntry>, WorkflowError> {
        let store = DocumentKindResolver::resolve(kind)?;
        self.store.list_signatures(store, id).await
    }

    /// Returns every pending document across all kinds, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StatusNotFound` if the pending code is unknown, or
    /// `Database`.
    pub async fn pending_documents(&self) -> Result<Vec<PendingDocument>, WorkflowError> {
        let pending = self
            .resolve_status_id(&self.codes.pending_status_code)
            .await?;
        self.store.list_pending(pending).await
    }
}
