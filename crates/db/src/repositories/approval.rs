//! `PostgreSQL` implementation of the approval store.
//!
//! Each sign/reject runs in one transaction: the document row is locked
//! with `SELECT ... FOR UPDATE`, the planning closure sees the locked
//! status, the audit record is appended and the document is updated with a
//! status predicate. Any failure rolls the whole unit back.

use sea_orm::sea_query::{Alias, Expr, LockType, Query, SelectStatement, UpdateStatement};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait,
};
use tracing::{error, info, warn};

use chancery_core::workflow::{
    ApprovalStore, DocumentRef, DocumentStatus, PendingDocument, SignatureEntry, StoreDescriptor,
    Transition, WorkflowError,
};
use chancery_shared::types::{DocumentId, StatusId};

use super::audit_trail::AuditTrailRepository;
use super::database_error;
use super::pending::PendingDocumentRepository;
use super::status::load_statuses;

/// Approval store backed by the document tables and the signature trail.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    db: DatabaseConnection,
    audit: AuditTrailRepository,
    pending: PendingDocumentRepository,
}

impl ApprovalRepository {
    /// Creates a new approval repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            audit: AuditTrailRepository::new(db.clone()),
            pending: PendingDocumentRepository::new(db.clone()),
            db,
        }
    }

    async fn run_transition<F>(
        txn: &DatabaseTransaction,
        store: &'static StoreDescriptor,
        id: DocumentId,
        plan: F,
    ) -> Result<Transition, WorkflowError>
    where
        F: FnOnce(StatusId) -> Result<Transition, WorkflowError> + Send,
    {
        let document = DocumentRef::new(store.kind, id);

        let current = select_status(txn, store, id, true)
            .await
            .map_err(|e| WorkflowError::database("lock_document", e))?
            .ok_or(WorkflowError::DocumentNotFound(document))?;

        let transition = plan(current)?;

        AuditTrailRepository::append_signature(txn, &transition.signature)
            .await
            .map_err(|e| WorkflowError::database("append_signature", e))?;

        let affected = update_document(txn, store, id, &transition)
            .await
            .map_err(|e| WorkflowError::database("update_document", e))?;
        if affected == 0 {
            return Err(WorkflowError::InvalidState { document, current });
        }

        Ok(transition)
    }
}

impl ApprovalStore for ApprovalRepository {
    async fn load_statuses(&self) -> Result<Vec<DocumentStatus>, WorkflowError> {
        let statuses = load_statuses(&self.db).await?;
        info!(statuses = statuses.len(), "document statuses loaded");
        Ok(statuses)
    }

    async fn apply_transition<F>(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
        plan: F,
    ) -> Result<Transition, WorkflowError>
    where
        F: FnOnce(StatusId) -> Result<Transition, WorkflowError> + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::database("begin", e))?;

        let outcome = match Self::run_transition(&txn, store, id, plan).await {
            Ok(transition) => txn
                .commit()
                .await
                .map(|()| transition)
                .map_err(|e| WorkflowError::database("commit", e)),
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    error!(kind = %store.kind, document_id = %id, error = %rollback, "rollback failed");
                }
                Err(err)
            }
        };

        match &outcome {
            Ok(transition) => info!(
                kind = %store.kind,
                document_id = %id,
                actor_id = %transition.signature.signed_by,
                action = transition.action().as_str(),
                from = %transition.from,
                to = %transition.to(),
                "document transition committed"
            ),
            Err(WorkflowError::Database { operation, message }) => {
                error!(
                    kind = %store.kind,
                    document_id = %id,
                    operation,
                    message = %message,
                    "document transition failed"
                );
            }
            Err(err) => {
                warn!(kind = %store.kind, document_id = %id, error = %err, "document transition refused");
            }
        }
        outcome
    }

    async fn current_status_id(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> Result<StatusId, WorkflowError> {
        select_status(&self.db, store, id, false)
            .await
            .map_err(|e| database_error("read_status", e))?
            .ok_or(WorkflowError::DocumentNotFound(DocumentRef::new(store.kind, id)))
    }

    async fn list_signatures(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> Result<Vec<SignatureEntry>, WorkflowError> {
        self.audit.get_signatures(store.kind, id).await
    }

    async fn list_pending(&self, pending: StatusId) -> Result<Vec<PendingDocument>, WorkflowError> {
        self.pending.get_pending_across_kinds(pending).await
    }
}

async fn select_status<C>(
    conn: &C,
    store: &'static StoreDescriptor,
    id: DocumentId,
    for_update: bool,
) -> Result<Option<StatusId>, DbErr>
where
    C: ConnectionTrait,
{
    let stmt = status_query(store, id, for_update);
    let backend = conn.get_database_backend();
    let Some(row) = conn.query_one(backend.build(&stmt)).await? else {
        return Ok(None);
    };
    let status: i32 = row.try_get("", store.columns.status)?;
    Ok(Some(StatusId::new(status)))
}

/// Applies the planned update while the row still holds `transition.from`.
///
/// Returns the number of rows affected.
async fn update_document<C>(
    conn: &C,
    store: &'static StoreDescriptor,
    id: DocumentId,
    transition: &Transition,
) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let stmt = update_query(store, id, transition);
    let backend = conn.get_database_backend();
    let result = conn.execute(backend.build(&stmt)).await?;
    Ok(result.rows_affected())
}

fn status_query(store: &StoreDescriptor, id: DocumentId, for_update: bool) -> SelectStatement {
    let mut stmt = Query::select();
    stmt.column(Alias::new(store.columns.status))
        .from(Alias::new(store.table))
        .and_where(Expr::col(Alias::new(store.columns.id)).eq(id.into_inner()));
    if for_update {
        stmt.lock(LockType::Update);
    }
    stmt
}

// Executor and due date are only written when the transition carries a value.
fn update_query(store: &StoreDescriptor, id: DocumentId, transition: &Transition) -> UpdateStatement {
    let c = &store.columns;
    let update = &transition.update;

    let mut stmt = Query::update();
    stmt.table(Alias::new(store.table))
        .value(Alias::new(c.status), update.status_id.into_inner())
        .value(Alias::new(c.updated_by), update.updated_by.into_inner())
        .value(Alias::new(c.updated_at), update.updated_at)
        .and_where(Expr::col(Alias::new(c.id)).eq(id.into_inner()))
        .and_where(Expr::col(Alias::new(c.status)).eq(transition.from.into_inner()));
    if let Some(executor) = update.executor_id {
        stmt.value(Alias::new(c.executor), executor.into_inner());
    }
    if let Some(due_date) = update.due_date {
        stmt.value(Alias::new(c.due_date), due_date);
    }
    stmt
}
