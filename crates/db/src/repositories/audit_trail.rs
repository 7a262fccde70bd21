//! Signature audit trail repository.
//!
//! Rows are only ever inserted, and only from inside the approval
//! transaction. The database trigger on `document_signatures` rejects
//! UPDATE and DELETE, so the trail cannot be rewritten after the fact.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};

use chancery_core::workflow::{
    DocumentKind, NewSignature, Party, SignatureAction, SignatureEntry, WorkflowError,
};
use chancery_shared::types::{ContactId, DocumentId, SignatureId, UserId};

use crate::entities::{contacts, document_signatures, users};

use super::database_error;

#[derive(Debug, FromQueryResult)]
struct SignatureRow {
    id: i64,
    action: String,
    resolution_text: Option<String>,
    rejection_reason: Option<String>,
    assigned_executor_id: Option<i64>,
    assigned_due_date: Option<NaiveDate>,
    signed_by: i64,
    signed_at: chrono::DateTime<chrono::FixedOffset>,
    // Joined names (aliased)
    executor_name: Option<String>,
    signer_name: Option<String>,
}

/// Read access to the signature audit trail.
#[derive(Debug, Clone)]
pub struct AuditTrailRepository {
    db: DatabaseConnection,
}

impl AuditTrailRepository {
    /// Creates a new audit trail repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one signature record through `conn`.
    ///
    /// Callers pass the open approval transaction; nothing else writes here.
    pub(crate) async fn append_signature<C>(
        conn: &C,
        signature: &NewSignature,
    ) -> Result<SignatureId, DbErr>
    where
        C: ConnectionTrait,
    {
        let record = document_signatures::ActiveModel {
            document_kind: Set(signature.document.kind.as_str().to_string()),
            document_id: Set(signature.document.id.into_inner()),
            action: Set(signature.action.as_str().to_string()),
            resolution_text: Set(signature.resolution_text.clone()),
            rejection_reason: Set(signature.rejection_reason.clone()),
            assigned_executor_id: Set(signature.assigned_executor_id.map(ContactId::into_inner)),
            assigned_due_date: Set(signature.assigned_due_date),
            signed_by: Set(signature.signed_by.into_inner()),
            signed_at: Set(signature.signed_at.into()),
            ..Default::default()
        };
        let inserted = record.insert(conn).await?;
        Ok(SignatureId::new(inserted.id))
    }

    /// Returns a document's signatures, most recent first.
    ///
    /// Executor and signer names are joined in; a missing contact or user
    /// leaves the name empty rather than dropping the entry.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails or a stored
    /// action is not recognised.
    pub async fn get_signatures(
        &self,
        kind: DocumentKind,
        id: DocumentId,
    ) -> Result<Vec<SignatureEntry>, WorkflowError> {
        let rows = document_signatures::Entity::find()
            .filter(document_signatures::Column::DocumentKind.eq(kind.as_str()))
            .filter(document_signatures::Column::DocumentId.eq(id.into_inner()))
            .join(
                JoinType::LeftJoin,
                document_signatures::Relation::AssignedExecutor.def(),
            )
            .join(JoinType::LeftJoin, document_signatures::Relation::Signer.def())
            .column_as(contacts::Column::FullName, "executor_name")
            .column_as(users::Column::FullName, "signer_name")
            .order_by_desc(document_signatures::Column::SignedAt)
            .order_by_desc(document_signatures::Column::Id)
            .into_model::<SignatureRow>()
            .all(&self.db)
            .await
            .map_err(|e| database_error("get_signatures", e))?;

        rows.into_iter().map(to_entry).collect()
    }

    /// Counts the signatures recorded for a document.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails.
    pub async fn count_signatures(
        &self,
        kind: DocumentKind,
        id: DocumentId,
    ) -> Result<u64, WorkflowError> {
        document_signatures::Entity::find()
            .filter(document_signatures::Column::DocumentKind.eq(kind.as_str()))
            .filter(document_signatures::Column::DocumentId.eq(id.into_inner()))
            .count(&self.db)
            .await
            .map_err(|e| database_error("count_signatures", e))
    }
}

fn to_entry(row: SignatureRow) -> Result<SignatureEntry, WorkflowError> {
    let action = SignatureAction::parse(&row.action).ok_or_else(|| {
        database_error(
            "get_signatures",
            format!("unknown signature action '{}'", row.action),
        )
    })?;

    Ok(SignatureEntry {
        id: SignatureId::new(row.id),
        action,
        resolution_text: row.resolution_text,
        rejection_reason: row.rejection_reason,
        assigned_executor: row
            .assigned_executor_id
            .map(|executor| Party::new(ContactId::new(executor), row.executor_name)),
        assigned_due_date: row.assigned_due_date,
        signed_by: Party::new(UserId::new(row.signed_by), row.signer_name),
        signed_at: row.signed_at.with_timezone(&Utc),
    })
}
