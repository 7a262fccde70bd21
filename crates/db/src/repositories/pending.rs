//! Pending-signature inbox across all document kinds.
//!
//! Both queries are single `UNION ALL` statements with one branch per
//! store. Identifiers come exclusively from the `'static` store
//! descriptors; the pending status id is the only bound parameter and is
//! reused by every branch.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};

use chancery_core::workflow::{
    DocumentKind, DocumentKindResolver, Party, PendingDocument, StoreDescriptor, WorkflowError,
};
use chancery_shared::types::{ContactId, DocumentId, DocumentTypeId, OrganizationId, StatusId, UserId};

use super::database_error;

static PENDING_SQL: LazyLock<String> = LazyLock::new(build_pending_sql);
static PENDING_COUNT_SQL: LazyLock<String> = LazyLock::new(build_count_sql);

#[derive(Debug, FromQueryResult)]
struct PendingRow {
    kind: String,
    id: i64,
    name: String,
    number: String,
    document_date: NaiveDate,
    type_id: i64,
    type_name: String,
    organization_id: Option<i64>,
    organization_name: Option<String>,
    responsible_id: Option<i64>,
    responsible_name: Option<String>,
    created_at: chrono::DateTime<chrono::FixedOffset>,
    created_by_id: Option<i64>,
    created_by_name: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    kind: String,
    total: i64,
}

/// Aggregates documents awaiting signature.
#[derive(Debug, Clone)]
pub struct PendingDocumentRepository {
    db: DatabaseConnection,
}

impl PendingDocumentRepository {
    /// Creates a new pending document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every document holding `pending`, across all kinds.
    ///
    /// Ordered by creation time (newest first), then kind in
    /// [`DocumentKind::ALL`] order, then id (highest first).
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails.
    pub async fn get_pending_across_kinds(
        &self,
        pending: StatusId,
    ) -> Result<Vec<PendingDocument>, WorkflowError> {
        let rows = PendingRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            PENDING_SQL.as_str(),
            [pending.into_inner().into()],
        ))
        .all(&self.db)
        .await
        .map_err(|e| database_error("get_pending_documents", e))?;

        rows.into_iter().map(to_pending).collect()
    }

    /// Counts pending documents per kind, in [`DocumentKind::ALL`] order.
    ///
    /// Kinds without pending documents are reported with zero.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` if the query fails.
    pub async fn count_pending_by_kind(
        &self,
        pending: StatusId,
    ) -> Result<Vec<(DocumentKind, u64)>, WorkflowError> {
        let rows = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            PENDING_COUNT_SQL.as_str(),
            [pending.into_inner().into()],
        ))
        .all(&self.db)
        .await
        .map_err(|e| database_error("count_pending_documents", e))?;

        let mut counts: Vec<(DocumentKind, u64)> =
            DocumentKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for row in rows {
            let kind = parse_kind(&row.kind, "count_pending_documents")?;
            if let Some(slot) = counts.iter_mut().find(|(k, _)| *k == kind) {
                slot.1 = u64::try_from(row.total).unwrap_or_default();
            }
        }
        Ok(counts)
    }
}

fn kind_rank(kind: DocumentKind) -> usize {
    DocumentKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(DocumentKind::ALL.len())
}

fn pending_branch(store: &StoreDescriptor) -> String {
    let c = &store.columns;
    format!(
        "SELECT '{kind}' AS kind, {rank} AS kind_rank, d.{id} AS id, d.{name} AS name, \
         d.{number} AS number, d.{date} AS document_date, d.{type_id} AS type_id, \
         t.name AS type_name, d.{org} AS organization_id, o.name AS organization_name, \
         d.{resp} AS responsible_id, rc.full_name AS responsible_name, \
         d.{created_at} AS created_at, d.{created_by} AS created_by_id, \
         u.full_name AS created_by_name \
         FROM {table} d \
         JOIN {type_table} t ON t.id = d.{type_id} \
         LEFT JOIN organizations o ON o.id = d.{org} \
         LEFT JOIN contacts rc ON rc.id = d.{resp} \
         LEFT JOIN users u ON u.id = d.{created_by} \
         WHERE d.{status} = $1",
        kind = store.kind.as_str(),
        rank = kind_rank(store.kind),
        id = c.id,
        name = c.name,
        number = c.number,
        date = c.document_date,
        type_id = c.type_id,
        org = c.organization,
        resp = c.responsible,
        created_at = c.created_at,
        created_by = c.created_by,
        table = store.table,
        type_table = store.type_table,
        status = c.status,
    )
}

fn build_pending_sql() -> String {
    let branches: Vec<String> = DocumentKindResolver::all().map(pending_branch).collect();
    format!(
        "{} ORDER BY created_at DESC, kind_rank ASC, id DESC",
        branches.join(" UNION ALL ")
    )
}

fn build_count_sql() -> String {
    DocumentKindResolver::all()
        .map(|store| {
            format!(
                "SELECT '{kind}' AS kind, COUNT(*) AS total FROM {table} WHERE {status} = $1",
                kind = store.kind.as_str(),
                table = store.table,
                status = store.columns.status,
            )
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ")
}

fn parse_kind(token: &str, operation: &'static str) -> Result<DocumentKind, WorkflowError> {
    DocumentKind::parse(token)
        .ok_or_else(|| database_error(operation, format!("unknown kind '{token}'")))
}

fn to_pending(row: PendingRow) -> Result<PendingDocument, WorkflowError> {
    let kind = parse_kind(&row.kind, "get_pending_documents")?;
    Ok(PendingDocument {
        kind,
        id: DocumentId::new(row.id),
        name: row.name,
        number: row.number,
        document_date: row.document_date,
        type_id: DocumentTypeId::new(row.type_id),
        type_name: row.type_name,
        organization: row
            .organization_id
            .map(|id| Party::new(OrganizationId::new(id), row.organization_name)),
        responsible: row
            .responsible_id
            .map(|id| Party::new(ContactId::new(id), row.responsible_name)),
        created_at: row.created_at.with_timezone(&Utc),
        created_by: row
            .created_by_id
            .map(|id| Party::new(UserId::new(id), row.created_by_name)),
    })
}
