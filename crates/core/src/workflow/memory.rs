//! In-memory `ApprovalStore` for tests.
//!
//! An async mutex stands in for the row lock: `apply_transition` holds it
//! from the status read to the commit and yields to the scheduler between
//! the read, the plan and the write, so concurrent calls really interleave.
//! The write is conditional on the status read earlier, like the
//! `WHERE status_id = $from` update in `PostgreSQL`. Writes are staged and
//! only published when every step succeeded.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use tokio::sync::Mutex as RowLock;

use chancery_shared::types::{
    ContactId, DocumentId, DocumentTypeId, SignatureId, StatusId, UserId,
};

use crate::workflow::approval::ApprovalStore;
use crate::workflow::error::WorkflowError;
use crate::workflow::kind::{DocumentKind, StoreDescriptor};
use crate::workflow::types::{
    DocumentRef, DocumentStatus, NewSignature, Party, PendingDocument, SignatureEntry, Transition,
};

pub const PENDING: StatusId = StatusId(2);
pub const SIGNED: StatusId = StatusId(3);
pub const REJECTED: StatusId = StatusId(4);

#[derive(Debug, Clone)]
struct Row {
    status: StatusId,
    executor: Option<ContactId>,
    due_date: Option<NaiveDate>,
    updated_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    statuses: Vec<DocumentStatus>,
    documents: BTreeMap<(DocumentKind, i64), Row>,
    signatures: Vec<(SignatureId, NewSignature)>,
}

#[derive(Default)]
pub struct InMemoryApprovalStore {
    state: Mutex<State>,
    row_lock: RowLock<()>,
    unlocked: AtomicBool,
    fail_update: AtomicBool,
    opened: AtomicUsize,
}

/// Newest first, ties broken by kind then id.
fn inbox_order(a: &PendingDocument, b: &PendingDocument) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| b.id.cmp(&a.id))
}

impl InMemoryApprovalStore {
    pub fn seeded() -> Self {
        Self::with_statuses(&[
            (1, "draft"),
            (2, "pending_signature"),
            (3, "signed"),
            (4, "signature_rejected"),
        ])
    }

    pub fn with_statuses(statuses: &[(i32, &str)]) -> Self {
        let store = Self::default();
        for (id, code) in statuses {
            store.add_status(*id, code);
        }
        store
    }

    pub fn add_status(&self, id: i32, code: &str) {
        self.state.lock().unwrap().statuses.push(DocumentStatus {
            id: StatusId::new(id),
            code: code.to_string(),
            name: code.replace('_', " "),
        });
    }

    pub fn insert_document(&self, kind: DocumentKind, id: i64, status: StatusId) {
        let mut state = self.state.lock().unwrap();
        let seq = i64::try_from(state.documents.len()).unwrap();
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(seq);
        state.documents.insert(
            (kind, id),
            Row {
                status,
                executor: None,
                due_date: None,
                updated_by: None,
                created_at,
            },
        );
    }

    pub fn set_assignment(
        &self,
        kind: DocumentKind,
        id: i64,
        executor: Option<ContactId>,
        due_date: Option<NaiveDate>,
    ) {
        let mut state = self.state.lock().unwrap();
        let row = state.documents.get_mut(&(kind, id)).unwrap();
        row.executor = executor;
        row.due_date = due_date;
    }

    pub fn status_of(&self, kind: DocumentKind, id: i64) -> Option<StatusId> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&(kind, id))
            .map(|r| r.status)
    }

    pub fn assignment_of(
        &self,
        kind: DocumentKind,
        id: i64,
    ) -> Option<(Option<ContactId>, Option<NaiveDate>)> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&(kind, id))
            .map(|r| (r.executor, r.due_date))
    }

    pub fn signature_count(&self, kind: DocumentKind, id: i64) -> usize {
        let target = DocumentRef::new(kind, DocumentId::new(id));
        self.state
            .lock()
            .unwrap()
            .signatures
            .iter()
            .filter(|(_, s)| s.document == target)
            .count()
    }

    /// Skips the row lock so only the conditional write guards the row.
    pub fn without_row_lock(self) -> Self {
        self.unlocked.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_next_update(&self) {
        self.fail_update.store(true, Ordering::SeqCst);
    }

    pub fn transactions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl ApprovalStore for InMemoryApprovalStore {
    async fn load_statuses(&self) -> Result<Vec<DocumentStatus>, WorkflowError> {
        Ok(self.state.lock().unwrap().statuses.clone())
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
        self.opened.fetch_add(1, Ordering::SeqCst);
        let _row = if self.unlocked.load(Ordering::SeqCst) {
            None
        } else {
            Some(self.row_lock.lock().await)
        };
        let key = (store.kind, id.into_inner());

        let current = self
            .state
            .lock()
            .unwrap()
            .documents
            .get(&key)
            .map(|r| r.status)
            .ok_or(WorkflowError::DocumentNotFound(DocumentRef::new(store.kind, id)))?;
        tokio::task::yield_now().await;

        let transition = plan(current)?;
        tokio::task::yield_now().await;

        if self.fail_update.swap(false, Ordering::SeqCst) {
            return Err(WorkflowError::database("update_document", "injected failure"));
        }

        let mut state = self.state.lock().unwrap();
        let signature_id = SignatureId::new(i64::try_from(state.signatures.len()).unwrap() + 1);
        let staged = (signature_id, transition.signature.clone());
        let row = state
            .documents
            .get_mut(&key)
            .filter(|r| r.status == transition.from)
            .ok_or(WorkflowError::InvalidState {
                document: transition.signature.document,
                current,
            })?;
        row.status = transition.update.status_id;
        row.updated_by = Some(transition.update.updated_by);
        if let Some(executor) = transition.update.executor_id {
            row.executor = Some(executor);
        }
        if let Some(due_date) = transition.update.due_date {
            row.due_date = Some(due_date);
        }

        state.signatures.push(staged);
        Ok(transition)
    }

    async fn current_status_id(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> Result<StatusId, WorkflowError> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&(store.kind, id.into_inner()))
            .map(|r| r.status)
            .ok_or(WorkflowError::DocumentNotFound(DocumentRef::new(store.kind, id)))
    }

    async fn list_signatures(
        &self,
        store: &'static StoreDescriptor,
        id: DocumentId,
    ) -> Result<Vec<SignatureEntry>, WorkflowError> {
        let target = DocumentRef::new(store.kind, id);
        let state = self.state.lock().unwrap();
        Ok(state
            .signatures
            .iter()
            .rev()
            .filter(|(_, s)| s.document == target)
            .map(|(sig_id, s)| SignatureEntry {
                id: *sig_id,
                action: s.action,
                resolution_text: s.resolution_text.clone(),
                rejection_reason: s.rejection_reason.clone(),
                assigned_executor: s.assigned_executor_id.map(|c| Party::new(c, None)),
                assigned_due_date: s.assigned_due_date,
                signed_by: Party::new(s.signed_by, None),
                signed_at: s.signed_at,
            })
            .collect())
    }

    async fn list_pending(&self, pending: StatusId) -> Result<Vec<PendingDocument>, WorkflowError> {
        let state = self.state.lock().unwrap();
        let mut docs: Vec<PendingDocument> = state
            .documents
            .iter()
            .filter(|(_, row)| row.status == pending)
            .map(|((kind, id), row)| PendingDocument {
                kind: *kind,
                id: DocumentId::new(*id),
                name: format!("{kind} {id}"),
                number: format!("{id}"),
                document_date: row.created_at.date_naive(),
                type_id: DocumentTypeId::new(1),
                type_name: "general".to_string(),
                organization: None,
                responsible: None,
                created_at: row.created_at,
                created_by: None,
            })
            .collect();
        docs.sort_by(inbox_order);
        Ok(docs)
    }
}
