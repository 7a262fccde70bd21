//! Workflow domain types for the document signature lifecycle.
//!
//! This module defines the requests callers submit, the planned effects of
//! a transition, and the read models returned by the audit trail and the
//! pending inbox.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use chancery_shared::types::{
    ContactId, DocumentId, DocumentTypeId, OrganizationId, SignatureId, StatusId, UserId,
};

use crate::workflow::kind::DocumentKind;

/// Identity of a document across all stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Store the document lives in.
    pub kind: DocumentKind,
    /// Identifier within that store.
    pub id: DocumentId,
}

impl DocumentRef {
    /// Creates a document reference.
    #[must_use]
    pub const fn new(kind: DocumentKind, id: DocumentId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Row of the document status lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
    /// Numeric identifier stored on documents.
    pub id: StatusId,
    /// Stable code, e.g. `pending_signature`.
    pub code: String,
    /// Human-readable name.
    pub name: String,
}

/// Outcome recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAction {
    /// The document was signed.
    Signed,
    /// The document was rejected.
    Rejected,
}

impl SignatureAction {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signed" => Some(Self::Signed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for signing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    /// Resolution text written by the signer.
    pub resolution_text: Option<String>,
    /// Contact to assign as executor. `None` keeps the current executor.
    pub assigned_executor_id: Option<ContactId>,
    /// Due date as `YYYY-MM-DD`. `None` keeps the current due date.
    pub assigned_due_date: Option<String>,
}

/// Input for rejecting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Why the document was rejected.
    pub reason: Option<String>,
}

/// Audit entry to append as part of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignature {
    /// Document the entry belongs to.
    pub document: DocumentRef,
    /// What happened.
    pub action: SignatureAction,
    /// Resolution text (sign only).
    pub resolution_text: Option<String>,
    /// Rejection reason (reject only).
    pub rejection_reason: Option<String>,
    /// Executor assigned at signing time.
    pub assigned_executor_id: Option<ContactId>,
    /// Due date assigned at signing time.
    pub assigned_due_date: Option<NaiveDate>,
    /// Acting user.
    pub signed_by: UserId,
    /// When the action happened.
    pub signed_at: DateTime<Utc>,
}

/// Changes to apply to the document row.
///
/// `executor_id` and `due_date` follow merge-on-null semantics: `None`
/// leaves the stored value untouched, it never clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpdate {
    /// New status.
    pub status_id: StatusId,
    /// Acting user.
    pub updated_by: UserId,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
    /// Executor to set, if any.
    pub executor_id: Option<ContactId>,
    /// Due date to set, if any.
    pub due_date: Option<NaiveDate>,
}

/// A validated transition, ready to be persisted atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Status the document must still hold when the update is written.
    pub from: StatusId,
    /// Audit entry to append.
    pub signature: NewSignature,
    /// Document changes.
    pub update: DocumentUpdate,
}

impl Transition {
    /// Returns the status the document moves to.
    #[must_use]
    pub const fn to(&self) -> StatusId {
        self.update.status_id
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> SignatureAction {
        self.signature.action
    }
}

/// Reference to a person or organization with an optional display name.
///
/// The name comes from a best-effort join and is `None` when the directory
/// row is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party<I> {
    /// Identifier.
    pub id: I,
    /// Display name.
    pub name: Option<String>,
}

impl<I> Party<I> {
    /// Creates a party reference.
    pub fn new(id: I, name: Option<String>) -> Self {
        Self { id, name }
    }
}

/// Audit trail entry as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Entry identifier.
    pub id: SignatureId,
    /// What happened.
    pub action: SignatureAction,
    /// Resolution text.
    pub resolution_text: Option<String>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Executor assigned at signing time.
    pub assigned_executor: Option<Party<ContactId>>,
    /// Due date assigned at signing time.
    pub assigned_due_date: Option<NaiveDate>,
    /// Acting user.
    pub signed_by: Party<UserId>,
    /// When the action happened.
    pub signed_at: DateTime<Utc>,
}

/// Document awaiting signature, as listed in the review inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDocument {
    /// Source store.
    pub kind: DocumentKind,
    /// Identifier within that store.
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Registration number.
    pub number: String,
    /// Document date.
    pub document_date: NaiveDate,
    /// Kind-specific type.
    pub type_id: DocumentTypeId,
    /// Kind-specific type name.
    pub type_name: String,
    /// Owning organization.
    pub organization: Option<Party<OrganizationId>>,
    /// Responsible contact.
    pub responsible: Option<Party<ContactId>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creating user.
    pub created_by: Option<Party<UserId>>,
}

impl PendingDocument {
    /// Returns the cross-store identity of this document.
    #[must_use]
    pub const fn document_ref(&self) -> DocumentRef {
        DocumentRef::new(self.kind, self.id)
    }
}
