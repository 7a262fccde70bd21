//! Document kinds and their physical record stores.
//!
//! The four kinds share the signature protocol but live in separate
//! tables whose business columns are named after the kind. Everything the
//! workflow needs to address a store is captured in a `'static`
//! [`StoreDescriptor`], and the only way to obtain one from caller input is
//! [`DocumentKindResolver::resolve`], which checks a closed allow-list.
//! Query builders therefore only ever see identifiers compiled into the
//! binary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::workflow::error::WorkflowError;

/// Category of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Decree issued by management.
    Decree,
    /// Internal report.
    Report,
    /// Outgoing or incoming letter.
    Letter,
    /// Operating instruction.
    Instruction,
}

impl DocumentKind {
    /// Every kind, in the order the pending inbox scans them.
    pub const ALL: [Self; 4] = [Self::Decree, Self::Report, Self::Letter, Self::Instruction];

    /// Returns the token used on the wire and in the audit trail.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decree => "decree",
            Self::Report => "report",
            Self::Letter => "letter",
            Self::Instruction => "instruction",
        }
    }

    /// Parses a kind token. Only the exact lowercase tokens are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "decree" => Some(Self::Decree),
            "report" => Some(Self::Report),
            "letter" => Some(Self::Letter),
            "instruction" => Some(Self::Instruction),
            _ => None,
        }
    }

    /// Returns the store descriptor for this kind.
    #[must_use]
    pub fn descriptor(self) -> &'static StoreDescriptor {
        match self {
            Self::Decree => &DECREES,
            Self::Report => &REPORTS,
            Self::Letter => &LETTERS,
            Self::Instruction => &INSTRUCTIONS,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| WorkflowError::InvalidDocumentType(s.to_string()))
    }
}

/// Column names of a document store.
///
/// Workflow columns (`status`, `executor`, `due_date`, audit metadata) are
/// shared by every kind. Business columns carry the kind in their name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentColumns {
    /// Primary key.
    pub id: &'static str,
    /// Current status reference.
    pub status: &'static str,
    /// Assigned executor (contact reference).
    pub executor: &'static str,
    /// Assigned due date.
    pub due_date: &'static str,
    /// Last modifying user.
    pub updated_by: &'static str,
    /// Last modification time.
    pub updated_at: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Registration number.
    pub number: &'static str,
    /// Document date.
    pub document_date: &'static str,
    /// Kind-specific type reference.
    pub type_id: &'static str,
    /// Owning organization reference.
    pub organization: &'static str,
    /// Responsible contact reference.
    pub responsible: &'static str,
    /// Creating user.
    pub created_by: &'static str,
    /// Creation time.
    pub created_at: &'static str,
}

/// Physical identity of a document kind's record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDescriptor {
    /// Kind this store holds.
    pub kind: DocumentKind,
    /// Document table.
    pub table: &'static str,
    /// Lookup table with the kind-specific document types (`id`, `name`).
    pub type_table: &'static str,
    /// Column names.
    pub columns: DocumentColumns,
}

macro_rules! store {
    ($kind:ident, $table:literal, $prefix:literal) => {
        StoreDescriptor {
            kind: DocumentKind::$kind,
            table: $table,
            type_table: concat!($prefix, "_types"),
            columns: DocumentColumns {
                id: "id",
                status: "status_id",
                executor: "executor_id",
                due_date: "due_date",
                updated_by: "updated_by",
                updated_at: "updated_at",
                name: "name",
                number: concat!($prefix, "_number"),
                document_date: concat!($prefix, "_date"),
                type_id: concat!($prefix, "_type_id"),
                organization: "organization_id",
                responsible: "responsible_contact_id",
                created_by: "created_by",
                created_at: "created_at",
            },
        }
    };
}

static DECREES: StoreDescriptor = store!(Decree, "decrees", "decree");
static REPORTS: StoreDescriptor = store!(Report, "reports", "report");
static LETTERS: StoreDescriptor = store!(Letter, "letters", "letter");
static INSTRUCTIONS: StoreDescriptor = store!(Instruction, "instructions", "instruction");

/// Validates untrusted kind tokens against the closed allow-list.
pub struct DocumentKindResolver;

impl DocumentKindResolver {
    /// Resolves a kind token to its store descriptor.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDocumentType` for any token outside
    /// `decree`, `report`, `letter`, `instruction`.
    pub fn resolve(kind: &str) -> Result<&'static StoreDescriptor, WorkflowError> {
        kind.parse::<DocumentKind>().map(DocumentKind::descriptor)
    }

    /// Returns all store descriptors.
    pub fn all() -> impl Iterator<Item = &'static StoreDescriptor> {
        DocumentKind::ALL.into_iter().map(DocumentKind::descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("decree", DocumentKind::Decree, "decrees")]
    #[case("report", DocumentKind::Report, "reports")]
    #[case("letter", DocumentKind::Letter, "letters")]
    #[case("instruction", DocumentKind::Instruction, "instructions")]
    fn test_resolve_known_kinds(
        #[case] token: &str,
        #[case] kind: DocumentKind,
        #[case] table: &str,
    ) {
        let store = DocumentKindResolver::resolve(token).unwrap();
        assert_eq!(store.kind, kind);
        assert_eq!(store.table, table);
        assert_eq!(kind.as_str(), token);
    }

    #[rstest]
    #[case("")]
    #[case("Decree")]
    #[case("decrees")]
    #[case(" letter")]
    #[case("memo")]
    #[case("decree; DROP TABLE decrees")]
    fn test_resolve_rejects_unknown_tokens(#[case] token: &str) {
        let result = DocumentKindResolver::resolve(token);
        assert!(
            matches!(result, Err(WorkflowError::InvalidDocumentType(ref t)) if t == token),
            "token {token:?} should be rejected"
        );
    }

    #[test]
    fn test_business_columns_are_kind_specific() {
        let letters = DocumentKind::Letter.descriptor();
        assert_eq!(letters.type_table, "letter_types");
        assert_eq!(letters.columns.number, "letter_number");
        assert_eq!(letters.columns.document_date, "letter_date");
        assert_eq!(letters.columns.type_id, "letter_type_id");
        assert_eq!(letters.columns.status, "status_id");
    }

    #[test]
    fn test_all_descriptors_are_distinct() {
        let tables: Vec<_> = DocumentKindResolver::all().map(|s| s.table).collect();
        assert_eq!(tables, vec!["decrees", "reports", "letters", "instructions"]);
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&DocumentKind::Instruction).unwrap();
        assert_eq!(json, "\"instruction\"");
        let kind: DocumentKind = serde_json::from_str("\"report\"").unwrap();
        assert_eq!(kind, DocumentKind::Report);
    }
}
