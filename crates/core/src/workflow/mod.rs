//! Document signature workflow for Chancery.
//!
//! This module implements the single-step sign/reject state machine shared
//! by all document kinds, the status code registry, and the orchestration
//! layer that runs a transition through an injected store.
//!
//! # Modules
//!
//! - `kind` - Closed set of document kinds and their store descriptors
//! - `status` - Status code registry and its shared snapshot
//! - `types` - Workflow domain types (requests, transitions, read models)
//! - `error` - Workflow-specific error types
//! - `service` - Guard and transition planning
//! - `approval` - Store port and sign/reject orchestration

pub mod approval;
pub mod error;
pub mod kind;
pub mod service;
pub mod status;
pub mod types;

#[cfg(test)]
mod approval_props;
#[cfg(test)]
mod memory;
#[cfg(test)]
mod service_props;

pub use approval::{ApprovalStore, ApprovalWorkflow};
pub use error::{ErrorKind, WorkflowError};
pub use kind::{DocumentColumns, DocumentKind, DocumentKindResolver, StoreDescriptor};
pub use service::{WorkflowService, parse_due_date};
pub use status::{StatusCache, StatusRegistry, TransitionStatuses};
pub use types::{
    DocumentRef, DocumentStatus, DocumentUpdate, NewSignature, Party, PendingDocument,
    RejectRequest, SignRequest, SignatureAction, SignatureEntry, Transition,
};
