//! Workflow service for document signature transitions.
//!
//! This module implements the guard and planning logic of the state
//! machine. It performs no I/O: callers pass the status the document holds
//! (read under lock) and receive a [`Transition`] describing exactly what
//! must be written.
//!
//! ```text
//! pending_signature --sign--> signed
//! pending_signature --reject--> signature_rejected
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use chancery_shared::types::{StatusId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::status::TransitionStatuses;
use crate::workflow::types::{
    DocumentRef, DocumentUpdate, NewSignature, RejectRequest, SignRequest, SignatureAction,
    Transition,
};

/// Format of assigned due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Stateless service for planning signature transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Plans signing a document.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidState` if `current` is not the pending status
    /// * `WorkflowError::InvalidDueDate` if the due date is malformed
    ///
    /// The state check runs first, so a document that is not pending reports
    /// `InvalidState` even when the due date is also malformed.
    pub fn sign(
        document: DocumentRef,
        current: StatusId,
        statuses: TransitionStatuses,
        request: &SignRequest,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Transition, WorkflowError> {
        Self::guard(document, current, statuses)?;

        let due_date = request
            .assigned_due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()?;

        Ok(Transition {
            from: statuses.pending,
            signature: NewSignature {
                document,
                action: SignatureAction::Signed,
                resolution_text: request.resolution_text.clone(),
                rejection_reason: None,
                assigned_executor_id: request.assigned_executor_id,
                assigned_due_date: due_date,
                signed_by: actor,
                signed_at: now,
            },
            update: DocumentUpdate {
                status_id: statuses.target,
                updated_by: actor,
                updated_at: now,
                executor_id: request.assigned_executor_id,
                due_date,
            },
        })
    }

    /// Plans rejecting a document. Executor and due date are never touched.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidState` if `current` is not the pending status
    pub fn reject(
        document: DocumentRef,
        current: StatusId,
        statuses: TransitionStatuses,
        request: &RejectRequest,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Transition, WorkflowError> {
        Self::guard(document, current, statuses)?;

        Ok(Transition {
            from: statuses.pending,
            signature: NewSignature {
                document,
                action: SignatureAction::Rejected,
                resolution_text: None,
                rejection_reason: request.reason.clone(),
                assigned_executor_id: None,
                assigned_due_date: None,
                signed_by: actor,
                signed_at: now,
            },
            update: DocumentUpdate {
                status_id: statuses.target,
                updated_by: actor,
                updated_at: now,
                executor_id: None,
                due_date: None,
            },
        })
    }

    /// Checks that the document is exactly in the pending status.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidState` otherwise.
    pub fn guard(
        document: DocumentRef,
        current: StatusId,
        statuses: TransitionStatuses,
    ) -> Result<(), WorkflowError> {
        if current == statuses.pending {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState { document, current })
        }
    }
}

/// Parses a `YYYY-MM-DD` due date. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `WorkflowError::InvalidDueDate` for anything that is not a
/// calendar date without a time component.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, WorkflowError> {
    let trimmed = raw.trim();
    if !is_iso_date_shape(trimmed) {
        return Err(WorkflowError::InvalidDueDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map_err(|_| WorkflowError::InvalidDueDate(raw.to_string()))
}

// chrono accepts unpadded fields, signs and short years; only `dddd-dd-dd` passes here.
fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
