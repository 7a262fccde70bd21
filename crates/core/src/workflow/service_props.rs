//! Property-based tests for WorkflowService.
//!
//! These tests check the guard and planning laws over randomized status
//! ids, actors and request payloads using proptest.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use chancery_shared::types::{ContactId, DocumentId, StatusId, UserId};

use crate::workflow::error::WorkflowError;
use crate::workflow::kind::DocumentKind;
use crate::workflow::service::{WorkflowService, parse_due_date};
use crate::workflow::status::TransitionStatuses;
use crate::workflow::types::{DocumentRef, RejectRequest, SignRequest, SignatureAction};

const STATUSES: TransitionStatuses = TransitionStatuses {
    pending: StatusId(2),
    target: StatusId(3),
};

/// Strategy for generating document kinds.
fn arb_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::Decree),
        Just(DocumentKind::Report),
        Just(DocumentKind::Letter),
        Just(DocumentKind::Instruction),
    ]
}

/// Strategy for generating document references.
fn arb_document() -> impl Strategy<Value = DocumentRef> {
    (arb_kind(), 1i64..1_000_000).prop_map(|(kind, id)| DocumentRef::new(kind, DocumentId::new(id)))
}

/// Strategy for generating status ids.
fn arb_status() -> impl Strategy<Value = StatusId> {
    (1i32..10).prop_map(StatusId::new)
}

/// Strategy for generating acting users.
fn arb_actor() -> impl Strategy<Value = UserId> {
    (1i64..100_000).prop_map(UserId::new)
}

/// Strategy for generating valid calendar dates.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=365).prop_map(|(y, ordinal)| {
        NaiveDate::from_yo_opt(y, ordinal).unwrap_or_else(|| NaiveDate::from_yo_opt(y, 1).unwrap())
    })
}

/// Strategy for generating well-formed sign requests.
fn arb_sign_request() -> impl Strategy<Value = SignRequest> {
    (
        proptest::option::of("[a-zA-Z0-9 ]{0,60}"),
        proptest::option::of((1i64..10_000).prop_map(ContactId::new)),
        proptest::option::of(arb_date()),
    )
        .prop_map(|(text, executor, due)| SignRequest {
            resolution_text: text,
            assigned_executor_id: executor,
            assigned_due_date: due.map(|d| d.format("%Y-%m-%d").to_string()),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Guard totality: only the pending status admits a transition
    // =========================================================================

    #[test]
    fn prop_sign_succeeds_only_from_pending(
        document in arb_document(),
        current in arb_status(),
        actor in arb_actor(),
        request in arb_sign_request(),
    ) {
        let result = WorkflowService::sign(document, current, STATUSES, &request, actor, Utc::now());
        if current == STATUSES.pending {
            let t = result.unwrap();
            prop_assert_eq!(t.from, STATUSES.pending);
            prop_assert_eq!(t.to(), STATUSES.target);
            prop_assert_eq!(t.signature.document, document);
            prop_assert_eq!(t.action(), SignatureAction::Signed);
        } else {
            match result {
                Err(WorkflowError::InvalidState { document: d, current: c }) => {
                    prop_assert_eq!(d, document);
                    prop_assert_eq!(c, current);
                }
                other => prop_assert!(false, "expected InvalidState, got {:?}", other),
            }
        }
    }

    #[test]
    fn prop_reject_succeeds_only_from_pending(
        document in arb_document(),
        current in arb_status(),
        actor in arb_actor(),
        reason in proptest::option::of("[a-z ]{1,40}"),
    ) {
        let request = RejectRequest { reason: reason.clone() };
        let result = WorkflowService::reject(document, current, STATUSES, &request, actor, Utc::now());
        if current == STATUSES.pending {
            let t = result.unwrap();
            prop_assert_eq!(t.action(), SignatureAction::Rejected);
            prop_assert_eq!(t.signature.rejection_reason, reason);
            prop_assert_eq!(t.signature.signed_by, actor);
        } else {
            let is_invalid_state = matches!(result, Err(WorkflowError::InvalidState { .. }));
            prop_assert!(is_invalid_state);
        }
    }

    // =========================================================================
    // Merge-on-null: the update only carries values the request supplied
    // =========================================================================

    #[test]
    fn prop_sign_update_mirrors_request(
        document in arb_document(),
        actor in arb_actor(),
        request in arb_sign_request(),
    ) {
        let t = WorkflowService::sign(
            document, STATUSES.pending, STATUSES, &request, actor, Utc::now(),
        ).unwrap();

        prop_assert_eq!(t.update.executor_id, request.assigned_executor_id);
        prop_assert_eq!(t.update.executor_id.is_some(), request.assigned_executor_id.is_some());
        prop_assert_eq!(t.update.due_date.is_some(), request.assigned_due_date.is_some());
        prop_assert_eq!(t.signature.assigned_executor_id, t.update.executor_id);
        prop_assert_eq!(t.signature.assigned_due_date, t.update.due_date);
        prop_assert_eq!(t.update.updated_by, actor);
        prop_assert_eq!(t.signature.resolution_text, request.resolution_text);
        prop_assert!(t.signature.rejection_reason.is_none());
    }

    #[test]
    fn prop_reject_never_assigns(
        document in arb_document(),
        actor in arb_actor(),
    ) {
        let t = WorkflowService::reject(
            document, STATUSES.pending, STATUSES, &RejectRequest::default(), actor, Utc::now(),
        ).unwrap();
        prop_assert!(t.update.executor_id.is_none());
        prop_assert!(t.update.due_date.is_none());
        prop_assert!(t.signature.assigned_executor_id.is_none());
        prop_assert!(t.signature.assigned_due_date.is_none());
        prop_assert!(t.signature.resolution_text.is_none());
    }

    // =========================================================================
    // Due date parsing
    // =========================================================================

    #[test]
    fn prop_formatted_dates_parse_back(date in arb_date()) {
        let raw = date.format("%Y-%m-%d").to_string();
        prop_assert_eq!(parse_due_date(&raw).unwrap(), date);
    }

    #[test]
    fn prop_unpadded_dates_are_invalid(
        year in 1000i32..3000,
        month in 1u32..10,
        day in 1u32..10,
    ) {
        let raw = format!("{year}-{month}-{day}");
        let is_invalid = matches!(parse_due_date(&raw), Err(WorkflowError::InvalidDueDate(_)));
        prop_assert!(is_invalid);

        let short_year = format!("{:02}-{month:02}-{day:02}", year % 100);
        let is_invalid = matches!(parse_due_date(&short_year), Err(WorkflowError::InvalidDueDate(_)));
        prop_assert!(is_invalid);

        let signed = format!("+{year}-{month:02}-{day:02}");
        let is_invalid = matches!(parse_due_date(&signed), Err(WorkflowError::InvalidDueDate(_)));
        prop_assert!(is_invalid);
    }

    #[test]
    fn prop_alphabetic_input_is_invalid(raw in "[a-zA-Z-]{0,20}") {
        let is_invalid = matches!(parse_due_date(&raw), Err(WorkflowError::InvalidDueDate(_)));
        prop_assert!(is_invalid);
    }
}
