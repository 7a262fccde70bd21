//! Property-based tests for ApprovalWorkflow over the in-memory store.
//!
//! Random sequences of sign/reject calls are replayed against a fresh store
//! and the audit trail is checked against the calls that succeeded.

use std::sync::Arc;

use proptest::prelude::*;

use chancery_shared::WorkflowConfig;
use chancery_shared::types::{DocumentId, UserId};

use crate::workflow::approval::ApprovalWorkflow;
use crate::workflow::error::WorkflowError;
use crate::workflow::kind::DocumentKind;
use crate::workflow::memory::{InMemoryApprovalStore, PENDING, REJECTED, SIGNED};
use crate::workflow::types::{RejectRequest, SignRequest, SignatureAction};

#[derive(Debug, Clone, Copy)]
enum Call {
    Sign(DocumentKind, i64),
    Reject(DocumentKind, i64),
}

fn arb_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::Decree),
        Just(DocumentKind::Report),
        Just(DocumentKind::Letter),
        Just(DocumentKind::Instruction),
    ]
}

fn arb_call() -> impl Strategy<Value = Call> {
    (arb_kind(), 1i64..=3, any::<bool>()).prop_map(|(kind, id, sign)| {
        if sign {
            Call::Sign(kind, id)
        } else {
            Call::Reject(kind, id)
        }
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every successful call leaves exactly one audit entry, every failed
    /// call leaves none, and each document transitions at most once.
    #[test]
    fn prop_audit_trail_counts_successful_calls(calls in proptest::collection::vec(arb_call(), 1..40)) {
        let store = Arc::new(InMemoryApprovalStore::seeded());
        for kind in DocumentKind::ALL {
            for id in 1..=3 {
                store.insert_document(kind, id, PENDING);
            }
        }

        let rt = runtime();
        let outcomes = rt.block_on(async {
            let wf = ApprovalWorkflow::load(Arc::clone(&store), WorkflowConfig::default())
                .await
                .unwrap();
            let mut outcomes = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = match *call {
                    Call::Sign(kind, id) => {
                        wf.sign(kind.as_str(), DocumentId::new(id), SignRequest::default(), UserId::new(1)).await
                    }
                    Call::Reject(kind, id) => {
                        wf.reject(kind.as_str(), DocumentId::new(id), RejectRequest::default(), UserId::new(1)).await
                    }
                };
                outcomes.push((*call, result));
            }
            outcomes
        });

        for kind in DocumentKind::ALL {
            for id in 1..=3 {
                let attempts: Vec<_> = outcomes
                    .iter()
                    .filter(|(call, _)| matches!(call, Call::Sign(k, i) | Call::Reject(k, i) if *k == kind && *i == id))
                    .collect();
                let successes = attempts.iter().filter(|(_, r)| r.is_ok()).count();
                prop_assert!(successes <= 1);
                prop_assert_eq!(successes, usize::from(!attempts.is_empty()));
                prop_assert_eq!(store.signature_count(kind, id), successes);

                for (_, result) in attempts.iter().skip(1) {
                    let is_invalid_state = matches!(result, Err(WorkflowError::InvalidState { .. }));
                    prop_assert!(is_invalid_state);
                }

                let expected = match attempts.first() {
                    None => PENDING,
                    Some((Call::Sign(..), _)) => SIGNED,
                    Some((Call::Reject(..), _)) => REJECTED,
                };
                prop_assert_eq!(store.status_of(kind, id), Some(expected));
            }
        }
    }

    /// The audit trail is returned newest first and its actions match the
    /// document's final status.
    #[test]
    fn prop_signatures_match_final_status(sign in any::<bool>(), kind in arb_kind()) {
        let store = Arc::new(InMemoryApprovalStore::seeded());
        store.insert_document(kind, 1, PENDING);

        let rt = runtime();
        let entries = rt.block_on(async {
            let wf = ApprovalWorkflow::load(Arc::clone(&store), WorkflowConfig::default())
                .await
                .unwrap();
            if sign {
                wf.sign(kind.as_str(), DocumentId::new(1), SignRequest::default(), UserId::new(2)).await.unwrap();
            } else {
                wf.reject(kind.as_str(), DocumentId::new(1), RejectRequest::default(), UserId::new(2)).await.unwrap();
            }
            wf.signatures(kind.as_str(), DocumentId::new(1)).await.unwrap()
        });

        prop_assert_eq!(entries.len(), 1);
        let expected = if sign { SignatureAction::Signed } else { SignatureAction::Rejected };
        prop_assert_eq!(entries[0].action, expected);
        prop_assert_eq!(entries[0].signed_by.id, UserId::new(2));
    }
}
