//! Property-based tests for the approval-queue state machine.
//!
//! The central invariant: after any sequence of submit/resolve calls, an
//! entity is `Pending` iff exactly one approval item references it, and the
//! queue holds nothing else.
use chrono::NaiveTime;
use proptest::prelude::*;
use std::collections::HashMap;
use trust_workflow::{
    engine::WorkflowState,
    entities::{AccountDraft, ApplicationDraft, ClientDraft, SipDraft},
    error::WorkflowError,
    types::{ApplicationType, Decision, ItemStatus},
};

/// One scripted action against the engine. Indices are taken modulo the
/// relevant collection length at apply time.
#[derive(Debug, Clone)]
enum Op {
    SubmitClient { score: u32 },
    SubmitAccount { client_index: usize },
    SubmitApplication { account_index: usize, amount: u32 },
    SubmitSip { account_index: usize, amount: u32 },
    Resolve { queue_index: usize, approve: bool },
    ResolveUnknown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..100).prop_map(|score| Op::SubmitClient { score }),
        any::<usize>().prop_map(|client_index| Op::SubmitAccount { client_index }),
        (any::<usize>(), 1u32..1_000_000)
            .prop_map(|(account_index, amount)| Op::SubmitApplication { account_index, amount }),
        (any::<usize>(), 1u32..100_000)
            .prop_map(|(account_index, amount)| Op::SubmitSip { account_index, amount }),
        (any::<usize>(), any::<bool>())
            .prop_map(|(queue_index, approve)| Op::Resolve { queue_index, approve }),
        Just(Op::ResolveUnknown),
    ]
}

fn morning() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn apply(state: &mut WorkflowState, op: Op) {
    match op {
        Op::SubmitClient { score } => {
            state
                .submit_client(
                    ClientDraft {
                        first_name: "Maria".into(),
                        last_name: "Santos".into(),
                        risk_profile_score: score,
                        ..Default::default()
                    },
                    "maker",
                )
                .expect("client submission is always valid here");
        }
        Op::SubmitAccount { client_index } => {
            let clients: Vec<String> =
                state.clients.iter().map(|c| c.client_id.clone()).collect();
            if clients.is_empty() {
                return;
            }
            let client_id = clients[client_index % clients.len()].clone();
            state
                .submit_account(
                    AccountDraft {
                        client_id,
                        fund_name: "Peso Bond Fund".into(),
                        ..Default::default()
                    },
                    "maker",
                )
                .expect("account references an existing client");
        }
        Op::SubmitApplication { account_index, amount } => {
            let accounts: Vec<(String, String)> = state
                .accounts
                .iter()
                .map(|a| (a.account_id.clone(), a.client_id.clone()))
                .collect();
            if accounts.is_empty() {
                return;
            }
            let (account_id, client_id) = accounts[account_index % accounts.len()].clone();
            state
                .submit_application(
                    ApplicationDraft {
                        client_id,
                        account_id,
                        kind: if amount % 2 == 0 {
                            ApplicationType::Buy
                        } else {
                            ApplicationType::Sell
                        },
                        amount: amount as f64,
                        // conservative fund defaults mean no mismatch, and
                        // the waiver flag is inert without one
                        waiver_attached: true,
                        ..Default::default()
                    },
                    "maker",
                    morning(),
                )
                .expect("application passes the morning gates");
        }
        Op::SubmitSip { account_index, amount } => {
            let accounts: Vec<(String, String)> = state
                .accounts
                .iter()
                .map(|a| (a.account_id.clone(), a.client_id.clone()))
                .collect();
            if accounts.is_empty() {
                return;
            }
            let (account_id, client_id) = accounts[account_index % accounts.len()].clone();
            state
                .submit_sip_plan(
                    SipDraft {
                        client_id,
                        account_id,
                        amount: amount as f64,
                        ..Default::default()
                    },
                    "maker",
                )
                .expect("plan references existing records");
        }
        Op::Resolve { queue_index, approve } => {
            let queue = state.approval_queue();
            if queue.is_empty() {
                return;
            }
            let id = queue[queue_index % queue.len()].id.clone();
            let decision = if approve {
                Decision::Approve
            } else {
                Decision::Reject { reason: None }
            };
            state
                .resolve(&id, decision, "checker")
                .expect("resolving a live queue entry succeeds");
        }
        Op::ResolveUnknown => {
            let err = state
                .resolve("appr-unknown", Decision::Approve, "checker")
                .unwrap_err();
            assert!(matches!(err, WorkflowError::NotFound(_)));
        }
    }
}

/// Pending entity ids across all four registries.
fn pending_ids(state: &WorkflowState) -> Vec<String> {
    let mut ids = Vec::new();
    ids.extend(
        state
            .clients
            .iter()
            .filter(|c| c.status == ItemStatus::Pending)
            .map(|c| c.client_id.clone()),
    );
    ids.extend(
        state
            .accounts
            .iter()
            .filter(|a| a.status == ItemStatus::Pending)
            .map(|a| a.account_id.clone()),
    );
    ids.extend(
        state
            .applications
            .iter()
            .filter(|a| a.status == ItemStatus::Pending)
            .map(|a| a.application_id.clone()),
    );
    ids.extend(
        state
            .sip_plans
            .iter()
            .filter(|p| p.status == ItemStatus::Pending)
            .map(|p| p.sip_id.clone()),
    );
    ids
}

fn assert_pending_queue_correspondence(state: &WorkflowState) {
    let pending = pending_ids(state);

    let mut referenced: HashMap<&str, usize> = HashMap::new();
    for item in state.approval_queue() {
        *referenced.entry(item.item_id.as_str()).or_default() += 1;
    }

    assert_eq!(
        state.approval_queue().len(),
        pending.len(),
        "queue length must equal the pending entity count"
    );
    for id in &pending {
        assert_eq!(
            referenced.get(id.as_str()).copied(),
            Some(1),
            "pending entity {id} must have exactly one queue entry"
        );
    }
}

proptest! {
    /// Pending entities and queue entries stay in 1:1 correspondence under
    /// arbitrary interleavings of submissions and resolutions.
    #[test]
    fn pending_and_queue_stay_in_lockstep(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = WorkflowState::new();
        for op in ops {
            apply(&mut state, op);
            assert_pending_queue_correspondence(&state);
        }
    }

    /// Registries only ever grow; resolution never removes a record.
    #[test]
    fn resolution_never_deletes_records(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = WorkflowState::new();
        let mut high_water = (0, 0, 0, 0);
        for op in ops {
            apply(&mut state, op);
            let sizes = (
                state.clients.len(),
                state.accounts.len(),
                state.applications.len(),
                state.sip_plans.len(),
            );
            prop_assert!(sizes.0 >= high_water.0);
            prop_assert!(sizes.1 >= high_water.1);
            prop_assert!(sizes.2 >= high_water.2);
            prop_assert!(sizes.3 >= high_water.3);
            high_water = sizes;
        }
    }

    /// Approved buys and sells move the account balance by exactly the
    /// order amount, in opposite directions.
    #[test]
    fn settlement_moves_balances_by_order_amount(
        amounts in prop::collection::vec((1u32..1_000_000, any::<bool>()), 1..20)
    ) {
        let mut state = WorkflowState::new();
        let client_id = state
            .submit_client(
                ClientDraft {
                    first_name: "Maria".into(),
                    last_name: "Santos".into(),
                    risk_profile_score: 80,
                    ..Default::default()
                },
                "maker",
            )
            .unwrap();
        let item = state.approval_queue()[0].id.clone();
        state.resolve(&item, Decision::Approve, "checker").unwrap();

        let account_id = state
            .submit_account(
                AccountDraft { client_id: client_id.clone(), ..Default::default() },
                "maker",
            )
            .unwrap();
        let item = state.approval_queue()[0].id.clone();
        state.resolve(&item, Decision::Approve, "checker").unwrap();

        let mut expected = 0.0f64;
        for (amount, buy) in amounts {
            state
                .submit_application(
                    ApplicationDraft {
                        client_id: client_id.clone(),
                        account_id: account_id.clone(),
                        kind: if buy { ApplicationType::Buy } else { ApplicationType::Sell },
                        amount: amount as f64,
                        ..Default::default()
                    },
                    "maker",
                    morning(),
                )
                .unwrap();
            let item = state.approval_queue()[0].id.clone();
            state.resolve(&item, Decision::Approve, "checker").unwrap();

            expected += if buy { amount as f64 } else { -(amount as f64) };
            prop_assert_eq!(state.accounts.get(&account_id).unwrap().balance, expected);
        }
    }
}
