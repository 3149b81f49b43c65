//! QA scenarios for the settlement lifecycle planners.
//!
//! These drive the pure transition layer end to end (no database): the
//! same plans the service executes transactionally, checked here for the
//! ledger's money-conservation and state-machine guarantees.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use cashlink::domain::{
    BankDetails, LogAction, Request, RequestStatus, RequestType, User, UserRole,
    WithdrawalLimitConfig,
};
use cashlink::engine::lifecycle::{
    plan_cancel, plan_pick, plan_report_failure, plan_revert, plan_upload, plan_verify,
};
use cashlink::engine::{EngineError, RequestUpdate, SettlementOrder};
use cashlink::settlement::SettlementPoster;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn vendor(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@qa.local", name),
        password_hash: String::new(),
        name: name.to_string(),
        role: UserRole::Vendor,
        bank_details: None,
        upi_id: None,
        qr_code: None,
        withdrawal_limit_config: WithdrawalLimitConfig::Global,
        max_withdrawal_limit: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn deposit_request(owner: &User, amount: &str) -> Request {
    let amount = dec(amount);
    Request {
        id: Uuid::new_v4(),
        kind: RequestType::Deposit,
        amount,
        status: RequestStatus::Pending,
        bank_details: Some(BankDetails {
            account_number: Some("000111222333".into()),
            ifsc_code: Some("SBIN0000001".into()),
            bank_name: Some("SBI".into()),
            account_holder_name: Some(owner.name.clone()),
        }),
        upi_id: Some(format!("{}@upi", owner.name)),
        qr_code: None,
        paid_amount: Decimal::ZERO,
        pending_amount: amount,
        rejection_reason: None,
        payment_failure_reason: None,
        cancellation_reason: None,
        created_by: owner.id,
        picked_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

/// Apply a plan's column changes to an in-memory snapshot, the way the
/// service's guarded UPDATE would.
fn apply(request: &mut Request, update: &RequestUpdate) {
    match update {
        RequestUpdate::Pick {
            amount,
            pending_amount,
            picked_by,
        } => {
            request.status = RequestStatus::Picked;
            request.amount = *amount;
            request.pending_amount = *pending_amount;
            request.picked_by = Some(*picked_by);
        }
        RequestUpdate::PaymentProgress {
            paid_amount,
            pending_amount,
            status,
        } => {
            request.status = *status;
            request.paid_amount = *paid_amount;
            request.pending_amount = *pending_amount;
        }
        RequestUpdate::Complete => request.status = RequestStatus::Completed,
        RequestUpdate::Reject { reason } => {
            request.status = RequestStatus::Rejected;
            request.rejection_reason = Some(reason.clone());
        }
        RequestUpdate::Fail { reason } => {
            request.status = RequestStatus::PaymentFailed;
            request.payment_failure_reason = Some(reason.clone());
        }
        RequestUpdate::Revert {
            bank_details,
            upi_id,
        } => {
            request.status = RequestStatus::Pending;
            request.picked_by = None;
            request.payment_failure_reason = None;
            if let Some(details) = bank_details {
                request.bank_details = Some(details.clone());
            }
            if let Some(upi) = upi_id {
                request.upi_id = Some(upi.clone());
            }
        }
        RequestUpdate::Cancel { reason } => {
            request.cancellation_reason = Some(reason.clone());
            request.deleted_at = Some(Utc::now());
        }
    }
}

fn settled_sums(order: &SettlementOrder) -> (Decimal, Decimal) {
    let (creator_tx, picker_tx) = SettlementPoster::pair_for(order);
    (creator_tx.amount, picker_tx.amount)
}

#[test]
fn qa_split_pick_partial_pay_approve_chain() {
    // Scenario: 100 deposit, bob picks 40, pays 25 then 15, alice approves.
    // The 60 remainder lives its own life.
    let alice = vendor("alice");
    let bob = vendor("bob");

    let mut request = deposit_request(&alice, "100.00");

    // Bob picks 40 of 100.
    let plan = plan_pick(&request, &bob, Some(dec("40.00"))).unwrap();
    apply(&mut request, &plan.update);

    let sibling = plan.spawn.expect("split leaves a 60 remainder");
    assert_eq!(sibling.amount, dec("60.00"));
    assert_eq!(sibling.created_by, alice.id);
    // Total face value is conserved across the split.
    assert_eq!(request.amount + sibling.amount, dec("100.00"));
    assert_eq!(request.status, RequestStatus::Picked);
    assert!(request.amounts_reconcile());

    // First slip: 25 of 40.
    let plan = plan_upload(&request, &bob, dec("25.00"), "ref-1".into()).unwrap();
    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::PaidPartial);
    assert_eq!(request.paid_amount, dec("25.00"));
    assert_eq!(request.pending_amount, dec("15.00"));
    assert!(request.amounts_reconcile());

    // Second slip: the remaining 15.
    let plan = plan_upload(&request, &bob, dec("15.00"), "ref-2".into()).unwrap();
    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::PaidFull);
    assert!(request.amounts_reconcile());

    // Alice approves: settlement covers the paid 40, no new spawn.
    let plan = plan_verify(&request, &alice, Some("bob"), true, None).unwrap();
    assert_eq!(plan.log.action, LogAction::PaymentApproved);
    assert!(plan.spawn.is_none());

    let order = plan.settlement.expect("approval settles");
    let (creator_amount, picker_amount) = settled_sums(&order);
    assert_eq!(creator_amount, dec("40.00"));
    assert_eq!(creator_amount, picker_amount);

    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::Completed);
}

#[test]
fn qa_partial_approval_spawns_exact_remainder() {
    // amount=100, paid=60 -> approval settles 60 and reopens exactly 40.
    let alice = vendor("alice");
    let bob = vendor("bob");

    let mut request = deposit_request(&alice, "100.00");
    let plan = plan_pick(&request, &bob, None).unwrap();
    apply(&mut request, &plan.update);

    let plan = plan_upload(&request, &bob, dec("60.00"), "ref".into()).unwrap();
    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::PaidPartial);

    let plan = plan_verify(&request, &alice, Some("bob"), true, None).unwrap();
    assert_eq!(plan.log.action, LogAction::PartialPaymentApproved);
    assert_eq!(plan.settlement.as_ref().unwrap().amount, dec("60.00"));

    let remainder = plan.spawn.expect("unpaid 40 reopens");
    assert_eq!(remainder.amount, dec("40.00"));
    assert_eq!(remainder.created_by, alice.id);
    // Remainder inherits the original destination snapshot.
    assert_eq!(remainder.upi_id, request.upi_id);
    assert_eq!(remainder.bank_details, request.bank_details);

    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::Completed);
}

#[test]
fn qa_rejection_reopens_full_amount_and_keeps_picker_visible() {
    let alice = vendor("alice");
    let bob = vendor("bob");

    let mut request = deposit_request(&alice, "100.00");
    let plan = plan_pick(&request, &bob, None).unwrap();
    apply(&mut request, &plan.update);
    let plan = plan_upload(&request, &bob, dec("100.00"), "ref".into()).unwrap();
    apply(&mut request, &plan.update);

    let plan = plan_verify(&request, &alice, Some("bob"), false, Some("Fake slip".into())).unwrap();

    // No money moves on rejection.
    assert!(plan.settlement.is_none());

    // The reopened request is for the full 100 even though 100 was "paid";
    // rejection is a full do-over.
    let reopened = plan.spawn.expect("rejection reopens");
    assert_eq!(reopened.amount, dec("100.00"));

    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::Rejected);
    assert_eq!(request.rejection_reason.as_deref(), Some("Fake slip"));
    // The picker keeps the terminal record in their history.
    assert_eq!(request.picked_by, Some(bob.id));
}

#[test]
fn qa_failure_revert_repick_cycle() {
    let alice = vendor("alice");
    let bob = vendor("bob");
    let carol = vendor("carol");

    let mut request = deposit_request(&alice, "100.00");
    let plan = plan_pick(&request, &bob, None).unwrap();
    apply(&mut request, &plan.update);

    // Bob cannot pay: alice's account details are wrong.
    let plan = plan_report_failure(&request, &bob, "Account closed".into()).unwrap();
    apply(&mut request, &plan.update);
    assert_eq!(request.status, RequestStatus::PaymentFailed);

    // Alice reverts with fresh details; bob is cleared off the request.
    let new_details = BankDetails {
        account_number: Some("444555666777".into()),
        ifsc_code: Some("SBIN0000002".into()),
        bank_name: Some("SBI".into()),
        account_holder_name: Some("alice".into()),
    };
    let plan = plan_revert(&request, &alice, Some(new_details.clone()), None, None).unwrap();
    apply(&mut request, &plan.update);

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.picked_by, None);
    assert_eq!(request.payment_failure_reason, None);
    assert_eq!(request.bank_details.as_ref(), Some(&new_details));

    // Carol can now pick the reverted request.
    let plan = plan_pick(&request, &carol, None).unwrap();
    apply(&mut request, &plan.update);
    assert_eq!(request.picked_by, Some(carol.id));
}

#[test]
fn qa_stale_snapshot_guard_carries_expected_status() {
    // Two pickers race: both planned against PENDING. The service's CAS
    // update lets exactly one through; the plan records what it expects.
    let alice = vendor("alice");
    let bob = vendor("bob");
    let carol = vendor("carol");

    let request = deposit_request(&alice, "100.00");

    let bob_plan = plan_pick(&request, &bob, None).unwrap();
    let carol_plan = plan_pick(&request, &carol, None).unwrap();

    assert_eq!(bob_plan.expect, RequestStatus::Pending);
    assert_eq!(carol_plan.expect, RequestStatus::Pending);

    // After bob's plan lands, carol's snapshot is stale; replanning from
    // the updated row fails outright.
    let mut updated = request.clone();
    apply(&mut updated, &bob_plan.update);
    let result = plan_pick(&updated, &carol, None);
    assert!(matches!(result, Err(EngineError::StateConflict(_))));
}

#[test]
fn qa_cancelled_request_rejects_every_operation() {
    let alice = vendor("alice");
    let bob = vendor("bob");

    let mut request = deposit_request(&alice, "100.00");
    let plan = plan_cancel(&request, &alice, Some("posted twice".into())).unwrap();
    apply(&mut request, &plan.update);

    assert!(request.deleted_at.is_some());

    // Tombstoned rows are invisible to the lifecycle.
    assert!(matches!(
        plan_pick(&request, &bob, None),
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        plan_cancel(&request, &alice, None),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn qa_money_conservation_across_split_chain() {
    // Split a 1000 request three ways and verify the face amounts always
    // sum back to 1000, with decimal-exact arithmetic.
    let alice = vendor("alice");
    let pickers = [vendor("p1"), vendor("p2"), vendor("p3")];
    let cuts = ["333.33", "333.33"];

    let mut open = deposit_request(&alice, "1000.00");
    let mut picked_total = Decimal::ZERO;

    for (picker, cut) in pickers.iter().zip(cuts) {
        let plan = plan_pick(&open, picker, Some(dec(cut))).unwrap();
        let sibling = plan.spawn.expect("cut below face amount splits");

        let mut picked = open.clone();
        apply(&mut picked, &plan.update);
        picked_total += picked.amount;

        open = sibling.into_request();
    }

    // Last picker takes the remainder in full.
    let plan = plan_pick(&open, &pickers[2], None).unwrap();
    assert!(plan.spawn.is_none());
    let mut picked = open.clone();
    apply(&mut picked, &plan.update);
    picked_total += picked.amount;

    assert_eq!(picked_total, dec("1000.00"));
    assert_eq!(picked.amount, dec("333.34"));
}
