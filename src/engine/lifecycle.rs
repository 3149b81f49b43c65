//! Pure transition planners.
//!
//! Each planner validates an operation against a request snapshot and
//! returns a [`TransitionPlan`]: the status change plus every side effect
//! it entails (spawned remainder request, slip append, settlement order,
//! audit entry, notices). Planners never touch the database; the service
//! executes plans transactionally. This keeps remainder spawning and
//! settlement amounts unit-testable without storage.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use super::error::EngineError;
use super::limits;
use crate::domain::{
    BankDetails, LogAction, NotificationKind, Request, RequestStatus, RequestType, User,
};
use crate::money::{format_inr, normalize};

/// Notification target. The super admin is resolved by role query at emit
/// time, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    SuperAdmin,
}

/// One notification to emit after the transition commits.
#[derive(Debug, Clone)]
pub struct Notice {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub message: String,
    pub request_id: Option<Uuid>,
}

/// One audit entry to append inside the transition's transaction.
#[derive(Debug, Clone)]
pub struct LogDraft {
    pub request_id: Uuid,
    pub actor_id: Uuid,
    pub action: LogAction,
    pub comment: String,
    pub metadata: serde_json::Value,
}

/// A request to spawn alongside a transition (split remainder, approval
/// remainder, or rejection reopen). Always PENDING, always inheriting the
/// original owner and destination snapshot.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub id: Uuid,
    pub kind: RequestType,
    pub amount: Decimal,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
    pub created_by: Uuid,
}

impl NewRequest {
    pub fn into_request(self) -> Request {
        let now = Utc::now();
        Request {
            id: self.id,
            kind: self.kind,
            amount: self.amount,
            status: RequestStatus::Pending,
            bank_details: self.bank_details,
            upi_id: self.upi_id,
            qr_code: self.qr_code,
            paid_amount: Decimal::ZERO,
            pending_amount: self.amount,
            rejection_reason: None,
            payment_failure_reason: None,
            cancellation_reason: None,
            created_by: self.created_by,
            picked_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Settlement to post on approval: a mirrored transaction pair for the
/// amount actually paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOrder {
    pub request_id: Uuid,
    pub creator: Uuid,
    pub picker: Uuid,
    pub kind: RequestType,
    pub amount: Decimal,
}

/// Payment slip to append with an upload transition.
#[derive(Debug, Clone)]
pub struct SlipDraft {
    pub id: Uuid,
    pub amount: Decimal,
    pub evidence_ref: String,
}

/// Column changes to apply to the transitioning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUpdate {
    /// PENDING -> PICKED, optionally shrunk to the picked amount.
    Pick {
        amount: Decimal,
        pending_amount: Decimal,
        picked_by: Uuid,
    },
    /// Accumulated payment after a slip upload.
    PaymentProgress {
        paid_amount: Decimal,
        pending_amount: Decimal,
        status: RequestStatus,
    },
    /// Approval: -> COMPLETED.
    Complete,
    /// Rejection: -> REJECTED, picker retained.
    Reject { reason: String },
    /// Picker-reported failure: -> PAYMENT_FAILED.
    Fail { reason: String },
    /// Owner revert after failure: -> PENDING, picker cleared, destination
    /// optionally replaced.
    Revert {
        bank_details: Option<BankDetails>,
        upi_id: Option<String>,
    },
    /// Cancellation of an unmatched request: tombstone.
    Cancel { reason: String },
}

/// A validated transition and its complete side-effect list.
///
/// `expect` is the status the request must still hold at execution time;
/// the service's UPDATE carries it in the WHERE clause so a concurrent
/// winner makes the loser fail instead of silently overwriting.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    pub request_id: Uuid,
    pub expect: RequestStatus,
    pub update: RequestUpdate,
    pub spawn: Option<NewRequest>,
    pub spawn_log: Option<LogDraft>,
    pub slip: Option<SlipDraft>,
    pub settlement: Option<SettlementOrder>,
    pub log: LogDraft,
    pub notices: Vec<Notice>,
}

impl TransitionPlan {
    fn new(request: &Request, update: RequestUpdate, log: LogDraft) -> Self {
        Self {
            request_id: request.id,
            expect: request.status,
            update,
            spawn: None,
            spawn_log: None,
            slip: None,
            settlement: None,
            log,
            notices: Vec::new(),
        }
    }
}

/// Validated input for creating a request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub kind: RequestType,
    pub amount: Decimal,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Tombstoned requests are invisible to every operation.
fn ensure_live(request: &Request) -> Result<(), EngineError> {
    if request.deleted_at.is_some() {
        return Err(EngineError::NotFound("Request"));
    }
    Ok(())
}

fn spawned_from(request: &Request, amount: Decimal) -> NewRequest {
    NewRequest {
        id: Uuid::new_v4(),
        kind: request.kind,
        amount,
        bank_details: request.bank_details.clone(),
        upi_id: request.upi_id.clone(),
        qr_code: request.qr_code.clone(),
        created_by: request.created_by,
    }
}

/// Plan request creation. The withdrawal limit policy runs here and only
/// here; limits are never re-evaluated retroactively.
pub fn plan_create(
    input: CreateRequest,
    owner: &User,
    admin: Option<&User>,
) -> Result<(NewRequest, LogDraft), EngineError> {
    if input.amount <= Decimal::ZERO {
        return Err(EngineError::Validation("Amount must be positive".into()));
    }

    if input.kind == RequestType::Withdrawal {
        limits::check_withdrawal_limit(owner, admin, input.amount)?;
    }

    let request = NewRequest {
        id: Uuid::new_v4(),
        kind: input.kind,
        amount: input.amount,
        bank_details: input.bank_details,
        upi_id: input.upi_id,
        qr_code: input.qr_code,
        created_by: owner.id,
    };

    let log = LogDraft {
        request_id: request.id,
        actor_id: owner.id,
        action: LogAction::Created,
        comment: format!("Request created for {}", format_inr(request.amount)),
        metadata: json!({ "type": request.kind.as_str(), "amount": request.amount }),
    };

    Ok((request, log))
}

/// Plan a withdrawal created on behalf of the super admin. The admin must
/// have a payment destination on file to receive the cash.
pub fn plan_admin_withdrawal(
    amount: Decimal,
    admin: &User,
) -> Result<(NewRequest, LogDraft), EngineError> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::Validation("Amount must be positive".into()));
    }

    if !admin.has_payment_destination() {
        return Err(EngineError::Validation(
            "Admin bank details not configured".into(),
        ));
    }

    let request = NewRequest {
        id: Uuid::new_v4(),
        kind: RequestType::Withdrawal,
        amount,
        bank_details: admin.bank_details.clone(),
        upi_id: admin.upi_id.clone(),
        qr_code: admin.qr_code.clone(),
        created_by: admin.id,
    };

    let log = LogDraft {
        request_id: request.id,
        actor_id: admin.id,
        action: LogAction::Created,
        comment: format!("Admin withdrawal request created for {}", format_inr(amount)),
        metadata: json!({
            "type": RequestType::Withdrawal.as_str(),
            "amount": amount,
            "created_by": "system",
        }),
    };

    Ok((request, log))
}

/// Plan a pick, splitting the request when `pick_amount` covers only part
/// of it. The shrunk request keeps its id; the remainder becomes a fresh
/// PENDING sibling immediately available to other pickers.
pub fn plan_pick(
    request: &Request,
    picker: &User,
    pick_amount: Option<Decimal>,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.created_by == picker.id {
        return Err(EngineError::Forbidden(
            "You cannot pick your own request".into(),
        ));
    }

    if request.status != RequestStatus::Pending {
        return Err(EngineError::StateConflict(
            "Request is no longer available".into(),
        ));
    }

    let picked_amount = match pick_amount {
        Some(amount) if amount > request.amount => {
            return Err(EngineError::Validation(format!(
                "Cannot pick more than the available request amount of {}",
                format_inr(request.amount)
            )));
        }
        Some(amount) if amount < request.amount => amount,
        _ => request.amount,
    };

    let remainder = normalize(request.amount - picked_amount);

    let log = LogDraft {
        request_id: request.id,
        actor_id: picker.id,
        action: LogAction::Picked,
        comment: format!(
            "Request picked by {} for {}",
            picker.name,
            format_inr(picked_amount)
        ),
        metadata: json!({
            "picked_amount": picked_amount,
            "original_amount": request.amount,
        }),
    };

    let mut plan = TransitionPlan::new(
        request,
        RequestUpdate::Pick {
            amount: picked_amount,
            pending_amount: picked_amount,
            picked_by: picker.id,
        },
        log,
    );

    plan.notices.push(Notice {
        recipient: Recipient::User(request.created_by),
        kind: NotificationKind::RequestPicked,
        message: format!(
            "Your {} request of {} has been picked",
            request.kind.as_str().to_lowercase(),
            format_inr(picked_amount)
        ),
        request_id: Some(request.id),
    });

    if remainder > Decimal::ZERO {
        let sibling = spawned_from(request, remainder);

        plan.spawn_log = Some(LogDraft {
            request_id: sibling.id,
            actor_id: request.created_by,
            action: LogAction::Created,
            comment: format!(
                "Remaining request auto-created after split pick of {}",
                format_inr(picked_amount)
            ),
            metadata: json!({
                "type": sibling.kind.as_str(),
                "amount": sibling.amount,
                "parent_request_id": request.id,
            }),
        });

        plan.notices.push(Notice {
            recipient: Recipient::User(request.created_by),
            kind: NotificationKind::RequestPicked,
            message: format!(
                "Your request was split. {} was picked, and a new request for {} is now pending.",
                format_inr(picked_amount),
                format_inr(remainder)
            ),
            request_id: Some(sibling.id),
        });

        plan.spawn = Some(sibling);
    }

    Ok(plan)
}

/// Plan a payment-proof upload. Slips accumulate; the request goes
/// PAID_FULL once the paid total covers the face amount, else PAID_PARTIAL.
pub fn plan_upload(
    request: &Request,
    picker: &User,
    amount: Decimal,
    evidence_ref: String,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.picked_by != Some(picker.id) {
        return Err(EngineError::Forbidden(
            "You are not authorized to upload a payment slip for this request".into(),
        ));
    }

    if !request.status.accepts_payment() {
        return Err(EngineError::StateConflict(
            "Cannot upload a payment slip for this request".into(),
        ));
    }

    let paid_amount = normalize(request.paid_amount + amount);
    let pending_amount = normalize((request.amount - paid_amount).max(Decimal::ZERO));
    let status = if paid_amount >= request.amount {
        RequestStatus::PaidFull
    } else {
        RequestStatus::PaidPartial
    };

    let log = LogDraft {
        request_id: request.id,
        actor_id: picker.id,
        action: LogAction::PaymentUploaded,
        comment: format!(
            "Payment slip uploaded by {} for {}",
            picker.name,
            format_inr(amount)
        ),
        metadata: json!({
            "amount": amount,
            "total_paid": paid_amount,
            "pending": pending_amount,
        }),
    };

    let mut plan = TransitionPlan::new(
        request,
        RequestUpdate::PaymentProgress {
            paid_amount,
            pending_amount,
            status,
        },
        log,
    );

    plan.slip = Some(SlipDraft {
        id: Uuid::new_v4(),
        amount,
        evidence_ref,
    });

    plan.notices.push(Notice {
        recipient: Recipient::User(request.created_by),
        kind: NotificationKind::PaymentUploaded,
        message: format!(
            "Payment slip uploaded for your {} request. Amount: {}",
            request.kind.as_str().to_lowercase(),
            format_inr(amount)
        ),
        request_id: Some(request.id),
    });

    Ok(plan)
}

/// Plan verification by the creator.
///
/// Approval settles the *paid* amount and, when anything is still unpaid,
/// spawns a fresh PENDING request for exactly the remainder. Rejection
/// keeps the picker on the terminal record and reopens the full original
/// amount for anyone to pick; prior slips are deliberately not netted out.
pub fn plan_verify(
    request: &Request,
    owner: &User,
    picker_name: Option<&str>,
    approved: bool,
    rejection_reason: Option<String>,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.created_by != owner.id {
        return Err(EngineError::Forbidden(
            "You are not authorized to verify this payment".into(),
        ));
    }

    if !request.status.awaits_verification() {
        return Err(EngineError::StateConflict("No payment to verify".into()));
    }

    let picker_id = request
        .picked_by
        .ok_or_else(|| EngineError::StateConflict("No payment to verify".into()))?;
    let picker_name = picker_name.unwrap_or("vendor");

    if approved {
        let has_pending = request.pending_amount > Decimal::ZERO;

        let log = LogDraft {
            request_id: request.id,
            actor_id: owner.id,
            action: if has_pending {
                LogAction::PartialPaymentApproved
            } else {
                LogAction::PaymentApproved
            },
            comment: if has_pending {
                format!(
                    "Partial payment of {} approved. Pending: {}",
                    format_inr(request.paid_amount),
                    format_inr(request.pending_amount)
                )
            } else {
                format!("Payment of {} approved", format_inr(request.paid_amount))
            },
            metadata: json!({
                "paid_amount": request.paid_amount,
                "pending_amount": request.pending_amount,
            }),
        };

        let mut plan = TransitionPlan::new(request, RequestUpdate::Complete, log);

        plan.settlement = Some(SettlementOrder {
            request_id: request.id,
            creator: request.created_by,
            picker: picker_id,
            kind: request.kind,
            amount: request.paid_amount,
        });

        plan.notices.push(Notice {
            recipient: Recipient::User(picker_id),
            kind: NotificationKind::PaymentApproved,
            message: format!(
                "Your payment for request #{} has been approved",
                short_id(request.id)
            ),
            request_id: Some(request.id),
        });

        plan.notices.push(Notice {
            recipient: Recipient::SuperAdmin,
            kind: NotificationKind::AdminAlert,
            message: format!(
                "Payment approved for request #{}. Vendor: {}",
                short_id(request.id),
                picker_name
            ),
            request_id: Some(request.id),
        });

        if has_pending {
            let remainder = spawned_from(request, request.pending_amount);

            plan.notices.push(Notice {
                recipient: Recipient::User(request.created_by),
                kind: NotificationKind::RequestPicked,
                message: format!(
                    "New request created for pending amount {} from request #{}",
                    format_inr(request.pending_amount),
                    short_id(request.id)
                ),
                request_id: Some(remainder.id),
            });

            plan.spawn = Some(remainder);
        }

        Ok(plan)
    } else {
        let reason = rejection_reason.unwrap_or_else(|| "Payment rejected".to_string());

        let log = LogDraft {
            request_id: request.id,
            actor_id: owner.id,
            action: LogAction::PaymentRejected,
            comment: reason.clone(),
            metadata: json!({ "rejected_amount": request.amount }),
        };

        let mut plan = TransitionPlan::new(
            request,
            RequestUpdate::Reject {
                reason: reason.clone(),
            },
            log,
        );

        let reopened = spawned_from(request, request.amount);

        plan.notices.push(Notice {
            recipient: Recipient::User(picker_id),
            kind: NotificationKind::PaymentRejected,
            message: format!(
                "Your payment for request #{} has been rejected. Reason: {}",
                short_id(request.id),
                reason
            ),
            request_id: Some(request.id),
        });

        plan.notices.push(Notice {
            recipient: Recipient::User(request.created_by),
            kind: NotificationKind::RequestPicked,
            message: format!(
                "New request created after rejection of request #{}",
                short_id(request.id)
            ),
            request_id: Some(reopened.id),
        });

        plan.notices.push(Notice {
            recipient: Recipient::SuperAdmin,
            kind: NotificationKind::AdminAlert,
            message: format!(
                "Payment rejected for request #{}. Vendor: {}. New request created.",
                short_id(request.id),
                picker_name
            ),
            request_id: Some(request.id),
        });

        plan.spawn = Some(reopened);

        Ok(plan)
    }
}

/// Plan a picker-reported payment failure.
pub fn plan_report_failure(
    request: &Request,
    picker: &User,
    reason: String,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.picked_by != Some(picker.id) {
        return Err(EngineError::Forbidden(
            "You are not authorized to report a payment failure for this request".into(),
        ));
    }

    if !request.status.accepts_payment() {
        return Err(EngineError::StateConflict(
            "Cannot report a payment failure for this request status".into(),
        ));
    }

    let log = LogDraft {
        request_id: request.id,
        actor_id: picker.id,
        action: LogAction::PaymentFailed,
        comment: format!("Payment failure reported by {}: {}", picker.name, reason),
        metadata: json!({ "reason": reason }),
    };

    let mut plan = TransitionPlan::new(
        request,
        RequestUpdate::Fail {
            reason: reason.clone(),
        },
        log,
    );

    plan.notices.push(Notice {
        recipient: Recipient::User(request.created_by),
        kind: NotificationKind::PaymentFailed,
        message: format!(
            "Payment failed for your {} request. Reason: {}",
            request.kind.as_str().to_lowercase(),
            reason
        ),
        request_id: Some(request.id),
    });

    Ok(plan)
}

/// Plan an owner revert of a failed payment: back to PENDING with the
/// picker cleared, optionally with fresh destination details.
pub fn plan_revert(
    request: &Request,
    owner: &User,
    bank_details: Option<BankDetails>,
    upi_id: Option<String>,
    comment: Option<String>,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.created_by != owner.id {
        return Err(EngineError::Forbidden(
            "You are not authorized to revert this request".into(),
        ));
    }

    if request.status != RequestStatus::PaymentFailed {
        return Err(EngineError::StateConflict(
            "Only failed payment requests can be reverted".into(),
        ));
    }

    let previous_picker = request.picked_by;

    let log = LogDraft {
        request_id: request.id,
        actor_id: owner.id,
        action: LogAction::RequestReverted,
        comment: comment
            .unwrap_or_else(|| "Request reverted and details updated after payment failure".into()),
        metadata: json!({
            "bank_details_updated": bank_details.is_some(),
            "upi_id_updated": upi_id.is_some(),
        }),
    };

    let mut plan = TransitionPlan::new(
        request,
        RequestUpdate::Revert {
            bank_details,
            upi_id,
        },
        log,
    );

    if let Some(picker_id) = previous_picker {
        plan.notices.push(Notice {
            recipient: Recipient::User(picker_id),
            kind: NotificationKind::PaymentFailed,
            message: format!(
                "Request #{} has been reverted by the creator. You can pick it again if available.",
                short_id(request.id)
            ),
            request_id: Some(request.id),
        });
    }

    Ok(plan)
}

/// Plan cancellation of an unmatched request. Tombstones the row; it
/// leaves active listings but stays queryable for audit.
pub fn plan_cancel(
    request: &Request,
    owner: &User,
    reason: Option<String>,
) -> Result<TransitionPlan, EngineError> {
    ensure_live(request)?;

    if request.created_by != owner.id {
        return Err(EngineError::Forbidden(
            "You are not authorized to delete this request".into(),
        ));
    }

    if request.status != RequestStatus::Pending {
        return Err(EngineError::StateConflict(
            "Only pending requests can be deleted".into(),
        ));
    }

    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

    let log = LogDraft {
        request_id: request.id,
        actor_id: owner.id,
        action: LogAction::RequestCancelled,
        comment: format!("Request cancelled by {}: {}", owner.name, reason),
        metadata: json!({ "reason": reason }),
    };

    let mut plan = TransitionPlan::new(
        request,
        RequestUpdate::Cancel {
            reason: reason.clone(),
        },
        log,
    );

    plan.notices.push(Notice {
        recipient: Recipient::SuperAdmin,
        kind: NotificationKind::RequestCancelled,
        message: format!(
            "Request #{} cancelled by {}. Reason: {}",
            short_id(request.id),
            owner.name,
            reason
        ),
        request_id: Some(request.id),
    });

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserRole, WithdrawalLimitConfig};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn vendor(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@test.local", name),
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

    fn pending_request(owner: &User, amount: &str) -> Request {
        let amount = dec(amount);
        Request {
            id: Uuid::new_v4(),
            kind: RequestType::Deposit,
            amount,
            status: RequestStatus::Pending,
            bank_details: Some(BankDetails {
                account_number: Some("1234567890".into()),
                ifsc_code: Some("HDFC0001234".into()),
                bank_name: Some("HDFC".into()),
                account_holder_name: Some(owner.name.clone()),
            }),
            upi_id: Some("owner@upi".into()),
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

    fn picked_request(owner: &User, picker: &User, amount: &str) -> Request {
        let mut request = pending_request(owner, amount);
        request.status = RequestStatus::Picked;
        request.picked_by = Some(picker.id);
        request
    }

    // --- create ---

    #[test]
    fn test_create_deposit() {
        let owner = vendor("alice");
        let (request, log) = plan_create(
            CreateRequest {
                kind: RequestType::Deposit,
                amount: dec("250.00"),
                bank_details: None,
                upi_id: Some("alice@upi".into()),
                qr_code: None,
            },
            &owner,
            None,
        )
        .unwrap();

        assert_eq!(request.created_by, owner.id);
        assert_eq!(log.action, LogAction::Created);

        let row = request.into_request();
        assert_eq!(row.status, RequestStatus::Pending);
        assert_eq!(row.pending_amount, dec("250.00"));
        assert_eq!(row.paid_amount, Decimal::ZERO);
        assert!(row.amounts_reconcile());
    }

    #[test]
    fn test_create_withdrawal_over_custom_limit_fails() {
        let mut owner = vendor("alice");
        owner.withdrawal_limit_config = WithdrawalLimitConfig::Custom;
        owner.max_withdrawal_limit = Some(dec("500"));

        let result = plan_create(
            CreateRequest {
                kind: RequestType::Withdrawal,
                amount: dec("600"),
                bank_details: None,
                upi_id: None,
                qr_code: None,
            },
            &owner,
            None,
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_create_withdrawal_at_custom_limit_succeeds() {
        let mut owner = vendor("alice");
        owner.withdrawal_limit_config = WithdrawalLimitConfig::Custom;
        owner.max_withdrawal_limit = Some(dec("500"));

        let result = plan_create(
            CreateRequest {
                kind: RequestType::Withdrawal,
                amount: dec("500"),
                bank_details: None,
                upi_id: None,
                qr_code: None,
            },
            &owner,
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_admin_withdrawal_needs_destination() {
        let mut admin = vendor("admin");
        admin.role = UserRole::SuperAdmin;
        assert!(matches!(
            plan_admin_withdrawal(dec("100"), &admin),
            Err(EngineError::Validation(_))
        ));

        admin.upi_id = Some("admin@upi".into());
        let (request, _) = plan_admin_withdrawal(dec("100"), &admin).unwrap();
        assert_eq!(request.kind, RequestType::Withdrawal);
        assert_eq!(request.created_by, admin.id);
    }

    // --- pick ---

    #[test]
    fn test_full_pick_no_split() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = pending_request(&owner, "100.00");

        let plan = plan_pick(&request, &picker, None).unwrap();

        assert_eq!(plan.expect, RequestStatus::Pending);
        assert_eq!(
            plan.update,
            RequestUpdate::Pick {
                amount: dec("100.00"),
                pending_amount: dec("100.00"),
                picked_by: picker.id,
            }
        );
        assert!(plan.spawn.is_none());
        assert!(plan.spawn_log.is_none());
        assert_eq!(plan.log.action, LogAction::Picked);
        assert_eq!(plan.notices.len(), 1);
    }

    #[test]
    fn test_pick_exact_amount_is_full_pick() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = pending_request(&owner, "100.00");

        let plan = plan_pick(&request, &picker, Some(dec("100.00"))).unwrap();
        assert!(plan.spawn.is_none());
    }

    #[test]
    fn test_partial_pick_splits_and_conserves_total() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = pending_request(&owner, "100.00");

        let plan = plan_pick(&request, &picker, Some(dec("40.00"))).unwrap();

        let RequestUpdate::Pick {
            amount,
            pending_amount,
            picked_by,
        } = &plan.update
        else {
            panic!("expected pick update");
        };
        assert_eq!(*amount, dec("40.00"));
        assert_eq!(*pending_amount, dec("40.00"));
        assert_eq!(*picked_by, picker.id);

        let sibling = plan.spawn.as_ref().expect("split spawns a sibling");
        assert_eq!(sibling.amount, dec("60.00"));
        assert_eq!(sibling.created_by, owner.id);
        assert_eq!(sibling.kind, request.kind);
        assert_eq!(sibling.upi_id, request.upi_id);
        assert_eq!(*amount + sibling.amount, request.amount);

        let spawn_log = plan.spawn_log.as_ref().expect("sibling gets CREATED log");
        assert_eq!(spawn_log.action, LogAction::Created);
        assert_eq!(spawn_log.request_id, sibling.id);

        // Owner is told about the pick and about the split sibling.
        assert_eq!(plan.notices.len(), 2);
        assert!(
            plan.notices
                .iter()
                .all(|n| n.recipient == Recipient::User(owner.id))
        );
    }

    #[test]
    fn test_self_pick_forbidden() {
        let owner = vendor("alice");
        let request = pending_request(&owner, "100.00");

        let result = plan_pick(&request, &owner, None);
        assert!(matches!(result, Err(EngineError::Forbidden(_))));
    }

    #[test]
    fn test_pick_non_pending_conflicts() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let other = vendor("carol");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_pick(&request, &other, None);
        assert!(matches!(result, Err(EngineError::StateConflict(_))));
    }

    #[test]
    fn test_overpick_rejected() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = pending_request(&owner, "100.00");

        let result = plan_pick(&request, &picker, Some(dec("100.01")));
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_pick_tombstoned_not_found() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = pending_request(&owner, "100.00");
        request.deleted_at = Some(Utc::now());

        let result = plan_pick(&request, &picker, None);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    // --- upload ---

    #[test]
    fn test_partial_upload_accumulates() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let plan = plan_upload(&request, &picker, dec("60.00"), "slip-1".into()).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::PaymentProgress {
                paid_amount: dec("60.00"),
                pending_amount: dec("40.00"),
                status: RequestStatus::PaidPartial,
            }
        );
        let slip = plan.slip.as_ref().expect("upload appends a slip");
        assert_eq!(slip.amount, dec("60.00"));
        assert_eq!(slip.evidence_ref, "slip-1");
    }

    #[test]
    fn test_second_upload_reaches_full() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidPartial;
        request.paid_amount = dec("60.00");
        request.pending_amount = dec("40.00");

        let plan = plan_upload(&request, &picker, dec("40.00"), "slip-2".into()).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::PaymentProgress {
                paid_amount: dec("100.00"),
                pending_amount: dec("0.00"),
                status: RequestStatus::PaidFull,
            }
        );
    }

    #[test]
    fn test_overpayment_clamps_pending_at_zero() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let plan = plan_upload(&request, &picker, dec("120.00"), "slip".into()).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::PaymentProgress {
                paid_amount: dec("120.00"),
                pending_amount: dec("0.00"),
                status: RequestStatus::PaidFull,
            }
        );
    }

    #[test]
    fn test_upload_by_stranger_forbidden() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let stranger = vendor("mallory");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_upload(&request, &stranger, dec("50.00"), "slip".into());
        assert!(matches!(result, Err(EngineError::Forbidden(_))));
    }

    #[test]
    fn test_upload_in_pending_conflicts() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = pending_request(&owner, "100.00");
        request.picked_by = Some(picker.id); // stale picker, already reverted

        let result = plan_upload(&request, &picker, dec("50.00"), "slip".into());
        assert!(matches!(result, Err(EngineError::StateConflict(_))));
    }

    // --- verify / approve ---

    #[test]
    fn test_full_approval_settles_paid_amount() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidFull;
        request.paid_amount = dec("100.00");
        request.pending_amount = Decimal::ZERO;

        let plan = plan_verify(&request, &owner, Some("bob"), true, None).unwrap();

        assert_eq!(plan.update, RequestUpdate::Complete);
        assert!(plan.spawn.is_none());
        assert_eq!(plan.log.action, LogAction::PaymentApproved);

        let settlement = plan.settlement.as_ref().expect("approval settles");
        assert_eq!(settlement.amount, dec("100.00"));
        assert_eq!(settlement.creator, owner.id);
        assert_eq!(settlement.picker, picker.id);
    }

    #[test]
    fn test_partial_approval_spawns_remainder() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidPartial;
        request.paid_amount = dec("60.00");
        request.pending_amount = dec("40.00");

        let plan = plan_verify(&request, &owner, Some("bob"), true, None).unwrap();

        assert_eq!(plan.log.action, LogAction::PartialPaymentApproved);

        // Settlement covers only what was actually paid.
        assert_eq!(plan.settlement.as_ref().unwrap().amount, dec("60.00"));

        let remainder = plan.spawn.as_ref().expect("unpaid remainder reopens");
        assert_eq!(remainder.amount, dec("40.00"));
        assert_eq!(remainder.created_by, owner.id);

        // Picker, admin, and owner (about the remainder) are notified.
        assert_eq!(plan.notices.len(), 3);
        assert!(
            plan.notices
                .iter()
                .any(|n| n.recipient == Recipient::SuperAdmin)
        );
    }

    #[test]
    fn test_verify_by_non_owner_forbidden() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidFull;

        let result = plan_verify(&request, &picker, Some("bob"), true, None);
        assert!(matches!(result, Err(EngineError::Forbidden(_))));
    }

    #[test]
    fn test_verify_without_payment_conflicts() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_verify(&request, &owner, Some("bob"), true, None);
        assert!(matches!(result, Err(EngineError::StateConflict(_))));
    }

    // --- verify / reject ---

    #[test]
    fn test_rejection_reopens_full_amount_without_settlement() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidFull;
        request.paid_amount = dec("100.00");
        request.pending_amount = Decimal::ZERO;

        let plan = plan_verify(
            &request,
            &owner,
            Some("bob"),
            false,
            Some("Slip does not match".into()),
        )
        .unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::Reject {
                reason: "Slip does not match".into()
            }
        );
        assert!(plan.settlement.is_none());
        assert_eq!(plan.log.action, LogAction::PaymentRejected);

        // Full do-over: prior payments are not netted out of the reopened
        // request.
        let reopened = plan.spawn.as_ref().expect("rejection reopens");
        assert_eq!(reopened.amount, dec("100.00"));
        assert_eq!(reopened.created_by, owner.id);

        assert_eq!(plan.notices.len(), 3);
    }

    #[test]
    fn test_rejection_defaults_reason() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaidPartial;
        request.paid_amount = dec("30.00");
        request.pending_amount = dec("70.00");

        let plan = plan_verify(&request, &owner, None, false, None).unwrap();
        assert_eq!(
            plan.update,
            RequestUpdate::Reject {
                reason: "Payment rejected".into()
            }
        );
    }

    // --- failure / revert ---

    #[test]
    fn test_report_failure() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let plan =
            plan_report_failure(&request, &picker, "Account number invalid".into()).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::Fail {
                reason: "Account number invalid".into()
            }
        );
        assert_eq!(plan.log.action, LogAction::PaymentFailed);
        assert_eq!(plan.notices.len(), 1);
    }

    #[test]
    fn test_report_failure_requires_picker() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_report_failure(&request, &owner, "nope".into());
        assert!(matches!(result, Err(EngineError::Forbidden(_))));
    }

    #[test]
    fn test_revert_notifies_previous_picker() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let mut request = picked_request(&owner, &picker, "100.00");
        request.status = RequestStatus::PaymentFailed;
        request.payment_failure_reason = Some("bad account".into());

        let new_details = BankDetails {
            account_number: Some("9999".into()),
            ..Default::default()
        };
        let plan = plan_revert(&request, &owner, Some(new_details.clone()), None, None).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::Revert {
                bank_details: Some(new_details),
                upi_id: None,
            }
        );
        assert_eq!(plan.log.action, LogAction::RequestReverted);
        assert_eq!(plan.notices.len(), 1);
        assert_eq!(plan.notices[0].recipient, Recipient::User(picker.id));
    }

    #[test]
    fn test_revert_requires_failed_status() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_revert(&request, &owner, None, None, None);
        assert!(matches!(result, Err(EngineError::StateConflict(_))));
    }

    // --- cancel ---

    #[test]
    fn test_cancel_pending_request() {
        let owner = vendor("alice");
        let request = pending_request(&owner, "100.00");

        let plan = plan_cancel(&request, &owner, Some("No longer needed".into())).unwrap();

        assert_eq!(
            plan.update,
            RequestUpdate::Cancel {
                reason: "No longer needed".into()
            }
        );
        assert_eq!(plan.log.action, LogAction::RequestCancelled);
        assert_eq!(plan.notices[0].recipient, Recipient::SuperAdmin);
    }

    #[test]
    fn test_cancel_picked_request_conflicts() {
        let owner = vendor("alice");
        let picker = vendor("bob");
        let request = picked_request(&owner, &picker, "100.00");

        let result = plan_cancel(&request, &owner, None);
        assert!(matches!(result, Err(EngineError::StateConflict(_))));
    }

    #[test]
    fn test_cancel_requires_owner() {
        let owner = vendor("alice");
        let other = vendor("bob");
        let request = pending_request(&owner, "100.00");

        let result = plan_cancel(&request, &other, None);
        assert!(matches!(result, Err(EngineError::Forbidden(_))));
    }
}
