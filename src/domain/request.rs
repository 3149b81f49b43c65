//! The settlement request - the central entity of the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::BankDetails;

/// Direction of the money movement from the creator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum RequestType {
    Withdrawal = 1,
    Deposit = 2,
}

impl RequestType {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(RequestType::Withdrawal),
            2 => Some(RequestType::Deposit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Withdrawal => "WITHDRAWAL",
            RequestType::Deposit => "DEPOSIT",
        }
    }

    /// What the request looks like to a prospective picker: someone else's
    /// withdrawal is a deposit opportunity, and vice versa.
    pub fn inverted(&self) -> Self {
        match self {
            RequestType::Withdrawal => RequestType::Deposit,
            RequestType::Deposit => RequestType::Withdrawal,
        }
    }
}

/// Request lifecycle status.
///
/// PENDING -> PICKED -> PAID_PARTIAL/PAID_FULL -> COMPLETED | REJECTED,
/// with PAYMENT_FAILED reachable from PICKED/PAID_PARTIAL and revertable
/// back to PENDING. Cancellation tombstones a PENDING request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 1,
    Picked = 2,
    PaidPartial = 3,
    PaidFull = 4,
    Completed = 5,
    Rejected = 6,
    PaymentFailed = 7,
}

impl RequestStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(RequestStatus::Pending),
            2 => Some(RequestStatus::Picked),
            3 => Some(RequestStatus::PaidPartial),
            4 => Some(RequestStatus::PaidFull),
            5 => Some(RequestStatus::Completed),
            6 => Some(RequestStatus::Rejected),
            7 => Some(RequestStatus::PaymentFailed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Picked => "PICKED",
            RequestStatus::PaidPartial => "PAID_PARTIAL",
            RequestStatus::PaidFull => "PAID_FULL",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::PaymentFailed => "PAYMENT_FAILED",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }

    /// States in which the picker may upload payment proof or report a
    /// failed payment.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, RequestStatus::Picked | RequestStatus::PaidPartial)
    }

    /// States in which the creator may approve or reject.
    pub fn awaits_verification(&self) -> bool {
        matches!(self, RequestStatus::PaidPartial | RequestStatus::PaidFull)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of money movement posted by a vendor, awaiting a counterparty.
///
/// Invariant: `paid_amount + pending_amount == amount` whenever the status
/// is PICKED, PAID_PARTIAL or PAID_FULL.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub amount: Decimal,
    pub status: RequestStatus,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub rejection_reason: Option<String>,
    pub payment_failure_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_by: Uuid,
    pub picked_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Request {
    /// Balance bookkeeping must always reconcile against the face amount.
    pub fn amounts_reconcile(&self) -> bool {
        self.paid_amount + self.pending_amount == self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_roundtrip() {
        assert_eq!(RequestType::from_id(1), Some(RequestType::Withdrawal));
        assert_eq!(RequestType::from_id(2), Some(RequestType::Deposit));
        assert_eq!(RequestType::from_id(0), None);
    }

    #[test]
    fn test_request_type_inversion() {
        assert_eq!(RequestType::Withdrawal.inverted(), RequestType::Deposit);
        assert_eq!(RequestType::Deposit.inverted(), RequestType::Withdrawal);
    }

    #[test]
    fn test_status_roundtrip() {
        for id in 1..=7 {
            let status = RequestStatus::from_id(id).unwrap();
            assert_eq!(status.id(), id);
        }
        assert_eq!(RequestStatus::from_id(0), None);
        assert_eq!(RequestStatus::from_id(8), None);
    }

    #[test]
    fn test_status_predicates() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());

        assert!(RequestStatus::Picked.accepts_payment());
        assert!(RequestStatus::PaidPartial.accepts_payment());
        assert!(!RequestStatus::PaidFull.accepts_payment());

        assert!(RequestStatus::PaidFull.awaits_verification());
        assert!(RequestStatus::PaidPartial.awaits_verification());
        assert!(!RequestStatus::Picked.awaits_verification());
    }
}
