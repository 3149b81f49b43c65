//! Append-only audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a request. One log row is written per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum LogAction {
    Created = 1,
    Picked = 2,
    PaymentUploaded = 3,
    PaymentApproved = 4,
    PartialPaymentApproved = 5,
    PaymentRejected = 6,
    PaymentFailed = 7,
    RequestReverted = 8,
    RequestCancelled = 9,
}

impl LogAction {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(LogAction::Created),
            2 => Some(LogAction::Picked),
            3 => Some(LogAction::PaymentUploaded),
            4 => Some(LogAction::PaymentApproved),
            5 => Some(LogAction::PartialPaymentApproved),
            6 => Some(LogAction::PaymentRejected),
            7 => Some(LogAction::PaymentFailed),
            8 => Some(LogAction::RequestReverted),
            9 => Some(LogAction::RequestCancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Created => "CREATED",
            LogAction::Picked => "PICKED",
            LogAction::PaymentUploaded => "PAYMENT_UPLOADED",
            LogAction::PaymentApproved => "PAYMENT_APPROVED",
            LogAction::PartialPaymentApproved => "PARTIAL_PAYMENT_APPROVED",
            LogAction::PaymentRejected => "PAYMENT_REJECTED",
            LogAction::PaymentFailed => "PAYMENT_FAILED",
            LogAction::RequestReverted => "REQUEST_REVERTED",
            LogAction::RequestCancelled => "REQUEST_CANCELLED",
        }
    }
}

/// One immutable audit entry. `metadata` is a schema-less JSON object whose
/// shape varies by action (amounts, related ids).
#[derive(Debug, Clone, Serialize)]
pub struct RequestLog {
    pub id: Uuid,
    pub request_id: Uuid,
    pub actor_id: Uuid,
    pub action: LogAction,
    pub comment: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_action_roundtrip() {
        for id in 1..=9 {
            let action = LogAction::from_id(id).unwrap();
            assert_eq!(action.id(), id);
        }
        assert_eq!(LogAction::from_id(0), None);
        assert_eq!(LogAction::from_id(10), None);
    }
}
