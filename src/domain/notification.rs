//! Fire-and-forget user notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum NotificationKind {
    RequestPicked = 1,
    PaymentUploaded = 2,
    PaymentApproved = 3,
    PaymentRejected = 4,
    PaymentFailed = 5,
    RequestCancelled = 6,
    AdminAlert = 7,
}

impl NotificationKind {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(NotificationKind::RequestPicked),
            2 => Some(NotificationKind::PaymentUploaded),
            3 => Some(NotificationKind::PaymentApproved),
            4 => Some(NotificationKind::PaymentRejected),
            5 => Some(NotificationKind::PaymentFailed),
            6 => Some(NotificationKind::RequestCancelled),
            7 => Some(NotificationKind::AdminAlert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RequestPicked => "REQUEST_PICKED",
            NotificationKind::PaymentUploaded => "PAYMENT_UPLOADED",
            NotificationKind::PaymentApproved => "PAYMENT_APPROVED",
            NotificationKind::PaymentRejected => "PAYMENT_REJECTED",
            NotificationKind::PaymentFailed => "PAYMENT_FAILED",
            NotificationKind::RequestCancelled => "REQUEST_CANCELLED",
            NotificationKind::AdminAlert => "ADMIN_ALERT",
        }
    }
}

/// A message targeted at one user, optionally linking a request. Mutated
/// only by read-state toggling.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_kind_roundtrip() {
        for id in 1..=7 {
            let kind = NotificationKind::from_id(id).unwrap();
            assert_eq!(kind.id(), id);
        }
        assert_eq!(NotificationKind::from_id(8), None);
    }
}
