//! Vendor and super-admin accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Exactly one SUPER_ADMIN is expected to exist; it is the
/// counterparty of last resort and carries the global withdrawal cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum UserRole {
    SuperAdmin = 0,
    Vendor = 1,
}

impl UserRole {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::SuperAdmin),
            1 => Some(UserRole::Vendor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Vendor => "VENDOR",
        }
    }
}

/// How a vendor's withdrawal cap is resolved at request creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum WithdrawalLimitConfig {
    /// Fall back to the super admin's configured cap.
    Global = 0,
    /// Enforce the vendor's own `max_withdrawal_limit`.
    Custom = 1,
    /// No cap.
    Unlimited = 2,
}

impl WithdrawalLimitConfig {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(WithdrawalLimitConfig::Global),
            1 => Some(WithdrawalLimitConfig::Custom),
            2 => Some(WithdrawalLimitConfig::Unlimited),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalLimitConfig::Global => "GLOBAL",
            WithdrawalLimitConfig::Custom => "CUSTOM",
            WithdrawalLimitConfig::Unlimited => "UNLIMITED",
        }
    }
}

/// Payment-receiving bank coordinates, stored as a JSONB snapshot both on
/// the user profile and on each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_holder_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
    pub withdrawal_limit_config: WithdrawalLimitConfig,
    pub max_withdrawal_limit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// A user can receive money only with at least one destination on file.
    pub fn has_payment_destination(&self) -> bool {
        self.bank_details.is_some() || self.upi_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_roundtrip() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Vendor));
        assert_eq!(UserRole::from_id(2), None);
        assert_eq!(UserRole::Vendor.id(), 1);
    }

    #[test]
    fn test_limit_config_roundtrip() {
        for config in [
            WithdrawalLimitConfig::Global,
            WithdrawalLimitConfig::Custom,
            WithdrawalLimitConfig::Unlimited,
        ] {
            assert_eq!(WithdrawalLimitConfig::from_id(config.id()), Some(config));
        }
        assert_eq!(WithdrawalLimitConfig::from_id(99), None);
    }

    #[test]
    fn test_bank_details_serde_omits_missing_fields() {
        let details = BankDetails {
            account_number: Some("1234567890".to_string()),
            ifsc_code: Some("HDFC0001234".to_string()),
            bank_name: None,
            account_holder_name: None,
        };
        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains("account_number"));
        assert!(!json.contains("bank_name"));
    }
}
