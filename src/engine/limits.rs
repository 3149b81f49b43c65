//! Withdrawal limit policy.
//!
//! Pure decision over the requester's limit configuration, with the super
//! admin's cap as the GLOBAL fallback. Evaluated at request creation only,
//! never retroactively.

use rust_decimal::Decimal;

use super::error::EngineError;
use crate::domain::{User, WithdrawalLimitConfig};
use crate::money::format_inr;

/// Decide whether `amount` may be withdrawn by `requester`.
///
/// A missing cap under CUSTOM or GLOBAL means no cap is configured and the
/// withdrawal is allowed.
pub fn check_withdrawal_limit(
    requester: &User,
    admin: Option<&User>,
    amount: Decimal,
) -> Result<(), EngineError> {
    match requester.withdrawal_limit_config {
        WithdrawalLimitConfig::Unlimited => Ok(()),
        WithdrawalLimitConfig::Custom => match requester.max_withdrawal_limit {
            Some(limit) if amount > limit => Err(EngineError::Validation(format!(
                "Withdrawal amount cannot exceed your custom limit of {}",
                format_inr(limit)
            ))),
            _ => Ok(()),
        },
        WithdrawalLimitConfig::Global => {
            match admin.and_then(|admin| admin.max_withdrawal_limit) {
                Some(limit) if amount > limit => Err(EngineError::Validation(format!(
                    "Withdrawal amount cannot exceed the limit of {}",
                    format_inr(limit)
                ))),
                _ => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(config: WithdrawalLimitConfig, limit: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "vendor@test.local".to_string(),
            password_hash: String::new(),
            name: "Vendor".to_string(),
            role: UserRole::Vendor,
            bank_details: None,
            upi_id: None,
            qr_code: None,
            withdrawal_limit_config: config,
            max_withdrawal_limit: limit.map(|l| l.parse().unwrap()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn admin(limit: Option<&str>) -> User {
        let mut admin = user(WithdrawalLimitConfig::Unlimited, limit);
        admin.role = UserRole::SuperAdmin;
        admin
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_unlimited_always_allows() {
        let vendor = user(WithdrawalLimitConfig::Unlimited, None);
        assert!(check_withdrawal_limit(&vendor, None, dec("1000000")).is_ok());
    }

    #[test]
    fn test_custom_limit_enforced() {
        let vendor = user(WithdrawalLimitConfig::Custom, Some("500"));
        assert!(check_withdrawal_limit(&vendor, None, dec("500")).is_ok());
        let err = check_withdrawal_limit(&vendor, None, dec("600")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_custom_without_cap_allows() {
        let vendor = user(WithdrawalLimitConfig::Custom, None);
        assert!(check_withdrawal_limit(&vendor, None, dec("999999")).is_ok());
    }

    #[test]
    fn test_global_falls_back_to_admin_cap() {
        let vendor = user(WithdrawalLimitConfig::Global, None);
        let super_admin = admin(Some("1000"));
        assert!(check_withdrawal_limit(&vendor, Some(&super_admin), dec("1000")).is_ok());
        assert!(check_withdrawal_limit(&vendor, Some(&super_admin), dec("1000.01")).is_err());
    }

    #[test]
    fn test_global_without_admin_cap_allows() {
        let vendor = user(WithdrawalLimitConfig::Global, None);
        let super_admin = admin(None);
        assert!(check_withdrawal_limit(&vendor, Some(&super_admin), dec("5000")).is_ok());
        assert!(check_withdrawal_limit(&vendor, None, dec("5000")).is_ok());
    }

    #[test]
    fn test_vendor_cap_ignored_under_global() {
        // A stale custom cap on the profile must not bite while the vendor
        // is configured to follow the global limit.
        let vendor = user(WithdrawalLimitConfig::Global, Some("10"));
        assert!(check_withdrawal_limit(&vendor, None, dec("100")).is_ok());
    }
}
