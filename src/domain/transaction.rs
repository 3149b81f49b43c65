//! Immutable ledger postings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a posting from the owning vendor's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionType {
    Withdrawal = 1,
    Deposit = 2,
}

impl TransactionType {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionType::Withdrawal),
            2 => Some(TransactionType::Deposit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Deposit => "DEPOSIT",
        }
    }

    /// The counterparty's side of the same settlement.
    pub fn mirrored(&self) -> Self {
        match self {
            TransactionType::Withdrawal => TransactionType::Deposit,
            TransactionType::Deposit => TransactionType::Withdrawal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionStatus {
    Completed = 1,
}

impl TransactionStatus {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransactionStatus::Completed),
            _ => None,
        }
    }
}

/// One side of a settled request. Created only in mirrored pairs, never
/// mutated or deleted. A vendor's balance is the sum of their postings.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub request_id: Uuid,
    pub vendor_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_roundtrip() {
        assert_eq!(TransactionType::from_id(1), Some(TransactionType::Withdrawal));
        assert_eq!(TransactionType::from_id(2), Some(TransactionType::Deposit));
        assert_eq!(TransactionType::from_id(3), None);
    }

    #[test]
    fn test_mirrored_is_involution() {
        assert_eq!(
            TransactionType::Withdrawal.mirrored(),
            TransactionType::Deposit
        );
        assert_eq!(
            TransactionType::Deposit.mirrored().mirrored(),
            TransactionType::Deposit
        );
    }
}
