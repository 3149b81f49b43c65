//! Settlement poster.
//!
//! Turns an approved request into the mirrored ledger pair: one posting for
//! the creator in the request's own direction, one for the picker in the
//! opposite direction, both for the amount actually paid. Runs inside the
//! caller's open transaction so both rows persist with the status flip or
//! not at all - a one-sided posting can never be observed.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::{RequestType, Transaction, TransactionStatus, TransactionType};
use crate::engine::SettlementOrder;
use crate::store::TransactionStore;

pub struct SettlementPoster;

impl SettlementPoster {
    /// Build the mirrored pair for one settlement order.
    pub fn pair_for(order: &SettlementOrder) -> (Transaction, Transaction) {
        let creator_side = match order.kind {
            RequestType::Withdrawal => TransactionType::Withdrawal,
            RequestType::Deposit => TransactionType::Deposit,
        };

        let now = chrono::Utc::now();

        let creator_tx = Transaction {
            id: Uuid::new_v4(),
            request_id: order.request_id,
            vendor_id: order.creator,
            kind: creator_side,
            amount: order.amount,
            status: TransactionStatus::Completed,
            created_at: now,
        };

        let picker_tx = Transaction {
            id: Uuid::new_v4(),
            request_id: order.request_id,
            vendor_id: order.picker,
            kind: creator_side.mirrored(),
            amount: order.amount,
            status: TransactionStatus::Completed,
            created_at: now,
        };

        (creator_tx, picker_tx)
    }

    /// Insert the transaction pair inside the caller's transaction.
    pub async fn post(
        conn: &mut PgConnection,
        order: &SettlementOrder,
    ) -> Result<(Transaction, Transaction), sqlx::Error> {
        let (creator_tx, picker_tx) = Self::pair_for(order);

        TransactionStore::insert(conn, &creator_tx).await?;
        TransactionStore::insert(conn, &picker_tx).await?;

        tracing::info!(
            request_id = %order.request_id,
            amount = %order.amount,
            "Settlement posted: {} for creator, {} for picker",
            creator_tx.kind.as_str(),
            picker_tx.kind.as_str()
        );

        Ok((creator_tx, picker_tx))
    }
}
