//! Proof-of-payment artifacts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One uploaded payment slip. Append-only; multiple slips accumulate toward
/// a request's paid amount. `evidence_ref` is an opaque reference into the
/// evidence store and is never interpreted by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSlip {
    pub id: Uuid,
    pub request_id: Uuid,
    pub uploaded_by: Uuid,
    pub amount: Decimal,
    #[serde(skip_serializing)]
    pub evidence_ref: String,
    pub created_at: DateTime<Utc>,
}
