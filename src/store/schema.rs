//! Embedded PostgreSQL schema, applied at startup.
//!
//! Every statement is idempotent (IF NOT EXISTS) so restarts are safe
//! without a migration runner.

use sqlx::PgPool;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users_tb (
    user_id                 UUID PRIMARY KEY,
    email                   TEXT NOT NULL UNIQUE,
    password_hash           TEXT NOT NULL,
    name                    TEXT NOT NULL,
    role                    SMALLINT NOT NULL DEFAULT 1,
    bank_details            JSONB,
    upi_id                  TEXT,
    qr_code                 TEXT,
    withdrawal_limit_config SMALLINT NOT NULL DEFAULT 0,
    max_withdrawal_limit    NUMERIC(10,2),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS requests_tb (
    request_id             UUID PRIMARY KEY,
    req_type               SMALLINT NOT NULL,
    amount                 NUMERIC(12,2) NOT NULL,
    status                 SMALLINT NOT NULL DEFAULT 1,
    bank_details           JSONB,
    upi_id                 TEXT,
    qr_code                TEXT,
    paid_amount            NUMERIC(12,2) NOT NULL DEFAULT 0,
    pending_amount         NUMERIC(12,2) NOT NULL,
    rejection_reason       TEXT,
    payment_failure_reason TEXT,
    cancellation_reason    TEXT,
    created_by             UUID NOT NULL REFERENCES users_tb(user_id),
    picked_by              UUID REFERENCES users_tb(user_id),
    created_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at             TIMESTAMPTZ
)
"#;

const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions_tb (
    transaction_id UUID PRIMARY KEY,
    request_id     UUID NOT NULL REFERENCES requests_tb(request_id),
    vendor_id      UUID NOT NULL REFERENCES users_tb(user_id),
    tx_type        SMALLINT NOT NULL,
    amount         NUMERIC(12,2) NOT NULL,
    status         SMALLINT NOT NULL DEFAULT 1,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_PAYMENT_SLIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS payment_slips_tb (
    slip_id      UUID PRIMARY KEY,
    request_id   UUID NOT NULL REFERENCES requests_tb(request_id),
    uploaded_by  UUID NOT NULL REFERENCES users_tb(user_id),
    amount       NUMERIC(12,2) NOT NULL,
    evidence_ref TEXT NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_REQUEST_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS request_logs_tb (
    log_id     UUID PRIMARY KEY,
    request_id UUID NOT NULL REFERENCES requests_tb(request_id),
    actor_id   UUID NOT NULL REFERENCES users_tb(user_id),
    action     SMALLINT NOT NULL,
    comment    TEXT,
    metadata   JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_NOTIFICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS notifications_tb (
    notification_id UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users_tb(user_id),
    message         TEXT NOT NULL,
    kind            SMALLINT NOT NULL,
    is_read         BOOLEAN NOT NULL DEFAULT FALSE,
    request_id      UUID REFERENCES requests_tb(request_id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_requests_status ON requests_tb (status)",
    "CREATE INDEX IF NOT EXISTS idx_requests_created_by_created_at ON requests_tb (created_by, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_requests_picked_by_created_at ON requests_tb (picked_by, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_request_id ON transactions_tb (request_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_vendor_id ON transactions_tb (vendor_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions_tb (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_request_logs_request_id ON request_logs_tb (request_id)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_user_id_is_read ON notifications_tb (user_id, is_read)",
];

/// Apply the ledger schema.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing ledger schema...");

    for (name, ddl) in [
        ("users", CREATE_USERS_TABLE),
        ("requests", CREATE_REQUESTS_TABLE),
        ("transactions", CREATE_TRANSACTIONS_TABLE),
        ("payment_slips", CREATE_PAYMENT_SLIPS_TABLE),
        ("request_logs", CREATE_REQUEST_LOGS_TABLE),
        ("notifications", CREATE_NOTIFICATIONS_TABLE),
    ] {
        sqlx::query(ddl).execute(pool).await.inspect_err(|e| {
            tracing::error!("Failed to create {} table: {}", name, e);
        })?;
    }

    for ddl in CREATE_INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Ledger schema ready");
    Ok(())
}
