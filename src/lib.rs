//! cashlink - Peer-to-peer vendor cash settlement ledger
//!
//! Vendors post DEPOSIT/WITHDRAWAL requests; counterparties pick them
//! (optionally splitting), upload payment proof, and the creator verifies.
//! Approval posts a mirrored transaction pair to both ledgers.
//!
//! # Modules
//!
//! - [`domain`] - Entities and persistence codes
//! - [`money`] - Decimal amount parsing and INR formatting
//! - [`store`] - PostgreSQL repositories and schema
//! - [`engine`] - Lifecycle planners + transactional service (the core)
//! - [`settlement`] - Mirrored transaction-pair poster
//! - [`audit`] - Append-only request log
//! - [`notify`] - Best-effort notification emitter
//! - [`evidence`] - Payment-proof storage collaborator
//! - [`reporting`] - Read-only stats and CSV export
//! - [`auth`] - Passwords, JWT, vendor management
//! - [`gateway`] - HTTP surface

pub mod audit;
pub mod auth;
pub mod config;
pub mod domain;
pub mod engine;
pub mod evidence;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod notify;
pub mod reporting;
pub mod settlement;
pub mod store;

// Convenient re-exports at crate root
pub use audit::AuditLogger;
pub use domain::{
    BankDetails, LogAction, Notification, NotificationKind, PaymentSlip, Request, RequestLog,
    RequestStatus, RequestType, Transaction, TransactionStatus, TransactionType, User, UserRole,
    WithdrawalLimitConfig,
};
pub use engine::{CreateRequest, EngineError, RequestService, TransitionPlan};
pub use notify::Notifier;
pub use settlement::SettlementPoster;
pub use store::Database;
