//! Domain entities and their persistence codes.
//!
//! Every enum stored in PostgreSQL round-trips through a SMALLINT code
//! (`id()` / `from_id()`); API serialization uses the SCREAMING_SNAKE_CASE
//! names instead.

pub mod log;
pub mod notification;
pub mod request;
pub mod slip;
pub mod transaction;
pub mod user;

pub use log::{LogAction, RequestLog};
pub use notification::{Notification, NotificationKind};
pub use request::{Request, RequestStatus, RequestType};
pub use slip::PaymentSlip;
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{BankDetails, User, UserRole, WithdrawalLimitConfig};
