//! Request lifecycle engine.
//!
//! [`lifecycle`] holds the pure transition planners: given a request
//! snapshot and an actor they validate the move and return the status
//! change together with its full side-effect plan (spawned remainder,
//! audit entry, settlement order, notices). [`service`] executes a plan
//! inside one database transaction guarded by a compare-and-swap on the
//! request's prior status, then emits notifications best-effort.

pub mod error;
pub mod lifecycle;
pub mod limits;
pub mod service;

pub use error::EngineError;
pub use lifecycle::{
    CreateRequest, LogDraft, NewRequest, Notice, Recipient, RequestUpdate, SettlementOrder,
    SlipDraft, TransitionPlan,
};
pub use service::RequestService;
