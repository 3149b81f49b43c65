use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::AuthService;
use crate::evidence::EvidenceStore;
use crate::store::Database;

/// Shared gateway application state.
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    pub evidence: Arc<dyn EvidenceStore>,
}

impl AppState {
    pub fn new(db: Database, auth: AuthService, evidence: Arc<dyn EvidenceStore>) -> Self {
        Self { db, auth, evidence }
    }

    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }
}
