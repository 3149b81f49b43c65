//! cashlink - Peer-to-peer vendor cash settlement ledger
//!
//! Startup sequence: config -> logging -> database -> schema -> super admin
//! bootstrap -> gateway.

use std::sync::Arc;

use anyhow::Context;

use cashlink::auth::AuthService;
use cashlink::config::AppConfig;
use cashlink::engine::RequestService;
use cashlink::evidence::DataUrlEvidenceStore;
use cashlink::gateway::{self, state::AppState};
use cashlink::logging::init_logging;
use cashlink::store::{Database, schema};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    tracing::info!("Starting cashlink (env: {})", env);

    let database_url = config
        .database_url()
        .context("postgres_url missing from config and DATABASE_URL unset")?;

    let db = Database::connect(&database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    schema::init_schema(db.pool())
        .await
        .context("Failed to initialize schema")?;

    let auth = AuthService::new(config.auth.jwt_secret.clone(), config.auth.token_ttl_hours);

    // The super admin is the limit fallback and counterparty of last
    // resort; make sure one exists before accepting traffic.
    let admin_password_hash = auth
        .hash_password(&config.bootstrap.admin_password)
        .map_err(|e| anyhow::anyhow!("Failed to hash bootstrap password: {}", e))?;
    RequestService::bootstrap_super_admin(
        db.pool(),
        &config.bootstrap.admin_email,
        &config.bootstrap.admin_name,
        admin_password_hash,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Super admin bootstrap failed: {}", e))?;

    let state = Arc::new(AppState::new(db, auth, Arc::new(DataUrlEvidenceStore)));

    gateway::serve(state, &config.gateway).await
}
