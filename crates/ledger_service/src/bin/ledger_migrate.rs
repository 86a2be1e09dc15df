//! Freight Ledger - schema migration binary
//!
//! Creates the ledger tables, enums, journal number sequence and the standard
//! chart of accounts in the configured database.
//!
//! # Usage
//!
//! ```bash
//! LEDGER_DATABASE_URL=postgres://localhost/freight_ledger cargo run --bin ledger-migrate
//! ```

use ledger_service::{init_tracing, LedgerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = LedgerConfig::from_env()?;
    init_tracing(&config.log_level, config.log_json)?;

    tracing::info!(
        base_currency = %config.base_currency,
        max_connections = config.max_connections,
        "Starting ledger migrations"
    );

    let pool = infra_db::create_pool(config.database_config()).await?;
    infra_db::run_migrations(&pool).await?;

    let accounts = infra_db::LedgerRepository::new(pool.clone()).list_accounts().await?;
    tracing::info!(accounts = accounts.len(), "Ledger schema ready");

    pool.close().await;
    Ok(())
}
