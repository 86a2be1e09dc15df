//! Ledger service configuration
//!
//! Values come from `LEDGER_`-prefixed environment variables (a `.env` file is
//! honoured by the binaries), falling back to the defaults below.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LEDGER_BASE_CURRENCY` | `TZS` |
//! | `LEDGER_UNRESOLVED_ACCOUNT_POLICY` | `reject` |
//! | `LEDGER_AUTO_POST` | `true` |
//! | `LEDGER_DATABASE_URL` | `postgres://localhost/freight_ledger` |
//! | `LEDGER_MAX_CONNECTIONS` | `10` |
//! | `LEDGER_MIN_CONNECTIONS` | `1` |
//! | `LEDGER_CONNECT_TIMEOUT_SECS` | `30` |
//! | `LEDGER_LOG_LEVEL` | `info` |
//! | `LEDGER_LOG_JSON` | `false` |

use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

use core_kernel::Currency;
use domain_ledger::UnresolvedAccountPolicy;
use infra_db::DatabaseConfig;

/// Ledger service configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Currency every journal line is normalized to
    pub base_currency: Currency,
    pub unresolved_account_policy: UnresolvedAccountPolicy,
    /// Whether recorded events are posted immediately or left as drafts
    pub auto_post: bool,
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: Currency::TZS,
            unresolved_account_policy: UnresolvedAccountPolicy::Reject,
            auto_post: true,
            database_url: "postgres://localhost/freight_ledger".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(
            config::Config::builder().add_source(
                config::Environment::with_prefix("LEDGER").try_parsing(true),
            ),
        )
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Message("max_connections must be at least 1".into()));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::Message(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    /// Pool settings for [`infra_db::create_pool`]
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}
