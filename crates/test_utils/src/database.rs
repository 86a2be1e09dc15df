//! Database Test Utilities
//!
//! Starts a throwaway PostgreSQL container, applies the ledger migrations
//! (schema plus the standard chart of accounts) and hands out a pool or a
//! ready [`PostgresLedgerAdapter`]. Tests using this module need Docker and
//! are marked `#[ignore]` by convention.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use infra_db::{run_migrations, PostgresLedgerAdapter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "ledger_test";
const POSTGRES_PASSWORD: &str = "ledger_test";
const POSTGRES_DB: &str = "freight_ledger_test";

/// Tables holding posted data; the chart of accounts is kept
const DATA_TABLES: &[&str] = &["journal_lines", "journal_entries", "exchange_rates"];

/// Connection settings for the test container
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated PostgreSQL instance running in a container
///
/// The container stops when this value is dropped.
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a container and applies the ledger migrations
    pub async fn new() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let config = TestDatabaseConfig {
            host: container.get_host().await?.to_string(),
            port: container.get_host_port_ipv4(5432).await?,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A ledger adapter over this database
    pub fn adapter(&self) -> PostgresLedgerAdapter {
        PostgresLedgerAdapter::new(self.pool.clone())
    }

    /// Removes journal entries, lines and exchange rates, and restarts the
    /// journal number sequence; the chart of accounts stays seeded
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        let statement = format!("TRUNCATE TABLE {} CASCADE", DATA_TABLES.join(", "));
        sqlx::query(&statement).execute(&self.pool).await?;
        sqlx::query("ALTER SEQUENCE journal_number_seq RESTART WITH 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// A database shared by every test in the binary
///
/// # Panics
///
/// Panics if the container cannot be started.
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to start shared ledger test database"),
            )
        })
        .await
        .clone()
}

/// A database owned by a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

/// Declares an ignored tokio test that receives an isolated, migrated database
///
/// ```rust,ignore
/// db_test!(inserts_entry, |db| async move {
///     let adapter = db.adapter();
///     // ...
/// });
/// ```
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:expr) => {
        #[tokio::test]
        #[ignore = "requires Docker"]
        async fn $name() {
            let $db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create ledger test database");
            $body.await
        }
    };
}
