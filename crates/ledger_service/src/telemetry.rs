//! Tracing setup for the ledger binaries

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins over `level` when set. With `json` the output is one JSON
/// object per event, otherwise the human-readable format.
pub fn init_tracing(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (Some(fmt::layer().with_target(true)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .try_init()?;
    Ok(())
}
