//! Initialization functions for tracing

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::tracing::config::InstrumentationConfig;

/// Initialize tracing with the given configuration
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
pub fn init_tracing(config: &InstrumentationConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::debug!(
        service = %config.service_name,
        version = %config.service_version,
        "tracing initialized"
    );
    Ok(())
}
