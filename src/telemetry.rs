//! Tracing subscriber setup and metric descriptions.

use anyhow::{Result, anyhow};
use metrics::{Unit, describe_counter};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::Config;

/// Installs the global tracing subscriber.
///
/// `log_level` is an `EnvFilter` directive string (the `RUST_LOG` value);
/// an unparsable value falls back to `info`. `log_format` selects
/// human-readable text or one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &Config) -> Result<()> {
    describe_metrics();

    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.log_format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        _ => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

fn describe_metrics() {
    describe_counter!(
        "linkcache_cache_lookups_total",
        Unit::Count,
        "Cache lookups by key kind and result (hit, miss, error)."
    );
    describe_counter!(
        "linkcache_cache_write_failures_total",
        Unit::Count,
        "Cache backfill writes that failed or timed out."
    );
}
