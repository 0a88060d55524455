//! # Structured Logging
//!
//! The crate only emits `tracing` events; installing a subscriber is the
//! host's business. Hosts without one can call [`init_logging`], which sets up
//! a console subscriber filtered by `EFRAMEWORK_LOG` (or `RUST_LOG`), printing
//! JSON lines when `EFRAMEWORK_LOG_FORMAT=json`.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILTER_ENV: &str = "EFRAMEWORK_LOG";
pub const LOG_FORMAT_ENV: &str = "EFRAMEWORK_LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output format for [`init_logging`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install a global subscriber once; later calls are no-ops
///
/// A subscriber already installed by the host is left in place.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = filter_directive(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        );
        let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

        let env_filter =
            EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(true).json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(true).with_thread_ids(true))
                .try_init(),
        };

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
            return;
        }

        tracing::info!(filter = %filter, ?format, "Structured logging initialized");
    });
}

fn filter_directive(eframework: Option<String>, rust_log: Option<String>) -> String {
    eframework
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
