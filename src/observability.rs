use std::sync::OnceLock;

use anyhow::{Error, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Owns the logging setup and records service-level events.
#[derive(Debug, Clone)]
pub struct Telemetry;

impl Telemetry {
    /// Initializes tracing (once per process) and returns the handle.
    ///
    /// # Errors
    /// Fails when the subscriber cannot be installed.
    pub fn new() -> Result<Self> {
        init_tracing()?;
        Ok(Self)
    }

    pub fn record_ready_probe(&self) {
        tracing::info!("service ready probe recorded");
    }

    pub fn record_live_probe(&self) {
        tracing::debug!("service live probe");
    }

    pub fn record_report_request(&self) {
        tracing::info!("report generation invoked");
    }
}

/// Installs the JSON fmt subscriber behind a once-only guard so tests and
/// repeated construction do not race on the global default.
fn init_tracing() -> Result<()> {
    let mut result = Ok(());
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false).json();

        result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| Error::msg(e.to_string()));
    });
    result
}
