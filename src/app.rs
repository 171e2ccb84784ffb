use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::{api, config::Config, observability::Telemetry, service::ReportService};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

/// Shared, immutable components built once at startup: configuration,
/// telemetry, and the report service (which owns the resource registry and
/// the reproducibility seed).
pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    service: Arc<ReportService>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn service(&self) -> Arc<ReportService> {
        Arc::clone(&self.registry.service)
    }
}

impl ComponentRegistry {
    /// Initializes telemetry and the report service from configuration.
    ///
    /// # Errors
    /// Fails when telemetry cannot be installed or the service registry
    /// cannot be populated.
    pub fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new().context("failed to initialize telemetry")?;
        let service = Arc::new(
            ReportService::new(config.prng_seed())
                .context("failed to build the report service")?,
        );

        Ok(Self {
            config,
            telemetry,
            service,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

#[must_use]
pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[test]
    fn component_registry_builds() {
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            // SAFETY: test code adjusts deterministic environment state
            // sequentially.
            unsafe {
                std::env::set_var("COMMENT_REPORTER_PRNG_SEED", "17");
            }
            let config = Config::from_env().expect("config loads");
            unsafe {
                std::env::remove_var("COMMENT_REPORTER_PRNG_SEED");
            }
            config
        };

        let registry = ComponentRegistry::build(config).expect("registry builds");
        let state = AppState::new(registry);

        state.telemetry().record_ready_probe();
        assert_eq!(state.service().seed(), 17);
        assert_eq!(state.config().prng_seed(), Some(17));
    }
}
