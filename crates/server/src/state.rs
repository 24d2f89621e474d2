use std::sync::Arc;
use jackett_bridge_core::{ApiGuard, Config, ConfigGenerator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    guard: ApiGuard,
    generator: Arc<ConfigGenerator>,
}

impl AppState {
    pub fn new(config: Config, guard: ApiGuard, generator: Arc<ConfigGenerator>) -> Self {
        Self {
            config,
            guard,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn guard(&self) -> &ApiGuard {
        &self.guard
    }

    pub fn generator(&self) -> &ConfigGenerator {
        self.generator.as_ref()
    }
}
