//! Builder API for assembling the operations

use crate::{
    Config, MemoryRegistry, errors::ConfigError, operations::Eframework,
    registry::ExtensionPointRegistry,
};
use std::sync::Arc;

/// Builder for [`Eframework`] with a fluent API
pub struct EframeworkBuilder {
    config: Config,
    registry: Option<Arc<dyn ExtensionPointRegistry>>,
}

impl EframeworkBuilder {
    /// Create a new builder for the given application id
    pub fn new(application_id: impl Into<String>) -> Self {
        Self::from_config(Config::new(application_id))
    }

    /// Start from an existing configuration
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Start from `EFRAMEWORK_APPLICATION_ID`
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_env().map(Self::from_config)
    }

    /// Override the application id
    pub fn application_id(mut self, application_id: impl Into<String>) -> Self {
        self.config.application_id = application_id.into();
        self
    }

    /// Set the registry handlers are resolved from
    ///
    /// Without one, an empty [`MemoryRegistry`] is used and every event is
    /// dropped with a warning.
    pub fn registry(mut self, registry: Arc<dyn ExtensionPointRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate the configuration and build the operations
    pub fn build(self) -> Result<Eframework, ConfigError> {
        let registry: Arc<dyn ExtensionPointRegistry> = match self.registry {
            Some(registry) => registry,
            None => Arc::new(MemoryRegistry::new()),
        };

        Eframework::new(self.config, registry)
    }
}
