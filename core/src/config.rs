//! Operation configuration

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable read by [`Config::from_env`]
pub const APPLICATION_ID_ENV: &str = "EFRAMEWORK_APPLICATION_ID";

/// Settings shared by every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Injected as `applicationId` into every attribute set
    pub application_id: String,
}

impl Config {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
        }
    }

    /// Read the configuration from `EFRAMEWORK_APPLICATION_ID`
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(APPLICATION_ID_ENV) {
            Ok(application_id) => {
                let config = Self::new(application_id);
                config.validate()?;
                Ok(config)
            }
            Err(std::env::VarError::NotPresent) => Err(ConfigError::MissingApplicationId),
            Err(e) => Err(ConfigError::InvalidEnv {
                name: APPLICATION_ID_ENV.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Reject a blank application id
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_id.trim().is_empty() {
            return Err(ConfigError::MissingApplicationId);
        }
        Ok(())
    }
}
