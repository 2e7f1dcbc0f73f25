//! Configuration management for the authorization core
//!
//! This module handles loading, validation, and management of all configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{AuthzError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Authorization configuration
    pub authz: AuthzConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AuthzError::Config(format!("Failed to read config file: {}", e)))?;

        let authz: AuthzConfig = serde_yaml::from_str(&content)
            .map_err(|e| AuthzError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { authz };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // A missing .env file is normal outside development
        let _ = dotenvy::dotenv();

        let authz = AuthzConfig::from_env()?;
        let config = Self { authz };

        config.validate()?;
        Ok(config)
    }

    /// Get RBAC configuration
    pub fn rbac(&self) -> &RbacConfig {
        &self.authz.rbac
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.authz.storage
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.authz
            .rbac
            .validate()
            .map_err(|e| AuthzError::Config(format!("RBAC config error: {}", e)))?;

        self.authz
            .storage
            .validate()
            .map_err(|e| AuthzError::Config(format!("Storage config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.authz = self.authz.merge(other.authz);
        self
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.authz)
            .map_err(|e| AuthzError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
