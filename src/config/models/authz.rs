//! Top-level authorization configuration

use super::*;
use crate::utils::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Root of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Policy settings
    #[serde(default)]
    pub rbac: RbacConfig,
    /// Backing store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AuthzConfig {
    /// Build a configuration from `AUTHZ_*` environment variables, falling
    /// back to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("AUTHZ_DATABASE_URL") {
            debug!("Using database from AUTHZ_DATABASE_URL");
            config.storage.database.url = url;
            config.storage.database.enabled = true;
        }
        if let Some(max) = parse_env::<u32>("AUTHZ_DATABASE_MAX_CONNECTIONS")? {
            config.storage.database.max_connections = max;
        }
        if let Ok(admin) = env::var("AUTHZ_BOOTSTRAP_ADMIN") {
            let admin = uuid::Uuid::parse_str(&admin).map_err(|e| {
                AuthzError::config(format!("AUTHZ_BOOTSTRAP_ADMIN is not a UUID: {}", e))
            })?;
            config.rbac.bootstrap_admin = Some(admin);
        }
        if let Some(cascade) = parse_env::<bool>("AUTHZ_CASCADE_ROLE_DELETE")? {
            config.rbac.cascade_role_delete = cascade;
        }
        if let Some(enabled) = parse_env::<bool>("AUTHZ_CACHE_ENABLED")? {
            config.rbac.cache.enabled = enabled;
        }
        if let Some(ttl) = parse_env::<u64>("AUTHZ_CACHE_TTL")? {
            config.rbac.cache.ttl_seconds = ttl;
        }

        Ok(config)
    }

    /// Merge two configurations, with other taking precedence
    pub fn merge(mut self, other: Self) -> Self {
        self.rbac = self.rbac.merge(other.rbac);
        self.storage = self.storage.merge(other.storage);
        self
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| AuthzError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
