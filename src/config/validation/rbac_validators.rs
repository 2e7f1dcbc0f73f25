//! RBAC configuration validators

use super::trait_def::Validate;
use crate::auth::rbac::ActionKind;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::debug;

impl Validate for AuthzConfig {
    fn validate(&self) -> Result<(), String> {
        self.rbac.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl Validate for RbacConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating rbac configuration");

        // Create and Delete stay permission-gated no matter who owns the row
        for forbidden in [ActionKind::Create, ActionKind::Delete] {
            if self.ownership_actions.contains(&forbidden) {
                return Err(format!("Ownership cannot grant the '{}' action", forbidden));
            }
        }

        let unique: HashSet<&ActionKind> = self.ownership_actions.iter().collect();
        if unique.len() != self.ownership_actions.len() {
            return Err("Ownership actions contain duplicates".to_string());
        }

        if self.bootstrap_admin.is_some_and(|admin| admin.is_nil()) {
            return Err("Bootstrap admin cannot be the nil UUID".to_string());
        }

        self.cache.validate()?;

        Ok(())
    }
}

impl Validate for PermissionCacheConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.ttl_seconds == 0 {
            return Err("Permission cache TTL must be greater than 0".to_string());
        }

        // Long-lived entries widen the window for stale grants
        if self.ttl_seconds > 300 {
            return Err("Permission cache TTL should not exceed 300 seconds".to_string());
        }

        if self.max_entries == 0 {
            return Err("Permission cache max entries must be greater than 0".to_string());
        }

        Ok(())
    }
}
