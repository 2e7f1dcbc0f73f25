//! RBAC configuration

use super::*;
use crate::auth::rbac::ActionKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RBAC configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Actor to receive `admin` when no admin exists yet. Without one, the
    /// earliest registered principal is chosen.
    #[serde(default)]
    pub bootstrap_admin: Option<Uuid>,
    /// Whether deleting a role also drops its assignments
    #[serde(default = "default_true")]
    pub cascade_role_delete: bool,
    /// Refuse to strip `admin` from its last holder
    #[serde(default = "default_true")]
    pub protect_last_admin: bool,
    /// Create the `manager` role at startup
    #[serde(default = "default_true")]
    pub seed_manager_role: bool,
    /// Actions an owner may perform on an instance without a role grant
    #[serde(default = "default_ownership_actions")]
    pub ownership_actions: Vec<ActionKind>,
    /// Effective permission cache
    #[serde(default)]
    pub cache: PermissionCacheConfig,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            bootstrap_admin: None,
            cascade_role_delete: true,
            protect_last_admin: true,
            seed_manager_role: true,
            ownership_actions: default_ownership_actions(),
            cache: PermissionCacheConfig::default(),
        }
    }
}

impl RbacConfig {
    /// Merge RBAC configurations
    pub fn merge(mut self, other: Self) -> Self {
        if other.bootstrap_admin.is_some() {
            self.bootstrap_admin = other.bootstrap_admin;
        }
        if !other.cascade_role_delete {
            self.cascade_role_delete = false;
        }
        if !other.protect_last_admin {
            self.protect_last_admin = false;
        }
        if !other.seed_manager_role {
            self.seed_manager_role = false;
        }
        if other.ownership_actions != default_ownership_actions() {
            self.ownership_actions = other.ownership_actions;
        }
        if other.cache != PermissionCacheConfig::default() {
            self.cache = other.cache;
        }
        self
    }
}

/// Effective permission cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCacheConfig {
    /// Enable caching
    #[serde(default)]
    pub enabled: bool,
    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Maximum cached actors
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: default_cache_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

pub fn default_ownership_actions() -> Vec<ActionKind> {
    vec![ActionKind::Read, ActionKind::Update, ActionKind::Submit]
}
