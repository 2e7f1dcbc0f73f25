//! RBAC system core functionality

use std::sync::Arc;
use tracing::{debug, info};

use super::cache::PermissionCache;
use super::catalog::PermissionCatalog;
use super::ownership::OwnershipResolver;
use super::types::{ADMIN_ROLE, MANAGER_ROLE, Permission, PermissionId, Role, RoleId, UserId};
use crate::config::{Config, RbacConfig};
use crate::storage::{PolicyStore, StorageLayer};
use crate::utils::error::{AuthzError, Result};

/// RBAC system for managing roles and deciding access
///
/// Cheap to clone; every clone shares the same store, resolver and cache.
#[derive(Clone)]
pub struct RbacSystem {
    /// RBAC configuration
    pub(super) config: RbacConfig,
    /// Permission vocabulary
    pub(super) catalog: Arc<PermissionCatalog>,
    /// Roles, permissions and assignments
    pub(super) store: Arc<dyn PolicyStore>,
    /// Owner lookup for resource instances
    pub(super) owners: Arc<dyn OwnershipResolver>,
    /// Effective permission cache, when enabled
    pub(super) cache: Option<PermissionCache>,
    /// Id of the bypass role; it can be neither deleted nor renamed
    pub(super) admin_role_id: RoleId,
    /// Actor granted admin while this instance started, if any
    pub(super) startup_admin: Option<UserId>,
}

impl std::fmt::Debug for RbacSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacSystem")
            .field("config", &self.config)
            .field("permissions", &self.catalog.len())
            .field("admin_role_id", &self.admin_role_id)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl RbacSystem {
    /// Create a new RBAC system
    ///
    /// Seeds the permission catalog and the default roles into the store,
    /// then runs the admin bootstrap.
    pub async fn new(
        config: &RbacConfig,
        store: Arc<dyn PolicyStore>,
        owners: Arc<dyn OwnershipResolver>,
    ) -> Result<Self> {
        info!("Initializing RBAC system");

        let catalog = Arc::new(PermissionCatalog::new());
        store.seed_permissions(catalog.list()).await?;

        let admin = Self::ensure_role(
            store.as_ref(),
            ADMIN_ROLE,
            "Full access to every resource",
        )
        .await?;

        if config.seed_manager_role {
            Self::ensure_role(
                store.as_ref(),
                MANAGER_ROLE,
                "Manages tournaments, players and sessions",
            )
            .await?;
        }

        let cache = config.cache.enabled.then(|| {
            debug!(
                "Permission cache enabled (ttl {}s, {} entries)",
                config.cache.ttl_seconds, config.cache.max_entries
            );
            PermissionCache::new(&config.cache)
        });

        let mut rbac = Self {
            config: config.clone(),
            catalog,
            store,
            owners,
            cache,
            admin_role_id: admin.id,
            startup_admin: None,
        };

        rbac.startup_admin = rbac.ensure_admin_exists().await?;

        info!("RBAC system initialized successfully");
        Ok(rbac)
    }

    /// Create an RBAC system over an already initialized storage layer
    pub async fn with_storage(config: &RbacConfig, storage: &StorageLayer) -> Result<Self> {
        Self::new(config, storage.policy.clone(), storage.owners.clone()).await
    }

    /// Create an RBAC system and its storage from a full configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let storage = StorageLayer::new(config.storage()).await?;
        Self::with_storage(config.rbac(), &storage).await
    }

    /// Find a role by name, creating it when missing. Tolerates another
    /// process creating it concurrently.
    async fn ensure_role(store: &dyn PolicyStore, name: &str, description: &str) -> Result<Role> {
        if let Some(role) = store.find_role_by_name(name).await? {
            return Ok(role);
        }

        match store.insert_role(name, Some(description.to_string())).await {
            Ok(role) => {
                info!("Created built-in role '{}'", name);
                Ok(role)
            }
            Err(AuthzError::DuplicateName(_)) => store
                .find_role_by_name(name)
                .await?
                .ok_or_else(|| AuthzError::role_not_found(name)),
            Err(e) => Err(e),
        }
    }

    /// The permission vocabulary
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// List all permissions, ordered by resource then action
    pub fn list_permissions(&self) -> Vec<Permission> {
        self.catalog.list()
    }

    /// Look up a catalog permission by id
    pub fn get_permission(&self, id: PermissionId) -> Result<Permission> {
        self.catalog.require(id).cloned()
    }

    /// Actor this instance granted admin to while starting up
    pub fn startup_admin(&self) -> Option<UserId> {
        self.startup_admin
    }

    /// Active RBAC configuration
    pub fn config(&self) -> &RbacConfig {
        &self.config
    }
}
