//! Storage layer for the authorization core
//!
//! The engine only ever talks to [`PolicyStore`] and
//! [`OwnershipResolver`]; this module provides the trait and the two
//! backends (in-memory and SeaORM).

/// Database storage module
pub mod database;
/// In-memory storage module
pub mod memory;

use crate::auth::rbac::{
    OwnershipResolver, Permission, PermissionId, Principal, Role, RoleGrant, RoleId, UserId,
    UserWithRoles,
};
use crate::config::StorageConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Durable tables behind the authorization core
///
/// Every mutating method is applied atomically: a concurrent reader either
/// sees the whole mutation or none of it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Insert catalog permissions that are not yet present
    async fn seed_permissions(&self, permissions: Vec<Permission>) -> Result<()>;

    /// Create a role; fails with `DuplicateName` when the name is taken
    async fn insert_role(&self, name: &str, description: Option<String>) -> Result<Role>;

    /// Rename and re-describe a role
    async fn update_role(&self, id: RoleId, name: &str, description: Option<String>)
    -> Result<Role>;

    /// Delete a role and, with `cascade`, its assignments. Returns the
    /// deleted role.
    async fn delete_role(&self, id: RoleId, cascade: bool) -> Result<Role>;

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// All roles ordered by id
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// All roles with their permission ids, ordered by role id
    async fn list_role_grants(&self) -> Result<Vec<RoleGrant>>;

    /// Idempotent role-permission insert
    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()>;

    /// Idempotent role-permission removal
    async fn revoke_permission(&self, role_id: RoleId, permission_id: PermissionId)
    -> Result<()>;

    /// Idempotent principal-role insert
    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<()>;

    /// Idempotent principal-role removal. With `keep_last_holder`, refuses
    /// to remove the role from its only remaining holder.
    async fn remove_role(&self, user_id: UserId, role_id: RoleId, keep_last_holder: bool)
    -> Result<()>;

    /// Roles held by a user together with the permissions each contributes,
    /// read in one consistent snapshot
    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>>;

    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRoles>>;

    /// Insert or refresh a principal directory entry
    async fn upsert_principal(&self, principal: Principal) -> Result<()>;

    /// Grant `admin_role` to `candidate` (or the earliest registered
    /// principal) unless someone already holds it. Concurrent calls must
    /// not both grant. Returns the actor that was granted.
    async fn bootstrap_admin(
        &self,
        admin_role: RoleId,
        candidate: Option<UserId>,
    ) -> Result<Option<UserId>>;

    async fn health_check(&self) -> Result<()>;
}

/// Main storage layer handing out the store and ownership backends
#[derive(Clone)]
pub struct StorageLayer {
    /// Role, permission and assignment tables
    pub policy: Arc<dyn PolicyStore>,
    /// Owner lookup for resource instances
    pub owners: Arc<dyn OwnershipResolver>,
}

impl std::fmt::Debug for StorageLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLayer").finish_non_exhaustive()
    }
}

impl StorageLayer {
    /// Create a new storage layer
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        info!("Initializing storage layer");

        if config.database.enabled {
            debug!("Connecting to database");
            let database = Arc::new(database::Database::new(&config.database).await?);
            database.migrate().await?;

            Ok(Self {
                policy: database.clone(),
                owners: Arc::new(database::SeaOrmOwnershipResolver::new(
                    database.connection().clone(),
                )),
            })
        } else {
            warn!("Database disabled, policy data will not survive a restart");
            Ok(Self::in_memory())
        }
    }

    /// Volatile storage, for tests and embedding
    pub fn in_memory() -> Self {
        Self {
            policy: Arc::new(memory::MemoryPolicyStore::new()),
            owners: Arc::new(memory::MemoryOwnershipResolver::new()),
        }
    }

    /// Health check for the policy store
    pub async fn health_check(&self) -> Result<()> {
        self.policy.health_check().await.inspect_err(|e| {
            warn!("Policy store health check failed: {}", e);
        })
    }
}
