//! Principal-role assignment methods

use tracing::{debug, info, warn};

use super::system::RbacSystem;
use super::types::{ADMIN_ROLE, Principal, Role, UserId, UserWithRoles};
use crate::utils::error::{AuthzError, Result};

impl RbacSystem {
    /// Give a user a role by name; repeating the assignment is a no-op
    pub async fn assign_role_to_user(&self, user_id: UserId, role_name: &str) -> Result<()> {
        let role = self
            .store
            .find_role_by_name(role_name)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(role_name))?;

        self.store.assign_role(user_id, role.id).await?;
        self.invalidate_actor(user_id).await;
        info!("Assigned role '{}' to {}", role.name, user_id);
        Ok(())
    }

    /// Take a role away from a user. Unheld or unknown roles are a no-op.
    ///
    /// Removing `admin` from its last holder fails with `ProtectedRole`
    /// unless `protect_last_admin` is off.
    pub async fn remove_role_from_user(&self, user_id: UserId, role_name: &str) -> Result<()> {
        let Some(role) = self.store.find_role_by_name(role_name).await? else {
            debug!("Role '{}' does not exist, nothing to remove from {}", role_name, user_id);
            return Ok(());
        };

        let keep_last_holder = role.id == self.admin_role_id && self.config.protect_last_admin;
        self.store
            .remove_role(user_id, role.id, keep_last_holder)
            .await?;
        self.invalidate_actor(user_id).await;
        info!("Removed role '{}' from {}", role.name, user_id);
        Ok(())
    }

    /// Roles held by a user
    pub async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>> {
        let grants = self.store.grants_for_user(user_id).await?;
        let mut roles: Vec<Role> = grants.into_iter().map(|grant| grant.role).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    /// Every known user with the names of their roles
    pub async fn list_users_with_roles(&self) -> Result<Vec<UserWithRoles>> {
        self.store.list_users_with_roles().await
    }

    /// Record an authenticated principal in the directory
    pub async fn register_principal(&self, principal: Principal) -> Result<()> {
        debug!("Registering principal {}", principal.user_id);
        self.store.upsert_principal(principal).await
    }

    /// Make sure someone holds `admin`
    ///
    /// Grants it to the configured bootstrap actor, or else to the earliest
    /// registered principal, but only if nobody holds it right now. Safe to
    /// call from several processes at once.
    /// Returns the actor that was granted admin by this call.
    pub async fn ensure_admin_exists(&self) -> Result<Option<UserId>> {
        let granted = self
            .store
            .bootstrap_admin(self.admin_role_id, self.config.bootstrap_admin)
            .await?;

        match granted {
            Some(user_id) => {
                self.invalidate_actor(user_id).await;
                warn!("Granted bootstrap '{}' role to {}", ADMIN_ROLE, user_id);
            }
            None => debug!("Admin bootstrap not needed"),
        }
        Ok(granted)
    }
}
