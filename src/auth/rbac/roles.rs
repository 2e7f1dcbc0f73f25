//! Role management methods

use tracing::{info, warn};

use super::system::RbacSystem;
use super::types::{ADMIN_ROLE, PermissionId, Role, RoleId, RoleWithPermissions};
use crate::utils::error::{AuthzError, Result};

impl RbacSystem {
    /// Create a role; names are unique and case-sensitive
    pub async fn create_role(&self, name: &str, description: Option<String>) -> Result<RoleId> {
        validate_role_name(name)?;

        let role = self.store.insert_role(name, normalize(description)).await?;
        info!("Created role '{}' ({})", role.name, role.id);
        Ok(role.id)
    }

    /// Rename or re-describe a role. `admin` keeps its name.
    pub async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<String>,
    ) -> Result<()> {
        validate_role_name(name)?;

        if id == self.admin_role_id && name != ADMIN_ROLE {
            return Err(AuthzError::protected_role(format!(
                "the '{}' role cannot be renamed",
                ADMIN_ROLE
            )));
        }

        let role = self.store.update_role(id, name, normalize(description)).await?;
        // Role names feed is_manager and friends
        self.invalidate_all();
        info!("Updated role '{}' ({})", role.name, role.id);
        Ok(())
    }

    /// Delete a role. Cascades to its assignments unless configured not to,
    /// in which case a role still held by someone is rejected.
    pub async fn delete_role(&self, id: RoleId) -> Result<()> {
        if id == self.admin_role_id {
            return Err(AuthzError::protected_role(format!(
                "the '{}' role cannot be deleted",
                ADMIN_ROLE
            )));
        }

        let role = self
            .store
            .delete_role(id, self.config.cascade_role_delete)
            .await?;
        self.invalidate_all();
        warn!("Deleted role '{}' ({})", role.name, role.id);
        Ok(())
    }

    /// Get role by id
    pub async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
        self.store.find_role(id).await
    }

    /// Get role by name
    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.store.find_role_by_name(name).await
    }

    /// List all roles
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.store.list_roles().await
    }

    /// List all roles with the permissions each grants
    pub async fn list_roles_with_permissions(&self) -> Result<Vec<RoleWithPermissions>> {
        let grants = self.store.list_role_grants().await?;
        Ok(grants
            .into_iter()
            .map(|grant| {
                let mut permissions: Vec<_> = grant
                    .permission_ids
                    .iter()
                    .filter_map(|id| self.catalog.get(*id).cloned())
                    .collect();
                permissions.sort_by(|a, b| a.name.cmp(&b.name));
                RoleWithPermissions {
                    role: grant.role,
                    permissions,
                }
            })
            .collect())
    }

    /// Grant a permission to a role; granting a held permission is a no-op
    pub async fn assign_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()> {
        let permission = self.catalog.require(permission_id)?;
        self.store.grant_permission(role_id, permission_id).await?;
        self.invalidate_all();
        info!("Granted {} to role {}", permission.name, role_id);
        Ok(())
    }

    /// Revoke a permission from a role; revoking an unheld permission is a
    /// no-op
    pub async fn remove_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()> {
        let permission = self.catalog.require(permission_id)?;
        self.store.revoke_permission(role_id, permission_id).await?;
        self.invalidate_all();
        info!("Revoked {} from role {}", permission.name, role_id);
        Ok(())
    }
}

fn validate_role_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AuthzError::validation("Role name cannot be empty"));
    }
    if name.trim() != name {
        return Err(AuthzError::validation(
            "Role name cannot start or end with whitespace",
        ));
    }
    Ok(())
}

/// Forms submit an empty string for "no description"
fn normalize(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
