use async_trait::async_trait;

use super::types::SeaOrmDatabase;
use crate::auth::rbac::{
    Permission, PermissionId, Principal, Role, RoleGrant, RoleId, UserId, UserWithRoles,
};
use crate::storage::PolicyStore;
use crate::utils::error::Result;

#[async_trait]
impl PolicyStore for SeaOrmDatabase {
    async fn seed_permissions(&self, permissions: Vec<Permission>) -> Result<()> {
        self.insert_catalog(&permissions).await
    }

    async fn insert_role(&self, name: &str, description: Option<String>) -> Result<Role> {
        self.create_role(name, description).await
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<String>,
    ) -> Result<Role> {
        self.rename_role(id, name, description).await
    }

    async fn delete_role(&self, id: RoleId, cascade: bool) -> Result<Role> {
        self.remove_role_row(id, cascade).await
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>> {
        self.find_role_by_id(id).await
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.find_role_named(name).await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.all_roles().await
    }

    async fn list_role_grants(&self) -> Result<Vec<RoleGrant>> {
        self.all_role_grants().await
    }

    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()> {
        self.link_permission(role_id, permission_id).await
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<()> {
        self.unlink_permission(role_id, permission_id).await
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.assign_user_role(user_id, role_id).await
    }

    async fn remove_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        keep_last_holder: bool,
    ) -> Result<()> {
        self.unassign_user_role(user_id, role_id, keep_last_holder)
            .await
    }

    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>> {
        self.user_grants(user_id).await
    }

    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRoles>> {
        self.users_with_roles().await
    }

    async fn upsert_principal(&self, principal: Principal) -> Result<()> {
        self.save_principal(&principal).await
    }

    async fn bootstrap_admin(
        &self,
        admin_role: RoleId,
        candidate: Option<UserId>,
    ) -> Result<Option<UserId>> {
        self.bootstrap_first_admin(admin_role, candidate).await
    }

    async fn health_check(&self) -> Result<()> {
        SeaOrmDatabase::health_check(self).await
    }
}
