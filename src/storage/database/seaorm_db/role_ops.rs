use crate::auth::rbac::{Permission, PermissionId, Role, RoleGrant, RoleId};
use crate::utils::error::{AuthzError, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use std::collections::HashMap;
use tracing::debug;

use super::super::entities::{self, permission, role, role_permission, user_role};
use super::types::{DatabaseBackendType, SeaOrmDatabase};

impl SeaOrmDatabase {
    /// Insert catalog permissions that are not yet present
    pub async fn insert_catalog(&self, permissions: &[Permission]) -> Result<()> {
        if permissions.is_empty() {
            return Ok(());
        }
        debug!("Seeding {} permissions", permissions.len());

        let models: Vec<permission::ActiveModel> = permissions
            .iter()
            .map(permission::Model::from_domain_permission)
            .collect();

        entities::Permission::insert_many(models)
            .on_conflict(
                OnConflict::column(permission::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(())
    }

    /// Create a new role
    pub async fn create_role(&self, name: &str, description: Option<String>) -> Result<Role> {
        debug!("Creating role: {}", name);

        let model = role::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| AuthzError::from_role_write(e, name))?;

        Ok(model.to_domain_role())
    }

    /// Rename and re-describe a role
    pub async fn rename_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<String>,
    ) -> Result<Role> {
        debug!("Updating role {}: {}", id, name);

        let mut active_model: role::ActiveModel = Self::require_role(&self.db, id).await?.into();
        active_model.name = Set(name.to_string());
        active_model.description = Set(description);

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| AuthzError::from_role_write(e, name))?;

        Ok(model.to_domain_role())
    }

    /// Delete a role, its permission grants and, with `cascade`, its
    /// assignments
    pub async fn remove_role_row(&self, id: RoleId, cascade: bool) -> Result<Role> {
        debug!("Deleting role {} (cascade: {})", id, cascade);

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        let model = self
            .lock_role(&txn, id)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", id)))?;

        let holders = entities::UserRole::find()
            .filter(user_role::Column::RoleId.eq(id))
            .count(&txn)
            .await
            .map_err(AuthzError::Database)?;
        if holders > 0 && !cascade {
            return Err(AuthzError::role_in_use(model.name));
        }

        // Foreign keys cascade too, but SQLite may run with them disabled
        entities::UserRole::delete_many()
            .filter(user_role::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;
        entities::RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(id))
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;
        entities::Role::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(model.to_domain_role())
    }

    /// Find role by ID
    pub async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        let model = entities::Role::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|m| m.to_domain_role()))
    }

    /// Find role by name
    pub async fn find_role_named(&self, name: &str) -> Result<Option<Role>> {
        let model = entities::Role::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(model.map(|m| m.to_domain_role()))
    }

    /// List all roles ordered by ID
    pub async fn all_roles(&self) -> Result<Vec<Role>> {
        let models = entities::Role::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(models.iter().map(role::Model::to_domain_role).collect())
    }

    /// All roles with the permission ids each grants
    pub async fn all_role_grants(&self) -> Result<Vec<RoleGrant>> {
        let txn = self.db.begin().await.map_err(AuthzError::Database)?;

        let roles = entities::Role::find()
            .order_by_asc(role::Column::Id)
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;
        let links = entities::RolePermission::find()
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(group_grants(roles, links))
    }

    /// Link a permission to a role, ignoring existing links
    pub async fn link_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()> {
        debug!("Granting permission {} to role {}", permission_id, role_id);

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        self.lock_role(&txn, role_id)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", role_id)))?;

        let known = entities::Permission::find_by_id(permission_id)
            .one(&txn)
            .await
            .map_err(AuthzError::Database)?;
        if known.is_none() {
            return Err(AuthzError::unknown_permission(
                format!("#{}", permission_id),
                "?",
            ));
        }

        let link = role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        };
        entities::RolePermission::insert(link)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::RoleId,
                    role_permission::Column::PermissionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(())
    }

    /// Unlink a permission from a role
    pub async fn unlink_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<()> {
        debug!("Revoking permission {} from role {}", permission_id, role_id);

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        self.lock_role(&txn, role_id)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", role_id)))?;

        entities::RolePermission::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(())
    }

    /// Load a role row, locking it until the transaction ends
    ///
    /// Must be the first statement of a transaction that writes. SQLite has
    /// no row locks, so a no-op update takes the database write lock before
    /// anything is read; a busy writer is then waited out, whereas upgrading
    /// a read lock later fails at once with `SQLITE_BUSY`.
    pub(super) async fn lock_role<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: RoleId,
    ) -> Result<Option<role::Model>> {
        let mut select = entities::Role::find_by_id(id);
        match self.backend_type {
            DatabaseBackendType::PostgreSQL => select = select.lock_exclusive(),
            DatabaseBackendType::SQLite => {
                entities::Role::update_many()
                    .col_expr(role::Column::Id, Expr::col(role::Column::Id).into())
                    .filter(role::Column::Id.eq(id))
                    .exec(conn)
                    .await
                    .map_err(AuthzError::Database)?;
            }
        }
        select.one(conn).await.map_err(AuthzError::Database)
    }

    /// Load a role or fail with `RoleNotFound`
    async fn require_role<C: ConnectionTrait>(conn: &C, id: RoleId) -> Result<role::Model> {
        entities::Role::find_by_id(id)
            .one(conn)
            .await
            .map_err(AuthzError::Database)?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", id)))
    }
}

/// Attach permission links to their roles, keeping the role order
pub(super) fn group_grants(
    roles: Vec<role::Model>,
    links: Vec<role_permission::Model>,
) -> Vec<RoleGrant> {
    let mut by_role: HashMap<RoleId, Vec<PermissionId>> = HashMap::new();
    for link in links {
        by_role
            .entry(link.role_id)
            .or_default()
            .push(link.permission_id);
    }

    roles
        .into_iter()
        .map(|model| {
            let mut permission_ids = by_role.remove(&model.id).unwrap_or_default();
            permission_ids.sort_unstable();
            RoleGrant {
                role: model.to_domain_role(),
                permission_ids,
            }
        })
        .collect()
}
