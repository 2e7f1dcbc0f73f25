use crate::auth::rbac::{Principal, RoleGrant, RoleId, UserId, UserWithRoles};
use crate::utils::error::{AuthzError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::super::entities::{self, principal, role, role_permission, user_role};
use super::role_ops::group_grants;
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Give a principal a role, ignoring an existing assignment
    pub async fn assign_user_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        debug!("Assigning role {} to user {}", role_id, user_id);

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        self.lock_role(&txn, role_id)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", role_id)))?;

        let assignment = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            created_at: Set(chrono::Utc::now().into()),
        };
        entities::UserRole::insert(assignment)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::RoleId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(())
    }

    /// Take a role from a principal
    ///
    /// The role row is locked first so two concurrent removals cannot both
    /// pass the last-holder check.
    pub async fn unassign_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        keep_last_holder: bool,
    ) -> Result<()> {
        debug!("Removing role {} from user {}", role_id, user_id);

        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        let Some(role_model) = self.lock_role(&txn, role_id).await? else {
            return Ok(());
        };

        let held = entities::UserRole::find_by_id((user_id, role_id))
            .one(&txn)
            .await
            .map_err(AuthzError::Database)?;
        if held.is_none() {
            return Ok(());
        }

        if keep_last_holder {
            let holders = entities::UserRole::find()
                .filter(user_role::Column::RoleId.eq(role_id))
                .count(&txn)
                .await
                .map_err(AuthzError::Database)?;
            if holders <= 1 {
                return Err(AuthzError::protected_role(format!(
                    "{} is the last holder of {}",
                    user_id, role_model.name
                )));
            }
        }

        entities::UserRole::delete_by_id((user_id, role_id))
            .exec(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(())
    }

    /// Roles held by a principal with their permission ids, read in one
    /// transaction
    pub async fn user_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>> {
        let txn = self.db.begin().await.map_err(AuthzError::Database)?;

        let role_ids: Vec<RoleId> = entities::UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?
            .into_iter()
            .map(|assignment| assignment.role_id)
            .collect();

        if role_ids.is_empty() {
            txn.commit().await.map_err(AuthzError::Database)?;
            return Ok(Vec::new());
        }

        let roles = entities::Role::find()
            .filter(role::Column::Id.is_in(role_ids.clone()))
            .order_by_asc(role::Column::Id)
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;
        let links = entities::RolePermission::find()
            .filter(role_permission::Column::RoleId.is_in(role_ids))
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        Ok(group_grants(roles, links))
    }

    /// Every registered or role-holding principal with their role names
    pub async fn users_with_roles(&self) -> Result<Vec<UserWithRoles>> {
        let txn = self.db.begin().await.map_err(AuthzError::Database)?;

        let principals = entities::Principal::find()
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;
        let assignments = entities::UserRole::find()
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?;
        let role_names: HashMap<RoleId, String> = entities::Role::find()
            .all(&txn)
            .await
            .map_err(AuthzError::Database)?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect();

        txn.commit().await.map_err(AuthzError::Database)?;

        let mut users: BTreeMap<UserId, UserWithRoles> = principals
            .into_iter()
            .map(|model| {
                (
                    model.user_id,
                    UserWithRoles {
                        user_id: model.user_id,
                        email: model.email,
                        display_name: model.display_name,
                        roles: Vec::new(),
                    },
                )
            })
            .collect();

        for assignment in assignments {
            let Some(name) = role_names.get(&assignment.role_id) else {
                continue;
            };
            users
                .entry(assignment.user_id)
                .or_insert_with(|| UserWithRoles {
                    user_id: assignment.user_id,
                    email: None,
                    display_name: None,
                    roles: Vec::new(),
                })
                .roles
                .push(name.clone());
        }

        Ok(users
            .into_values()
            .map(|mut user| {
                user.roles.sort();
                user
            })
            .collect())
    }

    /// Insert a principal or refresh its contact details. The
    /// registration time of an existing principal is kept.
    pub async fn save_principal(&self, principal: &Principal) -> Result<()> {
        debug!("Saving principal {}", principal.user_id);

        entities::Principal::insert(principal::Model::from_domain_principal(principal))
            .on_conflict(
                OnConflict::column(principal::Column::UserId)
                    .update_columns([principal::Column::Email, principal::Column::DisplayName])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(AuthzError::Database)?;

        Ok(())
    }
}
