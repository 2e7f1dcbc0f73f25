use crate::auth::rbac::{RoleId, UserId};
use crate::utils::error::{AuthzError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, info};

use super::super::entities::{self, admin_bootstrap, principal, user_role};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Grant the admin role when nobody holds it
    ///
    /// The admin role row is locked first, so concurrent callers run one
    /// after the other and every caller after the first sees its grant.
    pub async fn bootstrap_first_admin(
        &self,
        admin_role: RoleId,
        candidate: Option<UserId>,
    ) -> Result<Option<UserId>> {
        let txn = self.db.begin().await.map_err(AuthzError::Database)?;
        self.lock_role(&txn, admin_role)
            .await?
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", admin_role)))?;

        let admins = entities::UserRole::find()
            .filter(user_role::Column::RoleId.eq(admin_role))
            .count(&txn)
            .await
            .map_err(AuthzError::Database)?;
        if admins > 0 {
            debug!("Admin already present, skipping bootstrap");
            return Ok(None);
        }

        let chosen = match candidate {
            Some(user_id) => Some(user_id),
            None => entities::Principal::find()
                .order_by_asc(principal::Column::RegisteredAt)
                .order_by_asc(principal::Column::UserId)
                .one(&txn)
                .await
                .map_err(AuthzError::Database)?
                .map(|model| model.user_id),
        };
        let Some(user_id) = chosen else {
            debug!("No principal to bootstrap as admin yet");
            return Ok(None);
        };

        let now = chrono::Utc::now();
        entities::UserRole::insert(user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(admin_role),
            created_at: Set(now.into()),
        })
        .on_conflict(
            OnConflict::columns([user_role::Column::UserId, user_role::Column::RoleId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(AuthzError::Database)?;

        entities::AdminBootstrap::insert(admin_bootstrap::ActiveModel {
            id: Set(admin_bootstrap::MARKER_ID),
            user_id: Set(user_id),
            created_at: Set(now.into()),
        })
        .on_conflict(
            OnConflict::column(admin_bootstrap::Column::Id)
                .update_columns([
                    admin_bootstrap::Column::UserId,
                    admin_bootstrap::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(AuthzError::Database)?;

        txn.commit().await.map_err(AuthzError::Database)?;
        info!("Bootstrapped admin {}", user_id);
        Ok(Some(user_id))
    }

    /// The most recent bootstrap grant, if any
    pub async fn last_bootstrap(&self) -> Result<Option<admin_bootstrap::Model>> {
        entities::AdminBootstrap::find_by_id(admin_bootstrap::MARKER_ID)
            .one(&self.db)
            .await
            .map_err(AuthzError::Database)
    }
}
