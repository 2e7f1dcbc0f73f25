//! Permission checking methods
//!
//! Every check fails closed: a store or resolver fault is logged and turned
//! into a deny, never into an error the caller could mistake for an allow.

use tracing::{debug, error};

use super::system::RbacSystem;
use super::types::{
    ADMIN_ROLE, ActionKind, DecisionReason, MANAGER_ROLE, Owner, Permission, PermissionCheck,
    ResourceId, ResourceKind, Role, UserId,
};
use crate::utils::error::Result;

impl RbacSystem {
    /// Check whether an actor may perform `action` on any `resource`,
    /// explaining the outcome
    pub async fn check_permission_detailed(
        &self,
        actor: UserId,
        resource: ResourceKind,
        action: ActionKind,
    ) -> PermissionCheck {
        let effective = match self.effective_for(actor).await {
            Ok(effective) => effective,
            Err(e) => {
                error!(
                    actor = %actor,
                    resource = %resource,
                    action = %action,
                    error = %e,
                    "Permission lookup failed, denying"
                );
                return PermissionCheck::deny(DecisionReason::StoreUnavailable);
            }
        };

        if effective.is_admin {
            return PermissionCheck::allow(
                DecisionReason::AdminBypass,
                vec![ADMIN_ROLE.to_string()],
            );
        }

        // The catalog covers every typed pair; a miss here means the
        // vocabulary and the enums drifted apart
        let Ok(permission) = self.catalog.resolve(resource, action) else {
            error!(resource = %resource, action = %action, "Pair missing from catalog, denying");
            return PermissionCheck::deny(DecisionReason::MissingPermission);
        };

        let roles = effective.granting_roles(permission.id);
        if roles.is_empty() {
            debug!("{} lacks {}", actor, permission.name);
            PermissionCheck::deny(DecisionReason::MissingPermission)
        } else {
            PermissionCheck::allow(DecisionReason::RoleGrant, roles)
        }
    }

    /// Whether an actor may perform `action` on any `resource`
    pub async fn has_permission(
        &self,
        actor: UserId,
        resource: ResourceKind,
        action: ActionKind,
    ) -> bool {
        self.check_permission_detailed(actor, resource, action)
            .await
            .granted
    }

    /// Check whether an actor may perform `action` on one resource
    /// instance, explaining the outcome
    ///
    /// A role grant always wins. Failing that, owners may perform the
    /// configured ownership actions on what they created. Creating and
    /// deleting are never granted by ownership.
    pub async fn check_resource_access_detailed(
        &self,
        actor: UserId,
        resource: ResourceKind,
        id: ResourceId,
        action: ActionKind,
    ) -> PermissionCheck {
        let by_role = self.check_permission_detailed(actor, resource, action).await;
        if by_role.granted || by_role.reason == DecisionReason::StoreUnavailable {
            return by_role;
        }

        if !self.ownership_applies(resource, action) {
            return by_role;
        }

        match self.owners.owner_of(resource, id).await {
            Ok(Owner::User(owner)) if owner == actor => {
                PermissionCheck::allow(DecisionReason::Ownership, Vec::new())
            }
            Ok(_) => PermissionCheck::deny(DecisionReason::NotOwner),
            Err(e) => {
                error!(
                    actor = %actor,
                    resource = %resource,
                    resource_id = id,
                    action = %action,
                    error = %e,
                    "Owner lookup failed, denying"
                );
                PermissionCheck::deny(DecisionReason::StoreUnavailable)
            }
        }
    }

    /// Whether an actor may perform `action` on one resource instance
    pub async fn can_access_resource(
        &self,
        actor: UserId,
        resource: ResourceKind,
        id: ResourceId,
        action: ActionKind,
    ) -> bool {
        self.check_resource_access_detailed(actor, resource, id, action)
            .await
            .granted
    }

    /// Whether `actor` created the resource instance. Unowned kinds,
    /// missing instances and lookup faults all answer `false`.
    pub async fn is_owner(&self, actor: UserId, resource: ResourceKind, id: ResourceId) -> bool {
        match self.owners.owner_of(resource, id).await {
            Ok(Owner::User(owner)) => owner == actor,
            Ok(Owner::NoOwner) => false,
            Err(e) => {
                error!(
                    actor = %actor,
                    resource = %resource,
                    resource_id = id,
                    error = %e,
                    "Owner lookup failed"
                );
                false
            }
        }
    }

    /// Whether the actor holds the bypass role
    pub async fn is_admin(&self, actor: UserId) -> bool {
        self.holds_any(actor, &[ADMIN_ROLE]).await
    }

    /// Whether the actor holds `admin` or `manager`
    pub async fn is_manager(&self, actor: UserId) -> bool {
        self.holds_any(actor, &[ADMIN_ROLE, MANAGER_ROLE]).await
    }

    /// Every permission the actor can exercise through roles. Admins get
    /// the whole catalog.
    pub async fn effective_permissions(&self, actor: UserId) -> Result<Vec<Permission>> {
        let effective = self.effective_for(actor).await?;

        if effective.is_admin {
            return Ok(self.catalog.list());
        }

        Ok(self
            .catalog
            .list()
            .into_iter()
            .filter(|p| effective.permission_ids.contains(&p.id))
            .collect())
    }

    /// Roles held by the actor, sorted by name
    pub async fn user_roles(&self, actor: UserId) -> Result<Vec<Role>> {
        self.list_roles_for_user(actor).await
    }

    fn ownership_applies(&self, resource: ResourceKind, action: ActionKind) -> bool {
        resource.has_owner()
            && !matches!(action, ActionKind::Create | ActionKind::Delete)
            && self.config.ownership_actions.contains(&action)
    }

    async fn holds_any(&self, actor: UserId, roles: &[&str]) -> bool {
        match self.effective_for(actor).await {
            Ok(effective) => roles.iter().any(|role| effective.holds(role)),
            Err(e) => {
                error!(actor = %actor, error = %e, "Role lookup failed");
                false
            }
        }
    }
}
