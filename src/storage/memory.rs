//! In-memory policy store and ownership resolver
//!
//! All tables live behind a single lock, so each call is trivially atomic.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::PolicyStore;
use crate::auth::rbac::{
    Owner, OwnershipResolver, Permission, PermissionId, Principal, ResourceId, ResourceKind, Role,
    RoleGrant, RoleId, UserId, UserWithRoles,
};
use crate::utils::error::{AuthzError, Result};

#[derive(Debug, Default)]
struct PolicyTables {
    next_role_id: RoleId,
    permissions: BTreeMap<PermissionId, Permission>,
    roles: BTreeMap<RoleId, Role>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    principals: HashMap<UserId, Principal>,
}

impl PolicyTables {
    fn role(&self, id: RoleId) -> Result<&Role> {
        self.roles
            .get(&id)
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", id)))
    }

    fn name_taken(&self, name: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|role| role.name == name && Some(role.id) != except)
    }

    fn permission_ids(&self, role_id: RoleId) -> Vec<PermissionId> {
        self.role_permissions
            .range((role_id, PermissionId::MIN)..=(role_id, PermissionId::MAX))
            .map(|(_, permission_id)| *permission_id)
            .collect()
    }

    fn holders(&self, role_id: RoleId) -> usize {
        self.user_roles
            .iter()
            .filter(|(_, held)| *held == role_id)
            .count()
    }
}

/// Volatile [`PolicyStore`]
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    tables: RwLock<PolicyTables>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(PolicyTables {
                next_role_id: 1,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn seed_permissions(&self, permissions: Vec<Permission>) -> Result<()> {
        let mut tables = self.tables.write();
        for permission in permissions {
            tables.permissions.entry(permission.id).or_insert(permission);
        }
        Ok(())
    }

    async fn insert_role(&self, name: &str, description: Option<String>) -> Result<Role> {
        let mut tables = self.tables.write();
        if tables.name_taken(name, None) {
            return Err(AuthzError::duplicate_name(name));
        }

        let role = Role {
            id: tables.next_role_id,
            name: name.to_string(),
            description,
            created_at: Utc::now(),
        };
        tables.next_role_id += 1;
        tables.roles.insert(role.id, role.clone());
        debug!("Inserted role {} ({})", role.name, role.id);
        Ok(role)
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<String>,
    ) -> Result<Role> {
        let mut tables = self.tables.write();
        tables.role(id)?;
        if tables.name_taken(name, Some(id)) {
            return Err(AuthzError::duplicate_name(name));
        }

        let role = tables
            .roles
            .get_mut(&id)
            .ok_or_else(|| AuthzError::role_not_found(format!("#{}", id)))?;
        role.name = name.to_string();
        role.description = description;
        Ok(role.clone())
    }

    async fn delete_role(&self, id: RoleId, cascade: bool) -> Result<Role> {
        let mut tables = self.tables.write();
        let role = tables.role(id)?.clone();

        if !cascade && tables.holders(id) > 0 {
            return Err(AuthzError::role_in_use(role.name));
        }

        tables.user_roles.retain(|(_, role_id)| *role_id != id);
        tables.role_permissions.retain(|(role_id, _)| *role_id != id);
        tables.roles.remove(&id);
        Ok(role)
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>> {
        Ok(self.tables.read().roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self
            .tables
            .read()
            .roles
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    async fn list_role_grants(&self) -> Result<Vec<RoleGrant>> {
        let tables = self.tables.read();
        Ok(tables
            .roles
            .values()
            .map(|role| RoleGrant {
                role: role.clone(),
                permission_ids: tables.permission_ids(role.id),
            })
            .collect())
    }

    async fn grant_permission(&self, role_id: RoleId, permission_id: PermissionId) -> Result<()> {
        let mut tables = self.tables.write();
        tables.role(role_id)?;
        if !tables.permissions.contains_key(&permission_id) {
            return Err(AuthzError::unknown_permission(format!("#{}", permission_id), "?"));
        }
        tables.role_permissions.insert((role_id, permission_id));
        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        tables.role(role_id)?;
        tables.role_permissions.remove(&(role_id, permission_id));
        Ok(())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        let mut tables = self.tables.write();
        tables.role(role_id)?;
        tables.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn remove_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        keep_last_holder: bool,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.user_roles.contains(&(user_id, role_id)) {
            return Ok(());
        }
        if keep_last_holder && tables.holders(role_id) == 1 {
            let name = tables.role(role_id)?.name.clone();
            return Err(AuthzError::protected_role(format!(
                "{} is the last holder of {}",
                user_id, name
            )));
        }
        tables.user_roles.remove(&(user_id, role_id));
        Ok(())
    }

    async fn grants_for_user(&self, user_id: UserId) -> Result<Vec<RoleGrant>> {
        let tables = self.tables.read();
        tables
            .user_roles
            .range((user_id, RoleId::MIN)..=(user_id, RoleId::MAX))
            .map(|(_, role_id)| {
                Ok(RoleGrant {
                    role: tables.role(*role_id)?.clone(),
                    permission_ids: tables.permission_ids(*role_id),
                })
            })
            .collect()
    }

    async fn list_users_with_roles(&self) -> Result<Vec<UserWithRoles>> {
        let tables = self.tables.read();
        let mut users: BTreeMap<UserId, UserWithRoles> = tables
            .principals
            .values()
            .map(|principal| {
                (
                    principal.user_id,
                    UserWithRoles {
                        user_id: principal.user_id,
                        email: principal.email.clone(),
                        display_name: principal.display_name.clone(),
                        roles: Vec::new(),
                    },
                )
            })
            .collect();

        for (user_id, role_id) in &tables.user_roles {
            let name = tables.role(*role_id)?.name.clone();
            users
                .entry(*user_id)
                .or_insert_with(|| UserWithRoles {
                    user_id: *user_id,
                    email: None,
                    display_name: None,
                    roles: Vec::new(),
                })
                .roles
                .push(name);
        }

        Ok(users
            .into_values()
            .map(|mut user| {
                user.roles.sort();
                user
            })
            .collect())
    }

    async fn upsert_principal(&self, principal: Principal) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.principals.get_mut(&principal.user_id) {
            Some(existing) => {
                existing.email = principal.email;
                existing.display_name = principal.display_name;
            }
            None => {
                tables.principals.insert(principal.user_id, principal);
            }
        }
        Ok(())
    }

    async fn bootstrap_admin(
        &self,
        admin_role: RoleId,
        candidate: Option<UserId>,
    ) -> Result<Option<UserId>> {
        let mut tables = self.tables.write();
        tables.role(admin_role)?;

        if tables.holders(admin_role) > 0 {
            return Ok(None);
        }

        let chosen = candidate.or_else(|| {
            tables
                .principals
                .values()
                .min_by_key(|p| (p.registered_at, p.user_id))
                .map(|p| p.user_id)
        });

        if let Some(user_id) = chosen {
            tables.user_roles.insert((user_id, admin_role));
        }
        Ok(chosen)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Volatile [`OwnershipResolver`] fed by the embedding application
#[derive(Debug, Default)]
pub struct MemoryOwnershipResolver {
    owners: DashMap<(ResourceKind, ResourceId), UserId>,
}

impl MemoryOwnershipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the creating user of an instance. Ignored for kinds without
    /// an owner concept.
    pub fn record_owner(&self, kind: ResourceKind, id: ResourceId, owner: UserId) {
        if kind.has_owner() {
            self.owners.insert((kind, id), owner);
        } else {
            debug!("{} instances have no owner, ignoring {}", kind, id);
        }
    }

    pub fn forget(&self, kind: ResourceKind, id: ResourceId) {
        self.owners.remove(&(kind, id));
    }
}

#[async_trait]
impl OwnershipResolver for MemoryOwnershipResolver {
    async fn owner_of(&self, kind: ResourceKind, id: ResourceId) -> Result<Owner> {
        if !kind.has_owner() {
            return Ok(Owner::NoOwner);
        }
        Ok(self
            .owners
            .get(&(kind, id))
            .map(|entry| Owner::User(*entry.value()))
            .unwrap_or(Owner::NoOwner))
    }
}
