//! Permission catalog
//!
//! The static `(resource, action)` vocabulary. Ids are derived from the enum
//! positions so every store and every process agrees on them without a
//! round trip.

use std::collections::HashMap;
use tracing::debug;

use super::types::{ActionKind, Permission, PermissionId, ResourceKind};
use crate::utils::error::{AuthzError, Result};

/// Read-only lookup of every grantable permission
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    by_pair: HashMap<(ResourceKind, ActionKind), Permission>,
    by_id: HashMap<PermissionId, (ResourceKind, ActionKind)>,
}

impl PermissionCatalog {
    /// Seed the catalog with every resource/action combination
    pub fn new() -> Self {
        let mut by_pair = HashMap::new();
        let mut by_id = HashMap::new();

        for resource in ResourceKind::ALL {
            for action in ActionKind::ALL {
                let permission = Permission {
                    id: Self::permission_id(resource, action),
                    name: format!("{}.{}", resource, action),
                    description: Some(describe(resource, action)),
                    resource,
                    action,
                };
                by_id.insert(permission.id, (resource, action));
                by_pair.insert((resource, action), permission);
            }
        }

        debug!("Initialized {} catalog permissions", by_pair.len());
        Self { by_pair, by_id }
    }

    fn permission_id(resource: ResourceKind, action: ActionKind) -> PermissionId {
        resource.ordinal() * ActionKind::ALL.len() as i32 + action.ordinal() + 1
    }

    /// Resolve a typed pair to its permission
    pub fn resolve(&self, resource: ResourceKind, action: ActionKind) -> Result<&Permission> {
        self.by_pair
            .get(&(resource, action))
            .ok_or_else(|| AuthzError::unknown_permission(resource.to_string(), action.to_string()))
    }

    /// Resolve a pair given as strings, as received from forms or config
    pub fn parse(&self, resource: &str, action: &str) -> Result<&Permission> {
        let unknown = || AuthzError::unknown_permission(resource, action);
        let resource: ResourceKind = resource.parse().map_err(|_| unknown())?;
        let action: ActionKind = action.parse().map_err(|_| unknown())?;
        self.resolve(resource, action)
    }

    /// Look up by id
    pub fn get(&self, id: PermissionId) -> Option<&Permission> {
        self.by_id
            .get(&id)
            .and_then(|pair| self.by_pair.get(pair))
    }

    /// Look up by id, failing for ids outside the catalog
    pub fn require(&self, id: PermissionId) -> Result<&Permission> {
        self.get(id)
            .ok_or_else(|| AuthzError::unknown_permission(format!("#{}", id), "?"))
    }

    pub fn contains(&self, id: PermissionId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All permissions ordered by resource then action
    pub fn list(&self) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self.by_pair.values().cloned().collect();
        permissions.sort_by(|a, b| {
            a.resource
                .table_name()
                .cmp(b.resource.table_name())
                .then_with(|| a.action.as_str().cmp(b.action.as_str()))
        });
        permissions
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(resource: ResourceKind, action: ActionKind) -> String {
    let subject = resource.table_name().replace('_', " ");
    match action {
        ActionKind::Create => format!("Create {}", subject),
        ActionKind::Read => format!("View {}", subject),
        ActionKind::Update => format!("Edit {}", subject),
        ActionKind::Delete => format!("Delete {}", subject),
        ActionKind::Submit => format!("Submit {}", subject),
    }
}
