//! Short-lived cache of effective permission sets
//!
//! A stale allow is a security bug, so invalidation is over-eager: any
//! mutation retires every entry loaded before it. Loads that race an
//! invalidation are never served.

use moka::future::Cache;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::types::{PermissionId, RoleGrant, UserId};
use crate::config::PermissionCacheConfig;

/// Everything a decision needs about one actor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Names of the held roles, sorted
    pub roles: Vec<String>,
    /// Union of the permissions of every held role
    pub permission_ids: HashSet<PermissionId>,
    /// Whether the bypass role is among the held roles
    pub is_admin: bool,
    by_role: HashMap<String, HashSet<PermissionId>>,
}

impl EffectivePermissions {
    pub(crate) fn from_grants(grants: Vec<RoleGrant>, admin_role: &str) -> Self {
        let mut effective = Self::default();
        for grant in grants {
            if grant.role.name == admin_role {
                effective.is_admin = true;
            }
            effective
                .permission_ids
                .extend(grant.permission_ids.iter().copied());
            effective
                .by_role
                .insert(grant.role.name.clone(), grant.permission_ids.into_iter().collect());
            effective.roles.push(grant.role.name);
        }
        effective.roles.sort();
        effective
    }

    pub fn holds(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    /// Held roles that include `permission_id`, sorted
    pub fn granting_roles(&self, permission_id: PermissionId) -> Vec<String> {
        self.roles
            .iter()
            .filter(|role| {
                self.by_role
                    .get(*role)
                    .is_some_and(|ids| ids.contains(&permission_id))
            })
            .cloned()
            .collect()
    }
}

/// A permission set stamped with the epoch it was loaded at
#[derive(Clone)]
struct Stamped {
    loaded_at: u64,
    value: Arc<EffectivePermissions>,
}

/// Actor-keyed cache whose entries expire at the next invalidation
///
/// Every invalidation advances the epoch, and `get` only returns entries
/// loaded at the current epoch, so a set loaded before a mutation is never
/// served after it.
#[derive(Clone)]
pub(crate) struct PermissionCache {
    entries: Cache<UserId, Stamped>,
    epoch: Arc<AtomicU64>,
}

impl PermissionCache {
    pub(crate) fn new(config: &PermissionCacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();
        Self {
            entries,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current epoch, to be read before loading from the store
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub(crate) async fn get(&self, user_id: &UserId) -> Option<Arc<EffectivePermissions>> {
        let entry = self.entries.get(user_id).await?;
        if entry.loaded_at != self.epoch() {
            debug!("Ignoring permission set for {} from an older epoch", user_id);
            return None;
        }
        Some(entry.value)
    }

    /// Insert a value loaded at `loaded_at`. Skipped when an invalidation
    /// already happened meanwhile.
    pub(crate) async fn insert(
        &self,
        user_id: UserId,
        value: Arc<EffectivePermissions>,
        loaded_at: u64,
    ) {
        if self.epoch() != loaded_at {
            debug!("Discarding permission set for {} loaded before invalidation", user_id);
            return;
        }
        self.entries
            .insert(user_id, Stamped { loaded_at, value })
            .await;
    }

    pub(crate) async fn invalidate(&self, user_id: &UserId) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.invalidate(user_id).await;
    }

    pub(crate) fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.invalidate_all();
    }
}
