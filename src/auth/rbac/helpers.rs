//! Helper methods for RBAC operations

use std::sync::Arc;

use super::cache::EffectivePermissions;
use super::system::RbacSystem;
use super::types::{ADMIN_ROLE, UserId};
use crate::utils::error::Result;

impl RbacSystem {
    /// Effective permissions of an actor, served from the cache when enabled
    pub(super) async fn effective_for(&self, user_id: UserId) -> Result<Arc<EffectivePermissions>> {
        let Some(cache) = &self.cache else {
            return self.load_effective(user_id).await.map(Arc::new);
        };

        if let Some(hit) = cache.get(&user_id).await {
            return Ok(hit);
        }

        let loaded_at = cache.epoch();
        let effective = Arc::new(self.load_effective(user_id).await?);
        cache.insert(user_id, effective.clone(), loaded_at).await;
        Ok(effective)
    }

    /// One snapshot read; any error discards the whole set
    async fn load_effective(&self, user_id: UserId) -> Result<EffectivePermissions> {
        let grants = self.store.grants_for_user(user_id).await?;
        Ok(EffectivePermissions::from_grants(grants, ADMIN_ROLE))
    }

    /// Drop the cached set of one actor
    pub(super) async fn invalidate_actor(&self, user_id: UserId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&user_id).await;
        }
    }

    /// Drop every cached set
    pub(super) fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}
