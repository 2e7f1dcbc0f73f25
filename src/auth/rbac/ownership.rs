//! Ownership resolution
//!
//! Which actor owns a given resource instance is data owned by the storage
//! collaborator. The engine only sees this trait.

use async_trait::async_trait;

use super::types::{Owner, ResourceId, ResourceKind};
use crate::utils::error::Result;

/// Per-resource-kind owner lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnershipResolver: Send + Sync {
    /// Owner of `(kind, id)`. Kinds without an owner concept, and instances
    /// that do not exist, resolve to [`Owner::NoOwner`].
    async fn owner_of(&self, kind: ResourceKind, id: ResourceId) -> Result<Owner>;
}
