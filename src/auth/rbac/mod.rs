//! Role-Based Access Control (RBAC) system
//!
//! Decides whether an actor may perform an action on a resource category
//! or on one resource instance, and manages the roles behind those
//! decisions.

mod assignments;
mod cache;
mod catalog;
mod helpers;
mod ownership;
mod permissions;
mod roles;
mod system;
mod types;

// Re-export public types and structs
pub use cache::EffectivePermissions;
pub use catalog::PermissionCatalog;
#[cfg(test)]
pub use ownership::MockOwnershipResolver;
pub use ownership::OwnershipResolver;
pub use system::RbacSystem;
pub use types::{
    ADMIN_ROLE, ActionKind, DecisionReason, MANAGER_ROLE, Owner, Permission, PermissionCheck,
    PermissionId, Principal, ResourceId, ResourceKind, Role, RoleGrant, RoleId,
    RoleWithPermissions, UserId, UserWithRoles,
};
