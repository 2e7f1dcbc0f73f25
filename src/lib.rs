//! # scorecard-authz
//!
//! Role-based access control and resource ownership for the tournament
//! scorecard service.
//!
//! ## Features
//!
//! - **Closed vocabulary**: resources and actions are enums, so an unknown
//!   pair is a compile error rather than a runtime miss
//! - **Admin bypass**: the `admin` role passes every check
//! - **Ownership**: creators may read, edit and submit what they created
//! - **Fail closed**: a store fault during a decision is a deny, never an
//!   error the caller could ignore
//! - **Pluggable storage**: in-memory or SeaORM (SQLite/PostgreSQL)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scorecard_authz::{ActionKind, Config, RbacSystem, ResourceKind};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/authz.yaml").await?;
//!     let rbac = RbacSystem::from_config(&config).await?;
//!
//!     let actor = Uuid::new_v4();
//!     if rbac.can_access_resource(actor, ResourceKind::Sessions, 7, ActionKind::Update).await {
//!         // edit session 7
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Public module exports
pub mod auth;
pub mod config;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::rbac::{
    ADMIN_ROLE, ActionKind, DecisionReason, MANAGER_ROLE, Owner, OwnershipResolver, Permission,
    PermissionCheck, PermissionId, Principal, RbacSystem, ResourceId, ResourceKind, Role, RoleId,
    RoleWithPermissions, UserId, UserWithRoles,
};
pub use config::Config;
pub use storage::{PolicyStore, StorageLayer};
pub use utils::error::{AuthzError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
