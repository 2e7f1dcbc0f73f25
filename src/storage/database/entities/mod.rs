/// Admin bootstrap record entity module
pub mod admin_bootstrap;
/// Permission entity module
pub mod permission;
/// Principal entity module
pub mod principal;
/// Role entity module
pub mod role;
/// Role-permission link entity module
pub mod role_permission;
/// Principal-role link entity module
pub mod user_role;

pub use admin_bootstrap::Entity as AdminBootstrap;
pub use permission::Entity as Permission;
pub use principal::Entity as Principal;
pub use role::Entity as Role;
pub use role_permission::Entity as RolePermission;
pub use user_role::Entity as UserRole;
