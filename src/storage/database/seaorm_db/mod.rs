// Module declarations
mod types;
mod connection;
mod role_ops;
mod assignment_ops;
mod bootstrap_ops;
mod ownership;
mod policy_store;

// Re-export public types
pub use ownership::SeaOrmOwnershipResolver;
pub use types::{DatabaseBackendType, SeaOrmDatabase};
