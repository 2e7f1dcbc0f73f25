//! Error types for the authorization core

use thiserror::Error;

/// Result type alias for the authorization core
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Main error type for the authorization core
#[derive(Error, Debug)]
pub enum AuthzError {
    /// Resource/action pair outside the closed vocabulary
    #[error("Unknown permission: {resource}.{action}")]
    UnknownPermission { resource: String, action: String },

    /// Role lookup by id or name failed
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// A role with the same name already exists
    #[error("Duplicate role name: {0}")]
    DuplicateName(String),

    /// Role is still assigned to at least one principal
    #[error("Role in use: {0}")]
    RoleInUse(String),

    /// Mutation would break the admin bypass invariant
    #[error("Protected role: {0}")]
    ProtectedRole(String),

    /// Backing store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
