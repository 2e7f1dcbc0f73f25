//! Helper functions for creating specific error types

use super::types::AuthzError;
use sea_orm::{DbErr, SqlErr};

/// Helper functions for creating specific errors
impl AuthzError {
    pub fn unknown_permission<R: Into<String>, A: Into<String>>(resource: R, action: A) -> Self {
        Self::UnknownPermission {
            resource: resource.into(),
            action: action.into(),
        }
    }

    pub fn role_not_found<S: Into<String>>(role: S) -> Self {
        Self::RoleNotFound(role.into())
    }

    pub fn duplicate_name<S: Into<String>>(name: S) -> Self {
        Self::DuplicateName(name.into())
    }

    pub fn role_in_use<S: Into<String>>(role: S) -> Self {
        Self::RoleInUse(role.into())
    }

    pub fn protected_role<S: Into<String>>(message: S) -> Self {
        Self::ProtectedRole(message.into())
    }

    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }
}

impl AuthzError {
    /// Whether this error means the policy store itself is at fault, as
    /// opposed to a rejected request
    pub fn is_store_fault(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Database(_))
    }

    /// Map a unique-constraint violation on a role insert or rename to
    /// `DuplicateName`; every other database error passes through
    pub(crate) fn from_role_write(err: DbErr, name: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::duplicate_name(name),
            _ => Self::Database(err),
        }
    }
}
