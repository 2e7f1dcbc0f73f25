//! Configuration data models
//!
//! This module defines all configuration structures used by the authorization core.

#![allow(missing_docs)]

pub mod authz;
pub mod rbac;
pub mod storage;

// Re-export all configuration types
pub use authz::*;
pub use rbac::*;
pub use storage::*;

pub fn default_true() -> bool {
    true
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

/// Default permission cache TTL in seconds
pub fn default_cache_ttl() -> u64 {
    30
}

pub fn default_cache_max_entries() -> u64 {
    10_000
}
