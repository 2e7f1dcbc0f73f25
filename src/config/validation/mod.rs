//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `rbac_validators`: Policy validators (RbacConfig, PermissionCacheConfig)
//! - `storage_validators`: Storage-related validators
//! - `tests`: Test suite for all validators

mod rbac_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
