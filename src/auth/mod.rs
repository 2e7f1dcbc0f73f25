//! Authorization system
//!
//! Authentication is the identity provider's job; everything here takes the
//! already authenticated actor id as an explicit argument.

pub mod rbac;

pub use rbac::{OwnershipResolver, RbacSystem};
