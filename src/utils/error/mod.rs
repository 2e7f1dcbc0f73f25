//! Error Handling utilities
//!
//! This module provides the error taxonomy shared by the policy store, the
//! administrative operations and configuration loading.

pub mod error;

// Re-export commonly used types
pub use error::*;
