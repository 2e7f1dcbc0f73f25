//! Utility modules for the authorization core
//!
//! ## Module Organization
//!
//! - **error**: Error taxonomy and result alias

pub mod error; // Error handling
