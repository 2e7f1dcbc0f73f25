//! Common test utilities for scorecard-authz
//!
//! - In-memory SQLite database support
//! - Principal factories
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{TestDatabase, PrincipalFactory};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = TestDatabase::new().await;
//!     let principal = PrincipalFactory::create();
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::PrincipalFactory;
