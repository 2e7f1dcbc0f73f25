//! Test fixtures and data factories
//!
//! Provides factory methods for creating test data with sensible defaults.

use chrono::{Duration, Utc};
use scorecard_authz::Principal;
use uuid::Uuid;

/// Factory for creating test principals
pub struct PrincipalFactory;

impl PrincipalFactory {
    /// Create a principal registered now
    pub fn create() -> Principal {
        let tag = &Uuid::new_v4().to_string()[..8];
        Principal::new(Uuid::new_v4())
            .with_email(format!("player-{}@example.com", tag))
            .with_display_name(format!("Player {}", tag))
    }

    /// Create principals registered one minute apart, oldest first
    pub fn registered_in_order(count: usize) -> Vec<Principal> {
        let start = Utc::now() - Duration::hours(1);
        (0..count)
            .map(|i| {
                let mut principal = Self::create();
                principal.registered_at = start + Duration::minutes(i as i64);
                principal
            })
            .collect()
    }
}
