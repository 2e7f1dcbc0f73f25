//! Integration tests for scorecard-authz
//!
//! These tests verify component interactions using real database
//! instances (in-memory SQLite, or shared temporary files).

mod concurrency_tests;
mod config_tests;
mod engine_tests;
mod seaorm_store_tests;
