//! Unified testing utilities for Rankgate
//!
//! Consolidates test helpers, fixtures, and mocks into a single location so
//! unit and integration tests share the same building blocks.
//!
//! - [`fixtures`] - Pre-built test data (accounts, services, sessions)
//! - [`requests`] - HTTP request builders for testing handlers
//! - [`mock`] - Mock implementations of external dependencies

pub mod fixtures;
pub mod mock;
pub mod requests;

/// Shared constants used across test modules
pub mod constants {
    pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-fixtures";
    pub const TEST_EMAIL: &str = "steve@example.com";
    pub const TEST_DISPLAY_NAME: &str = "Steve";
    pub const TEST_PROVIDER: &str = "discord";
    pub const TEST_EXTERNAL_ID: &str = "discord-user-42";
}
