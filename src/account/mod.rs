//! Account identity and onboarding
//!
//! The state machine in [`machine`] owns the legal `status` transitions;
//! [`service::AccountService`] applies them against the identity store.

pub mod machine;
pub mod service;

pub use machine::{initial_status, next_status, AuthEvent, InvalidTransition};
pub use service::{AccountError, AccountService};
