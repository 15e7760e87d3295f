#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the rankgate application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod account;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod oauth;
pub mod progression;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;
pub mod verification;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use account::AccountService;
pub use models::{Account, AccountStatus};
pub use oauth::OAuthLinker;
pub use session::SessionManager;
pub use settings::RankgateSettings;
pub use store::IdentityStore;
pub use verification::VerificationService;
