//! Test fixtures providing pre-built test objects

use std::sync::Arc;

use crate::account::AccountService;
use crate::models::{Account, AccountStatus, ExternalIdentity};
use crate::oauth::ExternalProfile;
use crate::session::SessionManager;
use crate::store::memory::MemoryStore;
use crate::verification::VerificationService;

use super::constants::{
    TEST_DISPLAY_NAME, TEST_EMAIL, TEST_EXTERNAL_ID, TEST_PROVIDER, TEST_SESSION_SECRET,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// In-memory store shared by the services built from it
    #[must_use]
    pub fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[must_use]
    pub fn account_service(store: &Arc<MemoryStore>) -> AccountService {
        AccountService::new(store.clone())
    }

    #[must_use]
    pub fn verification_service(store: &Arc<MemoryStore>) -> VerificationService {
        VerificationService::new(store.clone())
    }

    /// Session manager with the fixture secret; cookies are not marked
    /// secure so test requests over plain HTTP carry them
    #[must_use]
    pub fn session_manager() -> SessionManager {
        SessionManager::new(TEST_SESSION_SECRET, false, 168)
    }

    /// Provider profile as the OAuth layer would hand it over
    #[must_use]
    pub fn external_profile() -> ExternalProfile {
        ExternalProfile {
            external_id: TEST_EXTERNAL_ID.to_string(),
            username: "steve#0001".to_string(),
            avatar_url: Some(format!(
                "https://cdn.example.com/avatars/{TEST_EXTERNAL_ID}/abc.png"
            )),
            email: Some(TEST_EMAIL.to_string()),
        }
    }

    /// Provider profile whose account lacks a verified email
    #[must_use]
    pub fn external_profile_without_email() -> ExternalProfile {
        let mut profile = Self::external_profile();
        profile.email = None;
        profile
    }

    /// Fully onboarded account, not persisted anywhere
    #[must_use]
    pub fn active_account() -> Account {
        let mut account = Account::new(AccountStatus::Active);
        account.external_identity = Some(ExternalIdentity {
            provider: TEST_PROVIDER.to_string(),
            external_id: TEST_EXTERNAL_ID.to_string(),
        });
        account.email = Some(TEST_EMAIL.to_string());
        account.display_name = Some(TEST_DISPLAY_NAME.to_string());
        account
    }
}
