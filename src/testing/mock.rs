//! Mock implementations of external dependencies

use std::sync::Mutex;

use async_trait::async_trait;

use crate::mail::{MailError, Mailer};
use crate::oauth::{ExternalProfile, IdentityProvider, OAuthError};

/// A delivered verification email, as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to_email: String,
    pub to_name: String,
    pub code: String,
}

/// Mailer that records deliveries instead of sending them, so tests can
/// read back the plaintext code. Flip `fail` to exercise delivery errors.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: Mutex<bool>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, oldest first
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn deliveries(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// The code from the most recent delivery
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|m| m.code.clone())
    }

    /// Make subsequent deliveries fail
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn fail_next(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        if *self.fail.lock().unwrap() {
            return Err(MailError::Delivery("simulated failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to_email: to_email.to_string(),
            to_name: to_name.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

/// Identity provider that hands back a canned profile instead of talking
/// to the real authorization server, so tests can drive the callback
/// handler end to end.
pub struct StubIdentityProvider {
    profile: Option<ExternalProfile>,
}

impl StubIdentityProvider {
    /// Provider whose code exchange yields the given profile
    #[must_use]
    pub fn with_profile(profile: ExternalProfile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    /// Provider whose code exchange always fails
    #[must_use]
    pub fn rejecting() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn provider(&self) -> &str {
        "discord"
    }

    fn begin_login(&self) -> Result<String, OAuthError> {
        Ok("https://discord.test/oauth2/authorize?response_type=code".to_string())
    }

    async fn complete_login(&self, _code: &str) -> Result<ExternalProfile, OAuthError> {
        self.profile.clone().ok_or_else(|| {
            OAuthError::TokenExchange("provider returned 400".to_string())
        })
    }
}
