//! Onboarding state machine
//!
//! The single authority over the `status` field of an account. Every login
//! method (guest registration, email code, OAuth) feeds the same machine as
//! an [`AuthEvent`]; no caller writes `status` directly.

use crate::models::AccountStatus;
use thiserror::Error;

/// An authentication or onboarding event applied to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Completed OAuth login; the provider profile may or may not carry an
    /// email address
    OAuthLogin { profile_has_email: bool },
    /// Guest or email registration with a display name supplied
    Registration { has_verified_email: bool },
    /// A verification code was confirmed for the account's email
    EmailVerified,
    /// The player submitted their in-game name
    DisplayNameSubmitted,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid transition from {from:?}")]
pub struct InvalidTransition {
    pub from: AccountStatus,
}

/// Initial status for a freshly created account
#[must_use]
pub fn initial_status(event: AuthEvent) -> AccountStatus {
    match event {
        AuthEvent::OAuthLogin {
            profile_has_email: true,
        } => AccountStatus::NeedsDisplayName,
        AuthEvent::Registration {
            has_verified_email: true,
        } => AccountStatus::Active,
        _ => AccountStatus::NeedsEmail,
    }
}

/// Compute the next status for an existing account, or reject the event
///
/// # Errors
///
/// Returns `InvalidTransition` when no transition row matches; the caller
/// must apply no side effect in that case.
pub fn next_status(
    current: AccountStatus,
    event: AuthEvent,
) -> Result<AccountStatus, InvalidTransition> {
    match (current, event) {
        (AccountStatus::NeedsEmail, AuthEvent::EmailVerified) => {
            Ok(AccountStatus::NeedsDisplayName)
        }
        (AccountStatus::NeedsDisplayName, AuthEvent::DisplayNameSubmitted) => {
            Ok(AccountStatus::Active)
        }
        (from, _) => Err(InvalidTransition { from }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_oauth_with_email() {
        assert_eq!(
            initial_status(AuthEvent::OAuthLogin {
                profile_has_email: true
            }),
            AccountStatus::NeedsDisplayName
        );
    }

    #[test]
    fn test_initial_status_oauth_without_email() {
        assert_eq!(
            initial_status(AuthEvent::OAuthLogin {
                profile_has_email: false
            }),
            AccountStatus::NeedsEmail
        );
    }

    #[test]
    fn test_initial_status_registration() {
        assert_eq!(
            initial_status(AuthEvent::Registration {
                has_verified_email: false
            }),
            AccountStatus::NeedsEmail
        );
        assert_eq!(
            initial_status(AuthEvent::Registration {
                has_verified_email: true
            }),
            AccountStatus::Active
        );
    }

    #[test]
    fn test_email_verification_advances() {
        assert_eq!(
            next_status(AccountStatus::NeedsEmail, AuthEvent::EmailVerified).unwrap(),
            AccountStatus::NeedsDisplayName
        );
    }

    #[test]
    fn test_display_name_activates() {
        assert_eq!(
            next_status(AccountStatus::NeedsDisplayName, AuthEvent::DisplayNameSubmitted).unwrap(),
            AccountStatus::Active
        );
    }

    #[test]
    fn test_active_is_terminal() {
        assert!(next_status(AccountStatus::Active, AuthEvent::EmailVerified).is_err());
        assert!(next_status(AccountStatus::Active, AuthEvent::DisplayNameSubmitted).is_err());
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        // Display name before the email is verified
        assert!(next_status(AccountStatus::NeedsEmail, AuthEvent::DisplayNameSubmitted).is_err());
        // Verifying an email twice
        assert!(next_status(AccountStatus::NeedsDisplayName, AuthEvent::EmailVerified).is_err());
    }
}
