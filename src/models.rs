//! Durable record types for the identity store
//!
//! These structs mirror the documents kept in the external store. Field
//! names are the wire names; every record round-trips through JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection holding one document per player account
pub const ACCOUNTS: &str = "accounts";
/// Collection holding outstanding email verification codes
pub const VERIFICATION_CODES: &str = "verification_codes";

/// Onboarding state of an account. Only the state machine in
/// `crate::account` may write this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    NeedsEmail,
    NeedsDisplayName,
    Active,
}

/// The `(provider, external_id)` pair identifying a returning OAuth user.
/// At most one account exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: String,
    pub external_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(flatten)]
    pub external_identity: Option<ExternalIdentity>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub status: AccountStatus,
    /// Display name as reported by the OAuth provider (cached on login)
    #[serde(default)]
    pub provider_username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    // Counters mutated only by match-result ingestion
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default = "default_rating")]
    pub rating: u32,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

fn default_rating() -> u32 {
    1000
}

impl Account {
    /// Create a fresh account record with default counters
    #[must_use]
    pub fn new(status: AccountStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            external_identity: None,
            email: None,
            display_name: None,
            status,
            provider_username: None,
            avatar_url: None,
            matches_played: 0,
            wins: 0,
            losses: 0,
            rating: default_rating(),
            created_at: now,
            last_seen_at: now,
        }
    }
}

/// A short-lived one-time email verification code. Only the SHA-256 hash of
/// the code digits is ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCode {
    pub id: String,
    pub account_id: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(AccountStatus::NeedsEmail).unwrap(),
            json!("needs_email")
        );
        assert_eq!(
            serde_json::to_value(AccountStatus::NeedsDisplayName).unwrap(),
            json!("needs_display_name")
        );
        assert_eq!(
            serde_json::to_value(AccountStatus::Active).unwrap(),
            json!("active")
        );
    }

    #[test]
    fn test_account_defaults() {
        let account = Account::new(AccountStatus::NeedsEmail);
        assert_eq!(account.matches_played, 0);
        assert_eq!(account.wins, 0);
        assert_eq!(account.losses, 0);
        assert_eq!(account.rating, 1000);
        assert!(account.external_identity.is_none());
    }

    #[test]
    fn test_external_identity_flattens_onto_record() {
        let mut account = Account::new(AccountStatus::NeedsDisplayName);
        account.external_identity = Some(ExternalIdentity {
            provider: "discord".to_string(),
            external_id: "1234".to_string(),
        });

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["provider"], json!("discord"));
        assert_eq!(value["external_id"], json!("1234"));

        let back: Account = serde_json::from_value(value).unwrap();
        assert_eq!(back.external_identity, account.external_identity);
    }

    #[test]
    fn test_account_without_identity_roundtrips() {
        let account = Account::new(AccountStatus::NeedsEmail);
        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("provider").is_none());

        let back: Account = serde_json::from_value(value).unwrap();
        assert!(back.external_identity.is_none());
        assert_eq!(back.rating, 1000);
    }
}
