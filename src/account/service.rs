//! Account operations against the identity store
//!
//! All status writes go through the state machine; everything else the
//! service touches (avatar, cached provider username, last-seen) is an
//! auxiliary field.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use serde_json::json;
use thiserror::Error;

use crate::account::machine::{self, AuthEvent};
use crate::models::{Account, AccountStatus, ExternalIdentity, ACCOUNTS};
use crate::oauth::ExternalProfile;
use crate::store::{decode_first, IdentityStore, Query, StoreError, WriteOp};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid transition")]
    InvalidTransition,
    #[error("email already in use")]
    EmailTaken,
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<machine::InvalidTransition> for AccountError {
    fn from(_: machine::InvalidTransition) -> Self {
        AccountError::InvalidTransition
    }
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn IdentityStore>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Load an account by id
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let records = self
            .store
            .query(Query::collection(ACCOUNTS).where_eq("id", json!(id)).limit(1))
            .await?;
        decode_first(records)
    }

    /// Load an account by its external `(provider, external_id)` identity
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn find_by_external(
        &self,
        provider: &str,
        external_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        let records = self
            .store
            .query(
                Query::collection(ACCOUNTS)
                    .where_eq("provider", json!(provider))
                    .where_eq("external_id", json!(external_id))
                    .limit(1),
            )
            .await?;
        decode_first(records)
    }

    /// Resolve an OAuth profile to a local account, creating one on first
    /// login. Repeated logins with the same external identity return the
    /// same account id.
    ///
    /// The check-then-create here is not atomic: two concurrent first
    /// logins for the same external id can race. The store applies writes
    /// last-writer-wins, leaving a small window in which a duplicate can be
    /// created; the lookup always prefers a single match, so a duplicate is
    /// inert once the race settles.
    ///
    /// # Errors
    ///
    /// Returns a store error if any read or write fails
    pub async fn resolve_external(
        &self,
        provider: &str,
        profile: &ExternalProfile,
    ) -> Result<Account, AccountError> {
        if let Some(mut account) = self.find_by_external(provider, &profile.external_id).await? {
            // Returning player: refresh cached profile fields only
            account.provider_username = Some(profile.username.clone());
            account.avatar_url.clone_from(&profile.avatar_url);
            account.last_seen_at = Utc::now();

            self.store
                .transact(vec![WriteOp::Update {
                    collection: ACCOUNTS,
                    id: account.id.clone(),
                    fields: json!({
                        "provider_username": account.provider_username,
                        "avatar_url": account.avatar_url,
                        "last_seen_at": account.last_seen_at,
                    }),
                }])
                .await?;

            info!("Resolved returning {provider} login to account {}", account.id);
            return Ok(account);
        }

        let status = machine::initial_status(AuthEvent::OAuthLogin {
            profile_has_email: profile.email.is_some(),
        });

        let mut account = Account::new(status);
        account.external_identity = Some(ExternalIdentity {
            provider: provider.to_string(),
            external_id: profile.external_id.clone(),
        });
        account.email.clone_from(&profile.email);
        account.provider_username = Some(profile.username.clone());
        account.avatar_url.clone_from(&profile.avatar_url);

        self.create(&account).await?;
        info!(
            "Created account {} for first {provider} login (status {:?})",
            account.id, account.status
        );
        Ok(account)
    }

    /// Create an account for a guest registration carrying a display name
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails
    pub async fn register_guest(&self, display_name: &str) -> Result<Account, AccountError> {
        let status = machine::initial_status(AuthEvent::Registration {
            has_verified_email: false,
        });

        let mut account = Account::new(status);
        account.display_name = Some(display_name.to_string());

        self.create(&account).await?;
        info!("Created guest account {} (status {:?})", account.id, account.status);
        Ok(account)
    }

    /// Advance an account whose email verification code was just consumed
    ///
    /// Enforces verified-email uniqueness: if another account already holds
    /// the same email at a status past `needs_email`, the transition is
    /// rejected and no state changes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the account is not waiting on email
    /// verification, `EmailTaken` on an email collision, or a store error
    pub async fn confirm_email(&self, account: &Account) -> Result<Account, AccountError> {
        let next = machine::next_status(account.status, AuthEvent::EmailVerified)?;

        if let Some(email) = &account.email {
            if self.email_held_by_other(email, &account.id).await? {
                warn!("Email verification rejected for account {}: address already verified elsewhere", account.id);
                return Err(AccountError::EmailTaken);
            }
        }

        self.write_status(&account.id, next).await?;

        let mut updated = account.clone();
        updated.status = next;
        Ok(updated)
    }

    /// Record the in-game name and activate the account
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the account is not waiting on a
    /// display name, or a store error
    pub async fn set_display_name(
        &self,
        account: &Account,
        display_name: &str,
    ) -> Result<Account, AccountError> {
        let next = machine::next_status(account.status, AuthEvent::DisplayNameSubmitted)?;

        self.store
            .transact(vec![WriteOp::Update {
                collection: ACCOUNTS,
                id: account.id.clone(),
                fields: json!({
                    "display_name": display_name,
                    "status": next,
                    "last_seen_at": Utc::now(),
                }),
            }])
            .await?;

        let mut updated = account.clone();
        updated.display_name = Some(display_name.to_string());
        updated.status = next;
        Ok(updated)
    }

    /// Touch `last_seen_at` after a successful session validation
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails
    pub async fn touch_last_seen(&self, account_id: &str) -> Result<(), StoreError> {
        self.store
            .transact(vec![WriteOp::Update {
                collection: ACCOUNTS,
                id: account_id.to_string(),
                fields: json!({ "last_seen_at": Utc::now() }),
            }])
            .await
    }

    /// True if a different account already verified the given email
    async fn email_held_by_other(
        &self,
        email: &str,
        account_id: &str,
    ) -> Result<bool, StoreError> {
        let records = self
            .store
            .query(Query::collection(ACCOUNTS).where_eq("email", json!(email)))
            .await?;
        let accounts: Vec<Account> = crate::store::decode(records)?;

        Ok(accounts.iter().any(|other| {
            other.id != account_id && other.status != AccountStatus::NeedsEmail
        }))
    }

    async fn create(&self, account: &Account) -> Result<(), StoreError> {
        let fields = serde_json::to_value(account)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.store
            .transact(vec![WriteOp::Create {
                collection: ACCOUNTS,
                id: account.id.clone(),
                fields,
            }])
            .await
    }

    /// The only write path for the `status` field
    async fn write_status(&self, account_id: &str, status: AccountStatus) -> Result<(), StoreError> {
        self.store
            .transact(vec![WriteOp::Update {
                collection: ACCOUNTS,
                id: account_id.to_string(),
                fields: json!({ "status": status, "last_seen_at": Utc::now() }),
            }])
            .await
    }
}
