//! One-time email verification codes
//!
//! Codes are six decimal digits, stored only as a SHA-256 hex digest, and
//! expire ten minutes after issuance. Issuing a new code supersedes any
//! older one for the account: verification always checks the newest code
//! only.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::info;
use rand::Rng;
use serde_json::json;
use thiserror::Error;

use crate::models::{VerificationCode, ACCOUNTS, VERIFICATION_CODES};
use crate::store::{decode_first, IdentityStore, Query, StoreError, WriteOp};
use crate::utils::crypto::sha256_hex;

/// Codes are valid for ten minutes from issuance
const CODE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no code found")]
    NotFound,
    #[error("code expired")]
    Expired,
    #[error("invalid code")]
    Mismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn IdentityStore>,
}

impl VerificationService {
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Generate and persist a fresh code for the account, recording the
    /// candidate email on the account record in the same batch. Returns the
    /// plaintext code for delivery; only its hash is stored.
    ///
    /// # Errors
    ///
    /// Returns a store error if the batch write fails
    pub async fn issue(
        &self,
        account_id: &str,
        target_email: &str,
    ) -> Result<String, StoreError> {
        let code = generate_code();
        let now = Utc::now();
        let record = VerificationCode {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            code_hash: sha256_hex(&code),
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
            created_at: now,
        };

        let fields = serde_json::to_value(&record)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        self.store
            .transact(vec![
                WriteOp::Create {
                    collection: VERIFICATION_CODES,
                    id: record.id.clone(),
                    fields,
                },
                WriteOp::Update {
                    collection: ACCOUNTS,
                    id: account_id.to_string(),
                    fields: json!({ "email": target_email }),
                },
            ])
            .await?;

        info!("Issued verification code for account {account_id}");
        Ok(code)
    }

    /// Check a submitted code against the newest code on record for the
    /// account, consuming it on success.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no code exists, `Expired` when the newest
    /// code's deadline has passed, `Mismatch` when the digits differ, or a
    /// store error
    pub async fn verify(&self, account_id: &str, submitted: &str) -> Result<(), VerifyError> {
        let records = self
            .store
            .query(
                Query::collection(VERIFICATION_CODES)
                    .where_eq("account_id", json!(account_id))
                    .newest_first()
                    .limit(1),
            )
            .await?;

        let Some(code) = decode_first::<VerificationCode>(records)? else {
            return Err(VerifyError::NotFound);
        };

        if Utc::now() >= code.expires_at {
            return Err(VerifyError::Expired);
        }

        if sha256_hex(submitted) != code.code_hash {
            return Err(VerifyError::Mismatch);
        }

        // One-time use: the consumed code is removed so a replay sees NotFound
        self.store
            .transact(vec![WriteOp::Delete {
                collection: VERIFICATION_CODES,
                id: code.id,
            }])
            .await?;

        info!("Verification code consumed for account {account_id}");
        Ok(())
    }
}

/// Uniform six-digit code, never with a leading zero
fn generate_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn service() -> (VerificationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (VerificationService::new(store.clone()), store)
    }

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let (service, store) = service();
        let code = service.issue("acct-1", "steve@example.com").await.unwrap();

        service.verify("acct-1", &code).await.unwrap();
        // Consumed
        assert_eq!(store.count(VERIFICATION_CODES), 0);
    }

    #[tokio::test]
    async fn test_verify_without_code_is_not_found() {
        let (service, _) = service();
        let result = service.verify("acct-1", "123456").await;
        assert!(matches!(result, Err(VerifyError::NotFound)));
    }

    #[tokio::test]
    async fn test_wrong_code_is_mismatch_and_not_consumed() {
        let (service, store) = service();
        let code = service.issue("acct-1", "steve@example.com").await.unwrap();

        let wrong = if code == "123456" { "654321" } else { "123456" };
        let result = service.verify("acct-1", wrong).await;
        assert!(matches!(result, Err(VerifyError::Mismatch)));

        // The code survives a failed attempt
        assert_eq!(store.count(VERIFICATION_CODES), 1);
        service.verify("acct-1", &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_verified_code_cannot_be_replayed() {
        let (service, _) = service();
        let code = service.issue("acct-1", "steve@example.com").await.unwrap();

        service.verify("acct-1", &code).await.unwrap();
        let result = service.verify("acct-1", &code).await;
        assert!(matches!(result, Err(VerifyError::NotFound)));
    }

    #[tokio::test]
    async fn test_newest_code_wins() {
        let (service, _) = service();
        let old = service.issue("acct-1", "steve@example.com").await.unwrap();
        let new = service.issue("acct-1", "steve@example.com").await.unwrap();

        if old != new {
            let result = service.verify("acct-1", &old).await;
            assert!(matches!(result, Err(VerifyError::Mismatch)));
        }
        service.verify("acct-1", &new).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let (service, store) = service();
        let code = service.issue("acct-1", "steve@example.com").await.unwrap();

        // Pull the code record forward past its deadline
        let records = store
            .query(
                Query::collection(VERIFICATION_CODES)
                    .where_eq("account_id", json!("acct-1"))
                    .limit(1),
            )
            .await
            .unwrap();
        let record: VerificationCode = decode_first(records).unwrap().unwrap();
        store
            .transact(vec![WriteOp::Update {
                collection: VERIFICATION_CODES,
                id: record.id,
                fields: json!({ "expires_at": Utc::now() - Duration::seconds(1) }),
            }])
            .await
            .unwrap();

        let result = service.verify("acct-1", &code).await;
        assert!(matches!(result, Err(VerifyError::Expired)));
    }
}
