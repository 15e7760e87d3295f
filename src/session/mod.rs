//! Stateless browser sessions
//!
//! A session is an AES-256-GCM encrypted claims blob carried in a single
//! cookie. The server keeps no session table: possession of a cookie that
//! decrypts under the current key and has not expired is the whole proof.
//! Anything else (absent, undecryptable, expired) resolves to anonymous
//! rather than an error.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::crypto::{decrypt_data, derive_encryption_key, encrypt_data};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session encryption failed: {0}")]
    Encryption(String),
}

/// What a request's cookie resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdentity {
    Account(String),
    Anonymous,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    account_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    session_duration_hours: u64,
}

impl SessionManager {
    #[must_use]
    pub fn new(session_secret: &str, cookie_secure: bool, session_duration_hours: u64) -> Self {
        Self {
            encryption_key: derive_encryption_key(session_secret.as_bytes()),
            cookie_secure,
            session_duration_hours,
        }
    }

    /// Mint a session cookie binding the browser to an account id
    ///
    /// # Errors
    ///
    /// Returns an error if claims serialization or encryption fails
    pub fn establish(&self, account_id: &str) -> Result<Cookie<'static>, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            account_id: account_id.to_string(),
            issued_at: now,
            expires_at: now + chrono::Duration::hours(self.duration_hours_i64()),
        };

        let token = encrypt_data(&claims, &self.encryption_key)
            .map_err(|e| SessionError::Encryption(e.to_string()))?;

        Ok(self.build_cookie(token, Duration::hours(self.duration_hours_i64())))
    }

    /// Resolve the request's session cookie to an identity
    #[must_use]
    pub fn resolve(&self, req: &HttpRequest) -> SessionIdentity {
        let Some(cookie) = req.cookie(SESSION_COOKIE) else {
            return SessionIdentity::Anonymous;
        };

        let Ok(claims) = decrypt_data::<SessionClaims>(cookie.value(), &self.encryption_key)
        else {
            debug!("Session cookie failed to decrypt, treating as anonymous");
            return SessionIdentity::Anonymous;
        };

        if Utc::now() >= claims.expires_at {
            debug!("Session for account {} expired", claims.account_id);
            return SessionIdentity::Anonymous;
        }

        SessionIdentity::Account(claims.account_id)
    }

    /// Expired cookie that clears the session on the browser
    #[must_use]
    pub fn revoke(&self) -> Cookie<'static> {
        self.build_cookie(String::new(), Duration::seconds(0))
    }

    fn build_cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .finish()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn duration_hours_i64(&self) -> i64 {
        self.session_duration_hours as i64
    }
}
