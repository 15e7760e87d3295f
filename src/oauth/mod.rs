//! OAuth login against an external identity provider
//!
//! Implements the authorization-code flow: build the provider's consent
//! URL, exchange the returned code for an access token over a form POST,
//! and fetch the provider profile with that token. The provider profile is
//! reduced to the [`ExternalProfile`] the account layer cares about.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::settings::ProviderSettings;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth provider is not configured: {0}")]
    Configuration(String),
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),
}

/// What the account layer needs to know about a provider profile
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    pub external_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

/// Seam between the handlers and the concrete OAuth provider client, so
/// tests can substitute the provider the way they substitute the mailer
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name recorded on external identities
    fn provider(&self) -> &str;

    /// Authorization URL the browser is redirected to for consent
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the provider endpoint is not a valid URL
    fn begin_login(&self) -> Result<String, OAuthError>;

    /// Exchange an authorization code for the provider profile
    async fn complete_login(&self, code: &str) -> Result<ExternalProfile, OAuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
}

#[derive(Deserialize)]
struct ProviderProfile {
    id: String,
    username: String,
    avatar: Option<String>,
    email: Option<String>,
}

#[derive(Clone)]
pub struct OAuthLinker {
    client: Client,
    provider: String,
    authorization_endpoint: String,
    token_endpoint: String,
    profile_endpoint: String,
    avatar_base_url: String,
    scopes: String,
    redirect_uri: String,
    client_id: String,
    client_secret: String,
}

impl OAuthLinker {
    /// Build the linker from provider settings, resolving credentials from
    /// their configured environment variables. Fails fast so a misconfigured
    /// deployment dies at startup rather than on the first login.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the client id or secret is missing,
    /// or when the HTTP client cannot be constructed
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, OAuthError> {
        let client_id = settings
            .get_client_id()
            .ok_or_else(|| OAuthError::Configuration("missing client id".to_string()))?;
        let client_secret = settings
            .get_client_secret()
            .ok_or_else(|| OAuthError::Configuration("missing client secret".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| OAuthError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider: settings.name.clone(),
            authorization_endpoint: settings.authorization_endpoint.clone(),
            token_endpoint: settings.token_endpoint.clone(),
            profile_endpoint: settings.profile_endpoint.clone(),
            avatar_base_url: settings.avatar_base_url.clone(),
            scopes: settings.scopes.join(" "),
            redirect_uri: settings.redirect_uri.clone(),
            client_id,
            client_secret,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            warn!(
                "{} token exchange rejected with status {}",
                self.provider,
                response.status()
            );
            return Err(OAuthError::TokenExchange(format!(
                "provider returned {}",
                response.status()
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("malformed token response: {e}")))
    }

    async fn fetch_profile(&self, token: &TokenResponse) -> Result<ProviderProfile, OAuthError> {
        let response = self
            .client
            .get(&self.profile_endpoint)
            .header(
                "Authorization",
                format!("{} {}", token.token_type, token.access_token),
            )
            .send()
            .await
            .map_err(|e| OAuthError::ProfileFetch(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(OAuthError::ProfileFetch(format!(
                "provider returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderProfile>()
            .await
            .map_err(|e| OAuthError::ProfileFetch(format!("malformed profile response: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for OAuthLinker {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn begin_login(&self) -> Result<String, OAuthError> {
        let mut url = Url::parse(&self.authorization_endpoint)
            .map_err(|e| OAuthError::Configuration(format!("bad authorization endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes);
        Ok(url.into())
    }

    async fn complete_login(&self, code: &str) -> Result<ExternalProfile, OAuthError> {
        let token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&token).await?;

        let avatar_url = profile.avatar.as_ref().map(|hash| {
            format!("{}/{}/{hash}.png", self.avatar_base_url, profile.id)
        });

        debug!("Fetched {} profile for external id {}", self.provider, profile.id);
        Ok(ExternalProfile {
            external_id: profile.id,
            username: profile.username,
            avatar_url,
            email: profile.email,
        })
    }
}
