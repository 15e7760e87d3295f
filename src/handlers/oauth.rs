//! OAuth sign-in entry point and provider callback

use actix_web::{web, HttpResponse};
use log::{error, info};
use serde::Deserialize;

use crate::account::AccountService;
use crate::oauth::{IdentityProvider, OAuthError};
use crate::session::{SessionError, SessionManager};
use crate::utils::responses::ResponseBuilder;

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// Redirect the browser to the provider's consent page
pub async fn oauth_login(linker: web::Data<dyn IdentityProvider>) -> HttpResponse {
    match linker.begin_login() {
        Ok(url) => ResponseBuilder::redirect(&url),
        Err(e) => {
            error!("Cannot build authorization URL: {e}");
            ResponseBuilder::internal_server_error()
        }
    }
}

/// Land the provider redirect: exchange the code, resolve the account,
/// establish a session, and send the browser home.
pub async fn oauth_callback(
    query: web::Query<CallbackQuery>,
    linker: web::Data<dyn IdentityProvider>,
    accounts: web::Data<AccountService>,
    sessions: web::Data<SessionManager>,
) -> HttpResponse {
    let Some(code) = query.code.as_deref() else {
        return ResponseBuilder::bad_request("Missing code");
    };

    let profile = match linker.complete_login(code).await {
        Ok(profile) => profile,
        Err(e @ (OAuthError::TokenExchange(_) | OAuthError::ProfileFetch(_))) => {
            info!("OAuth callback rejected: {e}");
            return ResponseBuilder::bad_request("OAuth login failed");
        }
        Err(e) => {
            error!("OAuth callback failed: {e}");
            return ResponseBuilder::internal_server_error();
        }
    };

    let account = match accounts.resolve_external(linker.provider(), &profile).await {
        Ok(account) => account,
        Err(e) => {
            error!("Failed to resolve external identity: {e}");
            return ResponseBuilder::internal_server_error();
        }
    };

    match sessions.establish(&account.id) {
        Ok(cookie) => ResponseBuilder::redirect_with_cookie("/", cookie),
        Err(SessionError::Encryption(e)) => {
            error!("Failed to establish session: {e}");
            ResponseBuilder::internal_server_error()
        }
    }
}
