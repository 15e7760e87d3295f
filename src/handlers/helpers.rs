//! Shared handler plumbing

use actix_web::{web, HttpRequest, HttpResponse};
use log::error;

use crate::account::AccountService;
use crate::models::Account;
use crate::session::{SessionIdentity, SessionManager};
use crate::utils::responses::ResponseBuilder;

/// Resolve the request's session to a loaded account.
///
/// # Errors
///
/// Returns the response to send instead: 401 without a session, 404 when
/// the session points at a deleted account, 500 on a store failure.
pub async fn require_account(
    req: &HttpRequest,
    sessions: &web::Data<SessionManager>,
    accounts: &web::Data<AccountService>,
) -> Result<Account, HttpResponse> {
    let SessionIdentity::Account(account_id) = sessions.resolve(req) else {
        return Err(ResponseBuilder::unauthorized("No session"));
    };

    match accounts.find_by_id(&account_id).await {
        Ok(Some(account)) => Ok(account),
        Ok(None) => Err(ResponseBuilder::not_found("Account not found")),
        Err(e) => {
            error!("Failed to load account {account_id}: {e}");
            Err(ResponseBuilder::internal_server_error())
        }
    }
}
