//! Display name submission

use actix_web::{web, HttpRequest, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::account::{AccountError, AccountService};
use crate::handlers::helpers::require_account;
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNameRequest {
    display_name: Option<String>,
}

/// Record the player's in-game name and activate the account
pub async fn set_display_name(
    req: HttpRequest,
    body: web::Json<DisplayNameRequest>,
    sessions: web::Data<SessionManager>,
    accounts: web::Data<AccountService>,
) -> HttpResponse {
    let account = match require_account(&req, &sessions, &accounts).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    let display_name = body
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let Some(display_name) = display_name else {
        return ResponseBuilder::bad_request("Display name required");
    };

    match accounts.set_display_name(&account, display_name).await {
        Ok(updated) => ResponseBuilder::ok_json(json!({ "ok": true, "status": updated.status })),
        Err(AccountError::InvalidTransition) => {
            ResponseBuilder::bad_request("Account is not awaiting a display name")
        }
        Err(e) => {
            error!("Failed to set display name: {e}");
            ResponseBuilder::internal_server_error()
        }
    }
}
