//! Guest registration

use actix_web::{web, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::account::AccountService;
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRequest {
    display_name: Option<String>,
}

/// Create a guest account from a display name and hand back a session
pub async fn guest_register(
    body: web::Json<GuestRequest>,
    accounts: web::Data<AccountService>,
    sessions: web::Data<SessionManager>,
) -> HttpResponse {
    let display_name = body
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let Some(display_name) = display_name else {
        return ResponseBuilder::bad_request("Display name required");
    };

    let account = match accounts.register_guest(display_name).await {
        Ok(account) => account,
        Err(e) => {
            error!("Guest registration failed: {e}");
            return ResponseBuilder::internal_server_error();
        }
    };

    match sessions.establish(&account.id) {
        Ok(cookie) => ResponseBuilder::ok_json_with_cookie(
            json!({ "id": account.id, "status": account.status }),
            cookie,
        ),
        Err(e) => {
            error!("Failed to establish session: {e}");
            ResponseBuilder::internal_server_error()
        }
    }
}
