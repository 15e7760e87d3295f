//! Current-session introspection and logout

use actix_web::{web, HttpRequest, HttpResponse};
use log::warn;
use serde_json::json;

use crate::account::AccountService;
use crate::handlers::helpers::require_account;
use crate::progression;
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;

/// Who the session belongs to, with onboarding status and progression
pub async fn me(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
    accounts: web::Data<AccountService>,
) -> HttpResponse {
    let account = match require_account(&req, &sessions, &accounts).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    // Best-effort presence tracking; the response does not depend on it
    if let Err(e) = accounts.touch_last_seen(&account.id).await {
        warn!("Failed to update last seen for {}: {e}", account.id);
    }

    let progression = progression::tier_of(account.matches_played);
    let gates = progression::gates_for(progression.tier);

    ResponseBuilder::ok_json(json!({
        "id": account.id,
        "status": account.status,
        "email": account.email,
        "displayName": account.display_name,
        "providerUsername": account.provider_username,
        "avatar": account.avatar_url,
        "stats": {
            "matchesPlayed": account.matches_played,
            "wins": account.wins,
            "losses": account.losses,
            "rating": account.rating,
        },
        "progression": progression,
        "features": gates,
    }))
}

/// Drop the session cookie and send the browser home. Always succeeds,
/// session or not.
pub async fn logout(sessions: web::Data<SessionManager>) -> HttpResponse {
    ResponseBuilder::redirect_with_cookie("/", sessions.revoke())
}
