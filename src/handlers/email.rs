//! Email verification: issue a code, then consume it

use actix_web::{web, HttpRequest, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::account::{AccountError, AccountService};
use crate::handlers::helpers::require_account;
use crate::mail::Mailer;
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;
use crate::verification::{VerificationService, VerifyError};

#[derive(Deserialize)]
pub struct SendRequest {
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    code: String,
}

/// Issue a fresh code and email it to the target address. The target is
/// the address in the body when present, otherwise the one already on the
/// account.
pub async fn send_code(
    req: HttpRequest,
    body: web::Json<SendRequest>,
    sessions: web::Data<SessionManager>,
    accounts: web::Data<AccountService>,
    verification: web::Data<VerificationService>,
    mailer: web::Data<dyn Mailer>,
) -> HttpResponse {
    let account = match require_account(&req, &sessions, &accounts).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    let target = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(ToString::to_string)
        .or_else(|| account.email.clone());
    let Some(target) = target else {
        return ResponseBuilder::bad_request("Email required");
    };

    let code = match verification.issue(&account.id, &target).await {
        Ok(code) => code,
        Err(e) => {
            error!("Failed to issue verification code: {e}");
            return ResponseBuilder::internal_server_error();
        }
    };

    let to_name = account.display_name.as_deref().unwrap_or("Player");
    if let Err(e) = mailer.send_verification_code(&target, to_name, &code).await {
        error!("Failed to deliver verification email: {e}");
        return ResponseBuilder::internal_server_error();
    }

    ResponseBuilder::ok_json(json!({ "ok": true }))
}

/// Consume a submitted code and advance the account out of `needs_email`
pub async fn verify_code(
    req: HttpRequest,
    body: web::Json<VerifyRequest>,
    sessions: web::Data<SessionManager>,
    accounts: web::Data<AccountService>,
    verification: web::Data<VerificationService>,
) -> HttpResponse {
    let mut account = match require_account(&req, &sessions, &accounts).await {
        Ok(account) => account,
        Err(response) => return response,
    };

    if let Err(e) = verification.verify(&account.id, body.code.trim()).await {
        return match e {
            VerifyError::NotFound => ResponseBuilder::bad_request("No code found"),
            VerifyError::Expired => ResponseBuilder::bad_request("Code expired"),
            VerifyError::Mismatch => ResponseBuilder::bad_request("Invalid code"),
            VerifyError::Store(e) => {
                error!("Verification lookup failed: {e}");
                ResponseBuilder::internal_server_error()
            }
        };
    }

    // The code batch recorded the candidate email; reload so the uniqueness
    // check sees it
    account = match accounts.find_by_id(&account.id).await {
        Ok(Some(account)) => account,
        Ok(None) => return ResponseBuilder::not_found("Account not found"),
        Err(e) => {
            error!("Failed to reload account: {e}");
            return ResponseBuilder::internal_server_error();
        }
    };

    match accounts.confirm_email(&account).await {
        Ok(updated) => ResponseBuilder::ok_json(json!({ "ok": true, "status": updated.status })),
        Err(AccountError::EmailTaken) => {
            ResponseBuilder::bad_request("Email already in use")
        }
        Err(AccountError::InvalidTransition) => {
            ResponseBuilder::bad_request("Account is not awaiting email verification")
        }
        Err(e) => {
            error!("Failed to advance account: {e}");
            ResponseBuilder::internal_server_error()
        }
    }
}
