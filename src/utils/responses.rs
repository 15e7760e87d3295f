//! HTTP response helpers
//!
//! One place that builds every response shape the handlers emit. Error
//! bodies are always `{"error": string}` with a message safe to show the
//! caller; internal identifiers, tokens and upstream payloads never leak
//! through here.

use actix_web::{cookie::Cookie, http::header, HttpResponse};
use serde_json::json;

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// 400 with the given error message
    #[must_use]
    pub fn bad_request(message: &str) -> HttpResponse {
        HttpResponse::BadRequest().json(json!({ "error": message }))
    }

    /// 401 for missing or invalid sessions
    #[must_use]
    pub fn unauthorized(message: &str) -> HttpResponse {
        HttpResponse::Unauthorized().json(json!({ "error": message }))
    }

    /// 404 for records that should exist but do not
    #[must_use]
    pub fn not_found(message: &str) -> HttpResponse {
        HttpResponse::NotFound().json(json!({ "error": message }))
    }

    /// 500 with a generic message; the real cause goes to the log only
    #[must_use]
    pub fn internal_server_error() -> HttpResponse {
        HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
    }

    /// 200 with a JSON body
    #[must_use]
    pub fn ok_json(body: serde_json::Value) -> HttpResponse {
        HttpResponse::Ok().json(body)
    }

    /// 302 redirect
    #[must_use]
    pub fn redirect(location: &str) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, location.to_string()))
            .finish()
    }

    /// 302 redirect carrying a cookie (session establishment or teardown)
    #[must_use]
    pub fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
        HttpResponse::Found()
            .cookie(cookie)
            .insert_header((header::LOCATION, location.to_string()))
            .finish()
    }

    /// 200 with a JSON body and a cookie
    #[must_use]
    pub fn ok_json_with_cookie(body: serde_json::Value, cookie: Cookie<'static>) -> HttpResponse {
        HttpResponse::Ok().cookie(cookie).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            ResponseBuilder::bad_request("Code required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResponseBuilder::unauthorized("No session").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ResponseBuilder::not_found("Account not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ResponseBuilder::internal_server_error().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = ResponseBuilder::redirect("/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/"
        );
    }
}
