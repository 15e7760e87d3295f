use actix_web::HttpResponse;
use serde_json::json;

use crate::utils::responses::ResponseBuilder;

/// Liveness probe
pub async fn ping() -> HttpResponse {
    ResponseBuilder::ok_json(json!({ "status": "ok", "version": crate::VERSION }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_reports_ok() {
        let response = ping().await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
    }
}
