// HTTP request handlers for the onboarding API
pub mod email;
pub mod guest;
pub mod health;
pub mod helpers;
pub mod oauth;
pub mod profile;
pub mod session;

use actix_web::web;

use crate::utils::responses::ResponseBuilder;

// Re-export the main handler functions
pub use email::{send_code, verify_code};
pub use guest::guest_register;
pub use health::ping;
pub use oauth::{oauth_callback, oauth_login};
pub use profile::set_display_name;
pub use session::{logout, me};

/// Wire up every route. Resources answer 405 for methods they do not
/// accept, which the clients rely on.
///
/// JSON extraction failures are rewritten here so malformed bodies get
/// the same `{"error": string}` shape as every other error response.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        actix_web::error::InternalError::from_response(
            err,
            ResponseBuilder::bad_request("Invalid request body"),
        )
        .into()
    }))
    .service(web::resource("/ping").route(web::get().to(ping)))
        .service(web::resource("/oauth/login").route(web::get().to(oauth_login)))
        .service(web::resource("/oauth/callback").route(web::get().to(oauth_callback)))
        .service(web::resource("/auth/guest").route(web::post().to(guest_register)))
        .service(web::resource("/auth/email/send").route(web::post().to(send_code)))
        .service(web::resource("/auth/email/verify").route(web::post().to(verify_code)))
        .service(web::resource("/profile/display-name").route(web::post().to(set_display_name)))
        .service(web::resource("/session/me").route(web::get().to(me)))
        .service(web::resource("/session/logout").route(web::post().to(logout)));
}
