#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use rankgate::{
    account::AccountService,
    handlers::configure_routes,
    mail::{HttpMailer, Mailer},
    oauth::{IdentityProvider, OAuthLinker},
    session::SessionManager,
    settings::RankgateSettings,
    store::{HttpStore, IdentityStore},
    verification::VerificationService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = RankgateSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let store: Arc<dyn IdentityStore> = Arc::new(
        HttpStore::from_settings(&settings.store)
            .map_err(|e| std::io::Error::other(format!("Failed to configure store: {e}")))?,
    );

    // A deployment without provider or mail credentials dies here, not on
    // the first login
    let linker: Arc<dyn IdentityProvider> = Arc::new(
        OAuthLinker::from_settings(&settings.provider)
            .map_err(|e| std::io::Error::other(format!("Failed to configure OAuth: {e}")))?,
    );
    let mailer: Arc<dyn Mailer> = Arc::new(
        HttpMailer::from_settings(&settings.email)
            .map_err(|e| std::io::Error::other(format!("Failed to configure mail: {e}")))?,
    );

    println!("✓ Using stateless sessions with encrypted cookies");
    start_server(store, linker, mailer, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    store: Arc<dyn IdentityStore>,
    linker: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
    settings: RankgateSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let accounts = AccountService::new(store.clone());
    let verification = VerificationService::new(store);
    let sessions = SessionManager::new(
        &settings.session.session_secret,
        settings.cookies.secure,
        settings.session.session_duration_hours,
    );

    // Configure CORS for the game client
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(accounts.clone()))
            .app_data(web::Data::new(verification.clone()))
            .app_data(web::Data::from(linker.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::from(mailer.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &RankgateSettings) {
    println!("Starting Rankgate identity service on http://{bind_address}");
    println!();
    println!("Auth endpoints:");
    println!("  GET  /oauth/login         - Redirect to provider consent");
    println!("  GET  /oauth/callback      - Provider redirect target");
    println!("  POST /auth/guest          - Guest registration");
    println!("  POST /auth/email/send     - Issue a verification code");
    println!("  POST /auth/email/verify   - Consume a verification code");
    println!();
    println!("Profile endpoints:");
    println!("  POST /profile/display-name - Set in-game name");
    println!("  GET  /session/me           - Current account");
    println!("  POST /session/logout       - Clear session");
    println!();
    println!("OAuth callback URL for the identity provider:");
    println!("  {}/oauth/callback", settings.application.redirect_base_url);
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
}
