use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RankgateSettings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub provider: ProviderSettings,
    pub email: EmailSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub redirect_base_url: String,
    pub cors_origins: String,
}

/// Connection settings for the external document store's admin API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    pub base_url: String,
    pub app_id: String,
    pub admin_token: Option<String>,
    pub admin_token_env: Option<String>,
    pub request_timeout_secs: u64,
}

/// OAuth identity provider settings (Discord-shaped endpoints by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub profile_endpoint: String,
    pub avatar_base_url: String,
    pub scopes: Vec<String>,
    /// Must exactly match the redirect URI registered with the provider.
    pub redirect_uri: String,
    pub request_timeout_secs: u64,

    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,
}

/// Transactional email provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    pub send_url: String,
    pub from_address: String,
    pub from_name: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_key_env: Option<String>,
    pub api_secret_env: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Cookie and credential lifetime in hours (one week by default)
    pub session_duration_hours: u64,
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.instantdb.com/admin".to_string(),
            app_id: String::new(),
            admin_token: None,
            admin_token_env: Some("STORE_ADMIN_TOKEN".to_string()),
            request_timeout_secs: 10,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "discord".to_string(),
            authorization_endpoint: "https://discord.com/oauth2/authorize".to_string(),
            token_endpoint: "https://discord.com/api/oauth2/token".to_string(),
            profile_endpoint: "https://discord.com/api/users/@me".to_string(),
            avatar_base_url: "https://cdn.discordapp.com/avatars".to_string(),
            scopes: vec!["identify".to_string(), "email".to_string()],
            redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
            request_timeout_secs: 10,
            client_id: None,
            client_secret: None,
            client_id_env: Some("DISCORD_CLIENT_ID".to_string()),
            client_secret_env: Some("DISCORD_CLIENT_SECRET".to_string()),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            send_url: "https://api.mailjet.com/v3.1/send".to_string(),
            from_address: "no-reply@localhost".to_string(),
            from_name: "Rankgate".to_string(),
            api_key: None,
            api_secret: None,
            api_key_env: Some("EMAIL_API_KEY".to_string()),
            api_secret_env: Some("EMAIL_API_SECRET".to_string()),
            request_timeout_secs: 10,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_duration_hours: 168,   // One week
            session_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RankgateSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment initialization fails
    /// - Settings file cannot be read or parsed
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::initialize_environment()?;

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Initialize environment variables and logging
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `RANKGATE_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            let toml_content = fs::read_to_string(&default_config_path)?;
            settings = basic_toml::from_str(&toml_content)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("RANKGATE_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                let secrets_toml_content = fs::read_to_string(&secrets_path)?;
                let secrets_settings: Self = basic_toml::from_str(&secrets_toml_content)?;

                println!("✓ Overriding settings from {}", secrets_path.display());
                settings = secrets_settings;
            } else {
                println!(
                    "ℹ RANKGATE_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_store_env_overrides(&mut settings.store);
        Self::apply_provider_env_overrides(&mut settings.provider);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for application settings
    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    /// Apply environment overrides for store settings
    fn apply_store_env_overrides(store_settings: &mut StoreSettings) {
        if let Ok(base_url) = std::env::var("STORE_BASE_URL") {
            store_settings.base_url = base_url;
        }
        if let Ok(app_id) = std::env::var("STORE_APP_ID") {
            store_settings.app_id = app_id;
        }
    }

    /// Apply environment overrides for OAuth provider settings
    fn apply_provider_env_overrides(provider_settings: &mut ProviderSettings) {
        if let Ok(redirect_uri) = std::env::var("OAUTH_REDIRECT_URI") {
            provider_settings.redirect_uri = redirect_uri;
        }
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        Self::apply_numeric_env_override(
            "SESSION_DURATION_HOURS",
            &mut session_settings.session_duration_hours,
        );

        // Handle session secret with special logic
        Self::handle_session_secret_override(session_settings);
    }

    /// Helper function to apply numeric environment variable overrides
    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            if let Ok(value) = value_str.parse::<u64>() {
                *target = value;
            }
        }
    }

    /// Helper function to handle session secret environment override and generation
    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        // Generate random session secret if no environment variable was set and current value is empty
        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = Self::generate_random_session_secret();
            Self::warn_about_generated_secret(&session_settings.session_secret);
        }
    }

    /// Generate a cryptographically secure random session secret
    ///
    /// Generates 32 bytes (256 bits) of entropy for AES-256 compatibility
    fn generate_random_session_secret() -> String {
        use rand::RngCore;
        let mut secret = [0u8; 32]; // 256 bits for AES-256
        rand::rng().fill_bytes(&mut secret);
        general_purpose::STANDARD.encode(secret)
    }

    /// Display warnings about using a generated session secret
    fn warn_about_generated_secret(secret: &str) {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("📝 Generated secret: {secret}");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 This secret will change on each restart unless explicitly configured");
    }

    /// Apply environment overrides for cookie settings
    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }
}

impl StoreSettings {
    /// URL of the document query endpoint
    #[must_use]
    pub fn query_url(&self) -> String {
        format!("{}/apps/{}/query", self.base_url, self.app_id)
    }

    /// URL of the batched write endpoint
    #[must_use]
    pub fn transact_url(&self) -> String {
        format!("{}/apps/{}/transact", self.base_url, self.app_id)
    }

    /// Get the admin token, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_admin_token(&self) -> Option<String> {
        if let Some(env_var) = &self.admin_token_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.admin_token.clone()
    }
}

impl ProviderSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        if let Some(env_var) = &self.client_id_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_id.clone()
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.client_secret_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.client_secret.clone()
    }
}

impl EmailSettings {
    /// Get the email API key, checking environment variable first
    #[must_use]
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.api_key.clone()
    }

    /// Get the email API secret, checking environment variable first
    #[must_use]
    pub fn get_api_secret(&self) -> Option<String> {
        if let Some(env_var) = &self.api_secret_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }
        self.api_secret.clone()
    }
}
