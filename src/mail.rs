//! Verification email delivery
//!
//! Delivery goes through a [`Mailer`] trait so handlers stay decoupled
//! from the transactional email provider; [`HttpMailer`] speaks the
//! provider's JSON send API over basic auth.

use std::time::Duration;

use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::settings::EmailSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider is not configured: {0}")]
    Configuration(String),
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a verification code to the given address
    async fn send_verification_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), MailError>;
}

pub struct HttpMailer {
    client: Client,
    send_url: String,
    from_address: String,
    from_name: String,
    api_key: String,
    api_secret: String,
}

impl HttpMailer {
    /// Build the mailer from email settings, resolving credentials from
    /// their configured environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the API key or secret is missing, or
    /// when the HTTP client cannot be constructed
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, MailError> {
        let api_key = settings
            .get_api_key()
            .ok_or_else(|| MailError::Configuration("missing API key".to_string()))?;
        let api_secret = settings
            .get_api_secret()
            .ok_or_else(|| MailError::Configuration("missing API secret".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| MailError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            send_url: settings.send_url.clone(),
            from_address: settings.from_address.clone(),
            from_name: settings.from_name.clone(),
            api_key,
            api_secret,
        })
    }

    fn message_body(&self, to_email: &str, to_name: &str, code: &str) -> serde_json::Value {
        json!({
            "Messages": [{
                "From": { "Email": self.from_address, "Name": self.from_name },
                "To": [{ "Email": to_email, "Name": to_name }],
                "Subject": "Your Verification Code",
                "TextPart": format!("Your verification code is {code}. It expires in 10 minutes."),
                "HTMLPart": format!(
                    "<p>Your verification code is <strong>{code}</strong>.</p>\
                     <p>It expires in 10 minutes.</p>"
                ),
            }]
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_verification_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.send_url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&self.message_body(to_email, to_name, code))
            .send()
            .await
            .map_err(|e| MailError::Delivery(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MailError::Delivery(format!(
                "provider returned {}",
                response.status()
            )));
        }

        info!("Verification email dispatched to {to_email}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> HttpMailer {
        let settings = EmailSettings {
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            api_key_env: None,
            api_secret_env: None,
            from_address: "noreply@game.example.com".to_string(),
            from_name: "Rankgate".to_string(),
            ..EmailSettings::default()
        };
        HttpMailer::from_settings(&settings).unwrap()
    }

    #[test]
    fn test_from_settings_requires_credentials() {
        let settings = EmailSettings {
            api_key: None,
            api_secret: None,
            api_key_env: None,
            api_secret_env: None,
            ..EmailSettings::default()
        };

        let result = HttpMailer::from_settings(&settings);
        assert!(matches!(result, Err(MailError::Configuration(_))));
    }

    #[test]
    fn test_message_body_shape() {
        let body = mailer().message_body("steve@example.com", "Steve", "123456");
        let message = &body["Messages"][0];

        assert_eq!(message["From"]["Email"], "noreply@game.example.com");
        assert_eq!(message["To"][0]["Email"], "steve@example.com");
        assert_eq!(message["Subject"], "Your Verification Code");

        let text = message["TextPart"].as_str().unwrap();
        assert!(text.contains("123456"));
        let html = message["HTMLPart"].as_str().unwrap();
        assert!(html.contains("<strong>123456</strong>"));
    }
}
