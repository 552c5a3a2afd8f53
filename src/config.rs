//! Application configuration management with security considerations.
//!
//! All values are read from environment variables once at startup and are
//! read-only afterwards. The resulting [`AppConfig`] is passed explicitly to
//! every component that needs it.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and must never be logged
//! - An empty `FACEBOOK_APP_SECRET` disables webhook signature enforcement

use crate::consts;
use envconfig::Envconfig;

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(from = "ENV", default = "local")]
    pub env: String,

    /// Token echoed back by Meta during the webhook subscription handshake (SEMI-SENSITIVE)
    #[envconfig(from = "WEBHOOK_VERIFY_TOKEN", default = "my_verify_token")]
    pub verify_token: String,

    /// SENSITIVE: App secret used to sign webhook payloads (X-Hub-Signature-256)
    /// Empty value disables signature enforcement.
    #[envconfig(from = "FACEBOOK_APP_SECRET", default = "")]
    pub app_secret: String,

    /// SENSITIVE: WhatsApp Business access token for the Graph API
    #[envconfig(from = "WHATSAPP_ACCESS_TOKEN", default = "")]
    pub access_token: String,

    /// WhatsApp Business phone number ID (SEMI-SENSITIVE)
    #[envconfig(from = "WHATSAPP_PHONE_NUMBER_ID", default = "")]
    pub phone_number_id: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,

    /// Graph API base url (NON-SENSITIVE)
    #[envconfig(from = "WHATSAPP_GRAPH_API_HOST", default = "https://graph.facebook.com")]
    pub graph_api_host: String,

    /// Graph API version segment (NON-SENSITIVE)
    #[envconfig(from = "WHATSAPP_GRAPH_API_VERSION", default = "v18.0")]
    pub graph_api_version: String,

    /// Upper bound in seconds for a single outbound Graph API request
    #[envconfig(from = "WHATSAPP_HTTP_TIMEOUT_SECS", default = "10")]
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::init_from_env()?.with_defaults())
    }

    /// Replaces values that were provided but left empty by their documented defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.verify_token.trim().is_empty() {
            self.verify_token = consts::DEFAULT_VERIFY_TOKEN.to_string();
        }
        self
    }

    /// Whether inbound webhook payloads must carry a valid signature
    pub fn is_signature_enforced(&self) -> bool {
        !self.app_secret.is_empty()
    }

    /// Whether the credentials needed to call the Graph API are present
    pub fn has_outbound_credentials(&self) -> bool {
        !self.access_token.is_empty() && !self.phone_number_id.is_empty()
    }

    /// Constructs the WhatsApp Business API endpoint for sending messages
    pub fn whatsapp_send_msg_endpoint(&self) -> String {
        format!(
            "{host}/{version}/{id}/messages",
            host = self.graph_api_host.trim_end_matches('/'),
            version = self.graph_api_version,
            id = self.phone_number_id
        )
    }

    /// Timeout applied to every outbound request
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
pub(crate) fn test_config(vars: &[(&str, &str)]) -> AppConfig {
    let env = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<std::collections::HashMap<_, _>>();

    AppConfig::init_from_hashmap(&env)
        .expect("test config should be valid")
        .with_defaults()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = test_config(&[]);

        assert_eq!(config.verify_token, "my_verify_token");
        assert_eq!(config.port, 8080);
        assert!(!config.is_signature_enforced());
        assert!(!config.has_outbound_credentials());
        assert_eq!(config.env, "local");
    }

    #[test]
    fn test_empty_verify_token_falls_back_to_default() {
        let config = test_config(&[("WEBHOOK_VERIFY_TOKEN", "")]);

        assert_eq!(config.verify_token, consts::DEFAULT_VERIFY_TOKEN);
    }

    #[test]
    fn test_send_msg_endpoint() {
        let config = test_config(&[
            ("WHATSAPP_PHONE_NUMBER_ID", "106540352242922"),
            ("WHATSAPP_GRAPH_API_HOST", "http://localhost:9000/"),
            ("WHATSAPP_GRAPH_API_VERSION", "v21.0"),
        ]);

        assert_eq!(
            config.whatsapp_send_msg_endpoint(),
            "http://localhost:9000/v21.0/106540352242922/messages"
        );
    }

    #[test]
    fn test_signature_enforced_with_secret() {
        let config = test_config(&[("FACEBOOK_APP_SECRET", "s3cr3t"), ("ENV", "PROD")]);

        assert!(config.is_signature_enforced());
        assert_eq!(config.env, "PROD");
    }
}
