//! # WhatsApp API Client
//!
//! This module provides a client for sending messages to WhatsApp Business API.
//! It handles authentication and message sending for text and template messages.
//!
//! No retry is attempted here: every error is returned to the caller as is.

use super::{
    schemas::{OutgoingMessage, TemplateComponent, WhatsAppMessageResponse},
    transport::{HttpTransport, ImplHttpTransport, ReqwestTransport},
};
use crate::{config::AppConfig, consts, metric};
use derive_more::{Display, Error};

/// Failure of an outbound send
#[derive(Debug, Display, Error)]
pub enum ClientError {
    /// Credentials are missing; no request was made
    #[display("WHATSAPP_ACCESS_TOKEN and WHATSAPP_PHONE_NUMBER_ID must be set")]
    Config,
    /// The request body could not be serialized
    #[display("failed to marshal request: {_0}")]
    Encode(serde_json::Error),
    /// The request did not complete (connection, timeout, ...)
    #[display("failed to send request: {_0}")]
    Transport(#[error(not(source))] anyhow::Error),
    /// WhatsApp answered with a non success status; `body` is kept verbatim
    #[display("WhatsApp API returned error status {status}: {body}")]
    Api { status: u16, body: String },
    /// WhatsApp answered with success but the body is not a send response
    #[display("failed to parse WhatsApp API response: {_0}")]
    Decode(serde_json::Error),
}

impl ClientError {
    fn metric_label(&self) -> &'static str {
        match self {
            ClientError::Config => "config_error",
            ClientError::Encode(_) => "encode_error",
            ClientError::Transport(_) => "transport_error",
            ClientError::Api { .. } => "api_error",
            ClientError::Decode(_) => "decode_error",
        }
    }
}

/// WhatsApp API client for sending messages
pub struct WhatsAppClient {
    /// HTTP transport for making API requests
    transport: ImplHttpTransport,
    /// WhatsApp Business API endpoint for sending messages
    endpoint: String,
    /// Authentication token
    auth_token: String,
    /// Whether token and phone number id are both configured
    configured: bool,
}

impl WhatsAppClient {
    /// Creates a new WhatsApp client backed by `reqwest`
    pub fn new(app_config: &AppConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(app_config.http_timeout())?;

        Ok(Self::with_transport(app_config, Box::new(transport)))
    }

    /// Creates a client sending through the given transport
    pub fn with_transport(app_config: &AppConfig, transport: ImplHttpTransport) -> Self {
        Self {
            transport,
            endpoint: app_config.whatsapp_send_msg_endpoint(),
            auth_token: app_config.access_token.clone(),
            configured: app_config.has_outbound_credentials(),
        }
    }

    /// Sends a text message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID (phone number with country code)
    /// * `body` - Message text
    pub async fn send_text_message(
        &self,
        to: &str,
        body: &str,
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        self.send_message(&OutgoingMessage::text(to, body)).await
    }

    /// Sends a template message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID
    /// * `template_name` - Name of an approved template
    /// * `language_code` - Template language, e.g. "en_US"
    /// * `components` - Parameters per template section, sent as given
    pub async fn send_template_message(
        &self,
        to: &str,
        template_name: &str,
        language_code: &str,
        components: Vec<TemplateComponent>,
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        let message = OutgoingMessage::template(to, template_name, language_code, components);
        self.send_message(&message).await
    }

    /// Sends a template whose only parameters are body texts
    pub async fn send_template_with_body_params<S: AsRef<str>>(
        &self,
        to: &str,
        template_name: &str,
        language_code: &str,
        params: &[S],
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        let components = vec![TemplateComponent::body_texts(params)];

        self.send_template_message(to, template_name, language_code, components)
            .await
    }

    /// Sends the `hello_world` sample template every WhatsApp Business account has
    pub async fn send_hello_world_template(
        &self,
        to: &str,
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        self.send_template_message(
            to,
            consts::HELLO_WORLD_TEMPLATE,
            consts::HELLO_WORLD_LANGUAGE,
            vec![],
        )
        .await
    }

    /// Internal method to send any message type to WhatsApp API
    async fn send_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        logfire::info!(
            "Sending {msg_type} message to {to}",
            msg_type = message.type_tag().to_string(),
            to = message.to.clone()
        );

        let result = self.try_send_message(message).await;

        match &result {
            Ok(response) => {
                metric::incr_outbound_statds("sent");
                if let Some(id) = response.first_message_id() {
                    logfire::info!(
                        "Message sent successfully, ID: {id}",
                        id = id.to_string()
                    );
                }
            }
            Err(e) => metric::incr_outbound_statds(e.metric_label()),
        }

        result
    }

    async fn try_send_message(
        &self,
        message: &OutgoingMessage,
    ) -> Result<WhatsAppMessageResponse, ClientError> {
        if !self.configured {
            return Err(ClientError::Config);
        }

        let body = serde_json::to_vec(message).map_err(ClientError::Encode)?;

        let response = self
            .transport
            .post_json(&self.endpoint, &self.auth_token, body)
            .await
            .map_err(ClientError::Transport)?;

        if !response.is_success() {
            return Err(ClientError::Api {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(ClientError::Decode)
    }
}
