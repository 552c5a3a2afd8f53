//! # WhatsApp Outgoing Message Schemas
//!
//! Data structures for sending messages to WhatsApp Business API and for
//! decoding its acknowledgement.

use crate::consts;
use serde::{Deserialize, Serialize};

/// Message to send to WhatsApp
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Recipient kind, "individual" for text messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_type: Option<String>,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Type tag plus the matching content object
    #[serde(flatten)]
    pub content: OutgoingContent,
}

impl OutgoingMessage {
    /// Creates a new text message
    pub fn text(to: &str, body: &str) -> Self {
        Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            recipient_type: Some(consts::RECIPIENT_TYPE_INDIVIDUAL.to_string()),
            to: to.to_string(),
            content: OutgoingContent::Text {
                text: OutgoingTextContent {
                    body: body.to_string(),
                },
            },
        }
    }

    /// Creates a new template message
    pub fn template(
        to: &str,
        name: &str,
        language_code: &str,
        components: Vec<TemplateComponent>,
    ) -> Self {
        Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            recipient_type: None,
            to: to.to_string(),
            content: OutgoingContent::Template {
                template: Template {
                    name: name.to_string(),
                    language: TemplateLanguage {
                        code: language_code.to_string(),
                    },
                    components,
                },
            },
        }
    }

    /// The `type` tag this message is sent with
    pub fn type_tag(&self) -> &'static str {
        match self.content {
            OutgoingContent::Text { .. } => "text",
            OutgoingContent::Template { .. } => "template",
        }
    }
}

/// Exactly one content object, tagged by `type`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingContent {
    Text { text: OutgoingTextContent },
    Template { template: Template },
}

/// Text content for outgoing messages
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingTextContent {
    /// Message body text
    pub body: String,
}

/// Reference to a template registered in WhatsApp Manager
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

/// Template section the parameters are substituted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Header,
    Body,
    Button,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Button kind ("quick_reply", "url"), only for button components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Button position, only for button components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TemplateParameter>,
}

impl TemplateComponent {
    /// A `body` component whose parameters are plain texts, in order.
    /// Nothing is checked against the registered template.
    pub fn body_texts<S: AsRef<str>>(params: &[S]) -> Self {
        Self {
            component_type: ComponentType::Body,
            sub_type: None,
            index: None,
            parameters: params
                .iter()
                .map(|p| TemplateParameter::Text {
                    text: p.as_ref().to_string(),
                })
                .collect(),
        }
    }
}

/// A single value substituted into a template placeholder
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateParameter {
    Text { text: String },
    Currency { currency: CurrencyValue },
    DateTime { date_time: DateTimeValue },
    Image { image: MediaValue },
    Document { document: MediaValue },
    Video { video: MediaValue },
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyValue {
    pub fallback_value: String,
    /// ISO 4217 code
    pub code: String,
    /// Amount multiplied by 1000
    pub amount_1000: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateTimeValue {
    pub fallback_value: String,
}

/// Media referenced either by uploaded media id or by public link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaValue {
    Id(String),
    Link(String),
}

/// Response from WhatsApp API when sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppMessageResponse {
    /// Messaging product
    #[serde(default)]
    pub messaging_product: String,
    /// Array of contacts (recipients)
    #[serde(default)]
    pub contacts: Vec<WhatsAppContact>,
    /// Array of messages sent, usually one
    #[serde(default)]
    pub messages: Vec<WhatsAppMessageStatus>,
}

impl WhatsAppMessageResponse {
    /// Id assigned to the first accepted message, if any
    pub fn first_message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

/// Contact information in response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppContact {
    /// WhatsApp ID of the contact
    #[serde(default)]
    pub wa_id: String,
    /// Input phone number
    #[serde(default)]
    pub input: String,
}

/// Message status in response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppMessageStatus {
    /// Message ID
    pub id: String,
    /// "accepted", "held_for_quality_assessment", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
}
