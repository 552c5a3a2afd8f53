//! # WhatsApp Webhook Schemas
//!
//! Data structures for the JSON payload WhatsApp Business API pushes to the
//! webhook (incoming messages, delivery statuses and errors).
//!
//! Decoding is forward compatible: unknown fields are ignored and every
//! collection defaults to empty when absent. Timestamps are kept as the
//! strings Meta sends them as.
//!
//! Items of a [`Value`] are decoded one by one. A malformed message still
//! reaches the dispatcher as [`MessageKind::MissingPayload`] or
//! [`MessageKind::Unsupported`]; a malformed contact, status or error is
//! skipped. Either way its siblings are kept.

use serde::{Deserialize, Deserializer};

/// Root webhook payload from WhatsApp
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// The object type, typically "whatsapp_business_account"
    #[serde(default)]
    pub object: String,
    /// Array of entry objects containing the actual data
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    /// Decodes a raw request body
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

/// Entry object containing changes for one business account
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// Business Account ID
    #[serde(default)]
    pub id: String,
    /// Array of changes that occurred
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// Change object containing the actual webhook data
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// The field that changed (e.g., "messages")
    #[serde(default)]
    pub field: String,
    /// The value containing the actual data
    #[serde(default)]
    pub value: Value,
}

/// Value object; any of its collections may be populated at the same time
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Value {
    /// Messaging product (e.g., "whatsapp")
    #[serde(default)]
    pub messaging_product: String,
    /// Metadata about the phone number
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// Array of contacts (senders)
    #[serde(default, deserialize_with = "skip_malformed")]
    pub contacts: Vec<Contact>,
    /// Array of messages received
    #[serde(default, deserialize_with = "messages_or_placeholders")]
    pub messages: Vec<Message>,
    /// Array of statuses (for sent messages)
    #[serde(default, deserialize_with = "skip_malformed")]
    pub statuses: Vec<Status>,
    /// Array of errors not tied to a message
    #[serde(default, deserialize_with = "skip_malformed")]
    pub errors: Vec<ProviderError>,
}

/// Raw items of a collection; `null` reads as empty
fn raw_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<serde_json::Value>, D::Error> {
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items = raw_items(deserializer)?
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                logfire::warn!(
                    "Skipping malformed webhook item: {error}",
                    error = e.to_string()
                );
                None
            }
        })
        .collect();

    Ok(items)
}

fn messages_or_placeholders<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Message>, D::Error> {
    Ok(raw_items(deserializer)?
        .iter()
        .map(Message::from_item)
        .collect())
}

/// Metadata about the WhatsApp Business phone number
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Display name of the business phone number
    #[serde(default)]
    pub display_phone_number: String,
    /// Phone number ID
    #[serde(default)]
    pub phone_number_id: String,
}

/// Contact information for the message sender
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    /// Profile information
    #[serde(default)]
    pub profile: Profile,
    /// WhatsApp ID (phone number)
    #[serde(default)]
    pub wa_id: String,
}

/// Profile information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Display name of the contact
    #[serde(default)]
    pub name: String,
}

/// Message object
///
/// The payload is selected by the `type` discriminator while decoding, see
/// [`MessageKind`].
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    /// Message ID
    pub id: String,
    /// Epoch seconds as sent by Meta, never parsed
    pub timestamp: String,
    /// Context (if this is a reply to another message)
    pub context: Option<Context>,
    /// Errors attached to unsupported messages
    pub errors: Vec<ProviderError>,
    /// The payload matching the message type
    pub kind: MessageKind,
}

impl Message {
    /// Decodes one item of `messages`, keeping the envelope fields of an
    /// unreadable one so the dispatcher still sees it
    fn from_item(item: &serde_json::Value) -> Self {
        match Message::deserialize(item) {
            Ok(message) => message,
            Err(e) => {
                let field = |name: &str| {
                    item.get(name)
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                let msg_type = field("type");

                logfire::warn!(
                    "Malformed {msg_type} message: {error}",
                    msg_type = msg_type.clone(),
                    error = e.to_string()
                );

                Self {
                    from: field("from"),
                    id: field("id"),
                    timestamp: field("timestamp"),
                    context: None,
                    errors: vec![],
                    kind: MessageKind::unreadable(msg_type),
                }
            }
        }
    }

    /// The `type` tag as received
    pub fn type_tag(&self) -> &str {
        match &self.kind {
            MessageKind::Text(_) => "text",
            MessageKind::Image(_) => "image",
            MessageKind::Audio(_) => "audio",
            MessageKind::Video(_) => "video",
            MessageKind::Document(_) => "document",
            MessageKind::Location(_) => "location",
            MessageKind::Button(_) => "button",
            MessageKind::Interactive(_) => "interactive",
            MessageKind::MissingPayload(tag) | MessageKind::Unsupported(tag) => tag,
        }
    }
}

/// Type specific content of an inbound message
#[derive(Debug, Clone)]
pub enum MessageKind {
    Text(TextMessage),
    Image(MediaMessage),
    Audio(MediaMessage),
    Video(MediaMessage),
    Document(MediaMessage),
    Location(LocationMessage),
    Button(ButtonMessage),
    Interactive(InteractiveMessage),
    /// A known type whose payload object was absent or unreadable
    MissingPayload(String),
    /// A type this bridge does not know about
    Unsupported(String),
}

const KNOWN_TYPES: [&str; 8] = [
    "text",
    "image",
    "audio",
    "video",
    "document",
    "location",
    "button",
    "interactive",
];

impl MessageKind {
    fn unreadable(msg_type: String) -> Self {
        if KNOWN_TYPES.contains(&msg_type.as_str()) {
            MessageKind::MissingPayload(msg_type)
        } else {
            MessageKind::Unsupported(msg_type)
        }
    }
}

/// Wire shape of a message: one optional field per payload type
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    from: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(rename = "type", default)]
    msg_type: String,
    context: Option<Context>,
    #[serde(default, deserialize_with = "skip_malformed")]
    errors: Vec<ProviderError>,
    text: Option<TextMessage>,
    image: Option<MediaMessage>,
    audio: Option<MediaMessage>,
    video: Option<MediaMessage>,
    document: Option<MediaMessage>,
    location: Option<LocationMessage>,
    button: Option<ButtonMessage>,
    interactive: Option<InteractiveMessage>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let missing = || MessageKind::MissingPayload(raw.msg_type.clone());

        let kind = match raw.msg_type.as_str() {
            "text" => raw.text.map(MessageKind::Text).unwrap_or_else(missing),
            "image" => raw.image.map(MessageKind::Image).unwrap_or_else(missing),
            "audio" => raw.audio.map(MessageKind::Audio).unwrap_or_else(missing),
            "video" => raw.video.map(MessageKind::Video).unwrap_or_else(missing),
            "document" => raw.document.map(MessageKind::Document).unwrap_or_else(missing),
            "location" => raw.location.map(MessageKind::Location).unwrap_or_else(missing),
            "button" => raw.button.map(MessageKind::Button).unwrap_or_else(missing),
            "interactive" => raw
                .interactive
                .map(MessageKind::Interactive)
                .unwrap_or_else(missing),
            other => MessageKind::Unsupported(other.to_string()),
        };

        Self {
            from: raw.from,
            id: raw.id,
            timestamp: raw.timestamp,
            context: raw.context,
            errors: raw.errors,
            kind,
        }
    }
}

/// Text message content
#[derive(Debug, Clone, Deserialize)]
pub struct TextMessage {
    /// The text body of the message
    #[serde(default)]
    pub body: String,
}

/// Media message content (image, video, document, audio)
#[derive(Debug, Clone, Deserialize)]
pub struct MediaMessage {
    /// Media ID
    #[serde(default)]
    pub id: String,
    /// MIME type
    pub mime_type: Option<String>,
    /// SHA256 hash of the media
    pub sha256: Option<String>,
    /// Caption (for image, video, document)
    pub caption: Option<String>,
    /// Original file name (document only)
    pub filename: Option<String>,
}

/// Location message content
#[derive(Debug, Clone, Deserialize)]
pub struct LocationMessage {
    /// Latitude
    #[serde(default)]
    pub latitude: f64,
    /// Longitude
    #[serde(default)]
    pub longitude: f64,
    /// Name of the location
    pub name: Option<String>,
    /// Address of the location
    pub address: Option<String>,
}

/// Quick reply button pressed on a template message
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonMessage {
    /// Button label
    #[serde(default)]
    pub text: String,
    /// Developer defined payload
    #[serde(default)]
    pub payload: String,
}

/// Reply to an interactive message
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveMessage {
    /// "button_reply" or "list_reply"
    #[serde(rename = "type", default)]
    pub interactive_type: String,
    pub button_reply: Option<ButtonReply>,
    pub list_reply: Option<ListReply>,
}

/// Selected reply button
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonReply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Selected list row
#[derive(Debug, Clone, Deserialize)]
pub struct ListReply {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// Context for reply messages
#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    /// Sender of the message being replied to
    #[serde(default)]
    pub from: String,
    /// Message ID being referenced
    #[serde(default)]
    pub id: String,
}

/// Status update for sent messages
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// Message ID
    #[serde(default)]
    pub id: String,
    /// Status (sent, delivered, read, failed, ...). Kept open on purpose.
    #[serde(default)]
    pub status: String,
    /// Timestamp
    #[serde(default)]
    pub timestamp: String,
    /// Recipient ID
    #[serde(default)]
    pub recipient_id: String,
    /// Errors explaining a failed delivery
    #[serde(default, deserialize_with = "skip_malformed")]
    pub errors: Vec<ProviderError>,
}

/// Error reported by the WhatsApp platform
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    /// Numeric error code
    #[serde(default)]
    pub code: i64,
    /// Short error title
    #[serde(default)]
    pub title: String,
    /// Human readable message
    pub message: Option<String>,
    /// Opaque structured details
    #[serde(rename = "error_data")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT_PAYLOAD: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "102290129340398",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {
                        "display_phone_number": "15550783881",
                        "phone_number_id": "106540352242922"
                    },
                    "contacts": [{"profile": {"name": "Sheena Nelson"}, "wa_id": "16505551234"}],
                    "messages": [{
                        "from": "16505551234",
                        "id": "wamid.HBgLMTY1MDM4Nzk0MzkVAgASGBQzQTRBNjU5OUFFRTAzODEwMTQ0RgA=",
                        "timestamp": "1749416383",
                        "type": "text",
                        "text": {"body": "Does it come in another color?"}
                    }]
                }
            }]
        }]
    }"#;

    #[test]
    fn test_decode_text_message() {
        let payload = WebhookPayload::from_slice(TEXT_PAYLOAD.as_bytes()).unwrap();

        assert_eq!(payload.object, "whatsapp_business_account");
        let value = &payload.entry[0].changes[0].value;
        assert_eq!(payload.entry[0].changes[0].field, "messages");
        assert_eq!(value.contacts[0].profile.name, "Sheena Nelson");
        assert!(value.statuses.is_empty() && value.errors.is_empty());

        let message = &value.messages[0];
        assert_eq!(message.timestamp, "1749416383");
        assert_eq!(message.type_tag(), "text");
        assert!(
            matches!(&message.kind, MessageKind::Text(t) if t.body == "Does it come in another color?")
        );
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let json = r#"{
            "object": "whatsapp_business_account",
            "brand_new_top_level": {"nested": [1, 2, 3]},
            "entry": [{
                "id": "1",
                "time": 1749416383,
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "future_collection": [],
                        "statuses": [{
                            "id": "wamid.out",
                            "status": "delivered",
                            "timestamp": "1749416400",
                            "recipient_id": "16505551234",
                            "conversation": {"id": "c1", "origin": {"type": "service"}},
                            "pricing": {"billable": true, "category": "service"}
                        }]
                    }
                }]
            }]
        }"#;

        let payload = WebhookPayload::from_slice(json.as_bytes()).unwrap();
        let status = &payload.entry[0].changes[0].value.statuses[0];

        assert_eq!(status.id, "wamid.out");
        assert_eq!(status.status, "delivered");
        assert_eq!(status.recipient_id, "16505551234");
        assert_eq!(status.timestamp, "1749416400");
    }

    #[test]
    fn test_location_without_coordinates_defaults_to_zero() {
        let json = r#"{"from":"1","id":"m1","timestamp":"1","type":"location",
            "location":{"name":"Somewhere"}}"#;

        let message: Message = serde_json::from_str(json).unwrap();

        match message.kind {
            MessageKind::Location(location) => {
                assert_eq!(location.name.as_deref(), Some("Somewhere"));
                assert_eq!(location.latitude, 0.0);
                assert_eq!(location.longitude, 0.0);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_malformed_items_keep_their_siblings() {
        let json = r#"{"object":"whatsapp_business_account","entry":[{"id":"1",
            "changes":[{"field":"messages","value":{
            "contacts":[{"profile":"not-an-object","wa_id":"2"},
                {"profile":{"name":"Sheena"},"wa_id":"16505551234"}],
            "messages":[
                {"from":"16505551234","id":"m1","timestamp":"1","type":"text","text":{"body":"hello"}},
                {"from":"16505551234","id":"m2","timestamp":"2","type":"location",
                    "location":{"latitude":"north","longitude":1}},
                {"from":"16505551234","id":"m3","timestamp":"3","type":"reaction","errors":"oops"},
                {"from":"16505551234","id":"m4","timestamp":"4","type":"text","text":{"body":"help"}}],
            "statuses":[{"id":"s1","status":"failed","errors":[{"code":"NaN"},{"code":131026}]},
                {"id":5,"status":"sent"},
                {"id":"s2","status":"delivered"}],
            "errors":null}}]}]}"#;

        let payload = WebhookPayload::from_slice(json.as_bytes()).unwrap();
        let value = &payload.entry[0].changes[0].value;

        assert_eq!(value.messages.len(), 4);
        assert!(matches!(&value.messages[0].kind, MessageKind::Text(t) if t.body == "hello"));
        assert!(matches!(&value.messages[1].kind, MessageKind::MissingPayload(t) if t == "location"));
        assert_eq!(value.messages[1].id, "m2");
        assert_eq!(value.messages[1].from, "16505551234");
        assert!(matches!(&value.messages[2].kind, MessageKind::Unsupported(t) if t == "reaction"));
        assert!(matches!(&value.messages[3].kind, MessageKind::Text(t) if t.body == "help"));

        assert_eq!(value.contacts.len(), 1);
        assert_eq!(value.contacts[0].profile.name, "Sheena");
        assert_eq!(value.statuses.len(), 2);
        assert_eq!(value.statuses[0].id, "s1");
        assert_eq!(value.statuses[0].errors.len(), 1);
        assert_eq!(value.statuses[0].errors[0].code, 131026);
        assert_eq!(value.statuses[1].id, "s2");
        assert!(value.errors.is_empty());
    }

    #[test]
    fn test_decode_unknown_message_type() {
        let json = r#"{"from":"1","id":"m1","timestamp":"1","type":"reaction",
            "reaction":{"message_id":"m0","emoji":"x"}}"#;

        let message: Message = serde_json::from_str(json).unwrap();

        assert!(matches!(&message.kind, MessageKind::Unsupported(t) if t == "reaction"));
        assert_eq!(message.type_tag(), "reaction");
    }

    #[test]
    fn test_decode_known_type_without_payload() {
        let json = r#"{"from":"1","id":"m1","timestamp":"1","type":"image"}"#;

        let message: Message = serde_json::from_str(json).unwrap();

        assert!(matches!(&message.kind, MessageKind::MissingPayload(t) if t == "image"));
    }

    #[test]
    fn test_decode_selects_payload_by_type_not_presence() {
        // a stray text object must not win over the declared type
        let json = r#"{"from":"1","id":"m1","timestamp":"1","type":"location",
            "text":{"body":"ignored"},
            "location":{"latitude":19.43,"longitude":-99.13,"name":"Zocalo"}}"#;

        let message: Message = serde_json::from_str(json).unwrap();

        match message.kind {
            MessageKind::Location(location) => {
                assert_eq!(location.name.as_deref(), Some("Zocalo"));
                assert!((location.latitude - 19.43).abs() < f64::EPSILON);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_decode_interactive_and_button() {
        let interactive = r#"{"from":"1","id":"m1","timestamp":"1","type":"interactive",
            "context":{"from":"15550783881","id":"wamid.prev"},
            "interactive":{"type":"list_reply","list_reply":{"id":"opt-1","title":"Option 1"}}}"#;
        let button = r#"{"from":"1","id":"m2","timestamp":"1","type":"button",
            "button":{"text":"Yes","payload":"CONFIRM"}}"#;

        let interactive: Message = serde_json::from_str(interactive).unwrap();
        let button: Message = serde_json::from_str(button).unwrap();

        assert_eq!(interactive.context.as_ref().unwrap().id, "wamid.prev");
        match interactive.kind {
            MessageKind::Interactive(i) => {
                assert_eq!(i.interactive_type, "list_reply");
                assert_eq!(i.list_reply.unwrap().id, "opt-1");
                assert!(i.button_reply.is_none());
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(matches!(button.kind, MessageKind::Button(b) if b.payload == "CONFIRM"));
    }

    #[test]
    fn test_decode_errors_with_opaque_details() {
        let json = r#"{"object":"whatsapp_business_account","entry":[{"id":"1","changes":[{
            "field":"messages","value":{"errors":[{"code":131051,"title":"Unsupported message type",
            "message":"Message type is not currently supported",
            "error_data":{"details":"Message type is not currently supported"}}]}}]}]}"#;

        let payload = WebhookPayload::from_slice(json.as_bytes()).unwrap();
        let error = &payload.entry[0].changes[0].value.errors[0];

        assert_eq!(error.code, 131051);
        assert_eq!(error.title, "Unsupported message type");
        assert!(error.details.as_ref().unwrap().get("details").is_some());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(WebhookPayload::from_slice(b"{\"object\":").is_err());
        assert!(WebhookPayload::from_slice(b"not json").is_err());
        assert!(WebhookPayload::from_slice(b"{\"entry\":\"oops\"}").is_err());
    }

    #[test]
    fn test_decode_minimal_envelope() {
        let payload = WebhookPayload::from_slice(b"{\"object\":\"page\"}").unwrap();

        assert_eq!(payload.object, "page");
        assert!(payload.entry.is_empty());
    }
}
