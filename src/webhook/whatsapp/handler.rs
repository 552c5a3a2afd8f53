//! # WhatsApp Webhook Handler
//!
//! Walks a decoded webhook payload and hands every message, status update and
//! error to an [`EventHandler`]. [`ReplyingHandler`] is the handler used by
//! the web server: it logs each event and answers text messages through the
//! configured [`ReplyPolicy`].
//!
//! Replies are sent from detached tasks. The webhook is acknowledged without
//! waiting for them, nothing cancels them, and there is no cap on how many run
//! at once.

use super::{
    client::WhatsAppClient,
    reply::{ReplyAction, ReplyPolicy},
    schemas::{Contact, Message, MessageKind, ProviderError, Status, WebhookPayload},
};
use crate::{consts, metric};
use std::sync::Arc;

/// Receives the leaf events of a webhook payload
#[cfg_attr(test, mockall::automock)]
pub trait EventHandler {
    /// Called once per message; `contacts` are the contacts sent along with it
    fn handle_message(&self, message: &Message, contacts: &[Contact]) -> anyhow::Result<()>;

    /// Called once per delivery status update
    fn handle_status(&self, status: &Status) -> anyhow::Result<()>;

    /// Called once per error reported outside of a status
    fn handle_error(&self, error: &ProviderError) -> anyhow::Result<()>;
}

/// Fans the payload out to `handler`
///
/// Every item reaches the handler once, in the order it appears. A failing
/// item is logged and the remaining items are still processed.
pub fn dispatch(payload: &WebhookPayload, handler: &dyn EventHandler) {
    logfire::info!(
        "Received webhook: object={object}, entries={entries}",
        object = payload.object.clone(),
        entries = payload.entry.len() as i64
    );

    for entry in &payload.entry {
        for change in &entry.changes {
            tracing::info!(entry = %entry.id, field = %change.field, "Processing change");
            let value = &change.value;

            for message in &value.messages {
                metric::incr_webhook_event_statds("message");
                if let Err(e) = handler.handle_message(message, &value.contacts) {
                    logfire::error!("Failed to handle message: {error}", error = e.to_string());
                }
            }

            for status in &value.statuses {
                metric::incr_webhook_event_statds("status");
                if let Err(e) = handler.handle_status(status) {
                    logfire::error!("Failed to handle status: {error}", error = e.to_string());
                }
            }

            for error in &value.errors {
                metric::incr_webhook_event_statds("error");
                if let Err(e) = handler.handle_error(error) {
                    logfire::error!("Failed to handle error: {error}", error = e.to_string());
                }
            }
        }
    }
}

/// Display name of `wa_id` among `contacts`, "Unknown" when absent
pub fn resolve_sender_name<'a>(wa_id: &str, contacts: &'a [Contact]) -> &'a str {
    contacts
        .iter()
        .find(|contact| contact.wa_id == wa_id)
        .map(|contact| contact.profile.name.as_str())
        .unwrap_or(consts::UNKNOWN_SENDER_NAME)
}

fn log_provider_error(prefix: &str, error: &ProviderError) {
    logfire::warn!(
        "{prefix}: [{code}] {title} - {message}",
        prefix = prefix.to_string(),
        code = error.code,
        title = error.title.clone(),
        message = error.message.clone().unwrap_or_default()
    );
    if let Some(details) = &error.details {
        logfire::warn!("Details: {details}", details = details.to_string());
    }
}

/// Logs every event and answers text messages
#[derive(Clone)]
pub struct ReplyingHandler {
    client: Arc<WhatsAppClient>,
    policy: Arc<dyn ReplyPolicy>,
}

impl ReplyingHandler {
    pub fn new(client: Arc<WhatsAppClient>, policy: Arc<dyn ReplyPolicy>) -> Self {
        Self { client, policy }
    }

    fn handle_text(&self, message: &Message, sender_name: &str, body: &str) {
        logfire::info!("Text: {body}", body = body.to_string());

        match self.policy.decide(&message.from, sender_name, body) {
            Some(reply) => {
                logfire::info!(
                    "Auto-reply rule {rule} matched for {from}",
                    rule = reply.rule.clone(),
                    from = message.from.clone()
                );
                spawn_reply(self.client.clone(), message.from.clone(), reply.action);
            }
            None => {
                logfire::info!(
                    "No auto-reply rule matched for: {body}",
                    body = body.to_string()
                );
            }
        }
    }
}

impl EventHandler for ReplyingHandler {
    fn handle_message(&self, message: &Message, contacts: &[Contact]) -> anyhow::Result<()> {
        let sender_name = resolve_sender_name(&message.from, contacts);

        logfire::info!(
            "Message from {name} ({from}) id={id} type={msg_type} timestamp={timestamp}",
            name = sender_name.to_string(),
            from = message.from.clone(),
            id = message.id.clone(),
            msg_type = message.type_tag().to_string(),
            timestamp = message.timestamp.clone()
        );

        match &message.kind {
            MessageKind::Text(text) => self.handle_text(message, sender_name, &text.body),
            MessageKind::Image(media) => {
                logfire::info!(
                    "Image ID: {id} caption: {caption}",
                    id = media.id.clone(),
                    caption = media.caption.clone().unwrap_or_default()
                );
            }
            MessageKind::Audio(media) => {
                logfire::info!("Audio ID: {id}", id = media.id.clone());
            }
            MessageKind::Video(media) => {
                logfire::info!("Video ID: {id}", id = media.id.clone());
            }
            MessageKind::Document(media) => {
                logfire::info!(
                    "Document ID: {id} filename: {filename}",
                    id = media.id.clone(),
                    filename = media.filename.clone().unwrap_or_default()
                );
            }
            MessageKind::Location(location) => {
                logfire::info!(
                    "Location: {latitude}, {longitude} name: {name}",
                    latitude = location.latitude,
                    longitude = location.longitude,
                    name = location.name.clone().unwrap_or_default()
                );
            }
            MessageKind::Button(button) => {
                logfire::info!(
                    "Button: {text} (payload: {payload})",
                    text = button.text.clone(),
                    payload = button.payload.clone()
                );
            }
            MessageKind::Interactive(interactive) => {
                if let Some(reply) = &interactive.button_reply {
                    logfire::info!(
                        "Button Reply: {title} (id: {id})",
                        title = reply.title.clone(),
                        id = reply.id.clone()
                    );
                }
                if let Some(reply) = &interactive.list_reply {
                    logfire::info!(
                        "List Reply: {title} (id: {id})",
                        title = reply.title.clone(),
                        id = reply.id.clone()
                    );
                }
            }
            MessageKind::MissingPayload(msg_type) => {
                logfire::warn!(
                    "Message {id} of type {msg_type} arrived without its payload",
                    id = message.id.clone(),
                    msg_type = msg_type.clone()
                );
            }
            MessageKind::Unsupported(msg_type) => {
                logfire::warn!(
                    "Unhandled message type: {msg_type}",
                    msg_type = msg_type.clone()
                );
            }
        }

        for error in &message.errors {
            log_provider_error("Message error", error);
        }

        Ok(())
    }

    fn handle_status(&self, status: &Status) -> anyhow::Result<()> {
        logfire::info!(
            "Status update for message {id}: {state} recipient={recipient} timestamp={timestamp}",
            id = status.id.clone(),
            state = status.status.clone(),
            recipient = status.recipient_id.clone(),
            timestamp = status.timestamp.clone()
        );

        for error in &status.errors {
            log_provider_error("Status error", error);
        }

        Ok(())
    }

    fn handle_error(&self, error: &ProviderError) -> anyhow::Result<()> {
        log_provider_error("Webhook Error", error);

        Ok(())
    }
}

/// Sends `action` to `to` on a detached task
///
/// The caller never learns the outcome: failures only reach the logs.
pub fn spawn_reply(client: Arc<WhatsAppClient>, to: String, action: ReplyAction) {
    ntex::rt::spawn(async move {
        let result = match action {
            ReplyAction::Text { body } => client.send_text_message(&to, &body).await,
            ReplyAction::Template {
                name,
                language_code,
                body_params,
            } => {
                client
                    .send_template_with_body_params(&to, &name, &language_code, &body_params)
                    .await
            }
        };

        if let Err(e) = result {
            logfire::error!(
                "Failed to send auto-reply to {to}: {error}",
                to = to.clone(),
                error = e.to_string()
            );
        }
    });
}
