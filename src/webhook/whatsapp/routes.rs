//! WhatsApp webhook endpoint handlers
//!
//! This module handles incoming webhook requests from WhatsApp Business API.
//! It implements both the verification endpoint (GET) and the webhook receiver (POST).
//!
//! # Security
//!
//! When an app secret is configured, the POST endpoint only accepts bodies whose
//! `X-Hub-Signature-256` header matches the HMAC-SHA256 of the raw bytes.

use super::{
    handler::{self, ReplyingHandler},
    schemas::WebhookPayload,
    security,
};
use crate::{
    consts,
    front::{AppState, errors},
    metric,
};
use ntex::{util::Bytes, web};
use serde::Deserialize;

/// Query parameters for webhook verification
///
/// Missing parameters are read as empty strings, which fails verification.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    /// The verification token from WhatsApp
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
}

/// Webhook verification endpoint (GET)
///
/// WhatsApp sends a GET request to verify the webhook URL.
/// This endpoint validates the verify token and returns the challenge.
///
/// # Returns
/// - 200 with challenge string if verification succeeds
/// - 403 if verification fails
pub async fn verify(
    query: web::types::Query<VerifyQuery>,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    logfire::info!(
        "Verification request - mode: {mode}",
        mode = query.mode.clone()
    );

    if query.mode != consts::SUBSCRIBE_MODE {
        logfire::warn!("Webhook verification failed: unexpected mode");
        return Err(errors::WebhookError::Forbidden.into());
    }

    if !security::verify_token_matches(&query.verify_token, &app_state.config.verify_token) {
        logfire::warn!("Webhook verification failed: invalid verify token");
        return Err(errors::WebhookError::Forbidden.into());
    }

    logfire::info!("Webhook verified successfully");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(query.challenge.clone()))
}

/// Webhook receiver endpoint (POST)
///
/// Verifies the signature (when a secret is configured), decodes the payload
/// and dispatches every event. The response is `EVENT_RECEIVED` once dispatch
/// ran, whatever the individual handlers did, since WhatsApp redelivers on any
/// non 2xx answer. Auto-replies keep running after the response is sent.
///
/// # Returns
/// - 200 `EVENT_RECEIVED`
/// - 403 if the signature does not match
/// - 400 if the body is not a webhook payload
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let _span = logfire::span!("whatsapp_webhook").entered();

    if app_state.config.is_signature_enforced() {
        let signature = req
            .headers()
            .get(consts::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !security::verify_signature(signature, &body, &app_state.config.app_secret) {
            metric::incr_webhook_rejected_statds("signature");
            logfire::warn!("Invalid signature");
            return Err(errors::WebhookError::Forbidden.into());
        }
    }

    let payload = WebhookPayload::from_slice(&body).map_err(|e| {
        metric::incr_webhook_rejected_statds("decode");
        errors::WebhookError::BadRequest(format!("Error parsing payload: {e}"))
    })?;

    let event_handler = ReplyingHandler::new(
        app_state.whatsapp_client.clone(),
        app_state.reply_policy.clone(),
    );
    handler::dispatch(&payload, &event_handler);

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(consts::EVENT_RECEIVED))
}
