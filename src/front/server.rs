//! Handlers not linked to the webhook

use crate::{consts, front::errors};
use ntex::web;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>WhatsApp Webhook Bridge</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #25D366; }
        code { background: #f4f4f4; padding: 2px 6px; border-radius: 4px; }
        pre { background: #f4f4f4; padding: 15px; border-radius: 8px; overflow-x: auto; }
    </style>
</head>
<body>
    <h1>WhatsApp Webhook Bridge</h1>
    <p>Server is running!</p>

    <h2>Endpoints</h2>
    <ul>
        <li><code>GET /webhook</code> - Webhook verification</li>
        <li><code>POST /webhook</code> - Receive webhook events</li>
        <li><code>GET /health</code> - Health check</li>
    </ul>

    <h2>Configuration</h2>
    <pre>
WEBHOOK_VERIFY_TOKEN=your_verify_token
FACEBOOK_APP_SECRET=your_app_secret
WHATSAPP_ACCESS_TOKEN=your_access_token
WHATSAPP_PHONE_NUMBER_ID=your_phone_number_id
PORT=8080 (optional)
    </pre>
</body>
</html>"#;

/// Endpoint to render the informational page
#[web::get("/")]
pub async fn index() -> impl web::Responder {
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

/// Health check, always `OK`
#[web::get("/health")]
pub async fn health() -> impl web::Responder {
    web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(consts::HEALTH_OK)
}

/// Return a [UrlNotFound](errors::WebhookError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::WebhookError::UrlNotFound.into())
}

/// Return a [MethodNotAllowed](errors::WebhookError::MethodNotAllowed) error for known urls
pub async fn serve_method_not_allowed() -> Result<web::HttpResponse, web::Error> {
    Err(errors::WebhookError::MethodNotAllowed.into())
}
