//! # WhatsApp Webhook Bridge
//!
//! Main entry point for the webhook server.
//! Loads configuration, sets up logging and metrics, and serves the routes.

use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use std::sync::Arc;
use whatsapp_bridge::{
    config::AppConfig,
    front,
    webhook::{
        self,
        whatsapp::{client::WhatsAppClient, reply::KeywordReplyPolicy},
    },
};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::load()?;

    // Initialize logging and metrics
    let shutdown_handler = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent)
        .finish()?;

    if !app_config.is_signature_enforced() {
        logfire::warn!("FACEBOOK_APP_SECRET is not set, webhook signatures will not be verified");
    }
    if !app_config.has_outbound_credentials() {
        logfire::warn!(
            "WHATSAPP_ACCESS_TOKEN or WHATSAPP_PHONE_NUMBER_ID is not set, auto-replies will fail"
        );
    }

    let app_state = create_app_state(app_config)?;

    run_server(app_state).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Builds the shared state from the loaded configuration
fn create_app_state(app_config: AppConfig) -> anyhow::Result<front::AppState> {
    let whatsapp_client = WhatsAppClient::new(&app_config)?;

    Ok(front::AppState {
        config: Arc::new(app_config),
        whatsapp_client: Arc::new(whatsapp_client),
        reply_policy: Arc::new(KeywordReplyPolicy::default()),
    })
}

/// Configures and starts the web server
async fn run_server(app_state: front::AppState) -> anyhow::Result<()> {
    let server_addr = ("0.0.0.0", app_state.config.port);

    logfire::info!(
        "Starting server on port {port} (env: {env})",
        port = i64::from(server_addr.1),
        env = app_state.config.env.clone()
    );

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(app_state.clone())
            .configure(webhook::routes::whatsapp)
            .configure(front::routes::info)
            .default_service(web::route().to(front::server::serve_not_found))
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
