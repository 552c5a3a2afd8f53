pub mod errors;
pub mod routes;
pub mod server;

use crate::{
    config::AppConfig,
    webhook::whatsapp::{client::WhatsAppClient, reply::ReplyPolicy},
};
use std::sync::Arc;

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub whatsapp_client: Arc<WhatsAppClient>,
    pub reply_policy: Arc<dyn ReplyPolicy>,
}
