//! Route configuration for the endpoints outside the webhook.

use super::server;
use ntex::web;

/// Configures the informational routes.
///
/// # Routes
/// - `GET /` - Informational page
/// - `GET /health` - Health check, always `OK`
pub fn info(cfg: &mut web::ServiceConfig) {
    cfg.service((server::index, server::health));
}
