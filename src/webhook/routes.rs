use crate::front::server;
use ntex::web;

/// Configures the WhatsApp webhook resource.
///
/// These routes are public endpoints; POST bodies are authenticated by their
/// HMAC signature when an app secret is configured.
///
/// # Routes
/// - `GET /webhook` - WhatsApp webhook verification
/// - `POST /webhook` - WhatsApp webhook receiver
/// - any other method - `405 Method Not Allowed`
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/webhook")
            .route(web::get().to(super::whatsapp::verify))
            .route(web::post().to(super::whatsapp::receive))
            .route(web::route().to(server::serve_method_not_allowed)),
    );
}
