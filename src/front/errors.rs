use derive_more::{Display, Error};
use ntex::{http, web};

/// Errors surfaced to webhook callers
///
/// Response bodies only carry the generic status text; details go to the logs.
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    /// Bad signature or verify token
    Forbidden,
    /// Body is not a webhook payload
    BadRequest(#[error(not(source))] String),
    MethodNotAllowed,
    UrlNotFound,
}

impl WebhookError {
    fn public_message(&self) -> &'static str {
        match self {
            WebhookError::Forbidden => "Forbidden",
            WebhookError::BadRequest(_) => "Bad Request",
            WebhookError::MethodNotAllowed => "Method Not Allowed",
            WebhookError::UrlNotFound => "Not Found",
        }
    }
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        if let WebhookError::BadRequest(details) = self {
            logfire::warn!("Bad request: {details}", details = details.clone());
        }

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/plain; charset=utf-8")
            .body(self.public_message())
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::Forbidden => http::StatusCode::FORBIDDEN,
            WebhookError::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            WebhookError::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::UrlNotFound => http::StatusCode::NOT_FOUND,
        }
    }
}
