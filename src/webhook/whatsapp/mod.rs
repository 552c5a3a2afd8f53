//! WhatsApp webhook integration module
//!
//! Inbound: the webhook routes verify the signature, decode the envelope and
//! hand every message, status and error to an [`EventHandler`](handler::EventHandler).
//! Outbound: [`client::WhatsAppClient`] sends text and template messages
//! through the Graph API.
//!
//! ## Submodules
//!
//! - [`client`] - WhatsApp API client for sending messages
//! - [`handler`] - Event dispatch and the auto-replying handler
//! - [`reply`] - Keyword based reply policy
//! - [`routes`] - HTTP endpoint handlers for the webhook
//! - [`schemas`] - Data structures for webhook payloads (incoming and outgoing)
//! - [`security`] - `X-Hub-Signature-256` verification
//! - [`transport`] - HTTP transport seam used by the client

pub mod client;
pub mod handler;
pub mod reply;
pub mod routes;
pub mod schemas;
pub mod security;
pub mod transport;

pub use routes::{receive, verify};
