//! Webhook handlers for the WhatsApp Cloud API
//!
//! ## Modules
//!
//! - [`whatsapp`] - WhatsApp Business API webhook handlers and outbound client
//! - [`routes`] - Route configuration for the `/webhook` resource

pub mod routes;
pub mod whatsapp;
