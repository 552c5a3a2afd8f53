//! # WhatsApp Webhook Bridge
//!
//! Receives WhatsApp Cloud API webhook events, answers a few keywords with an
//! automatic reply and exposes a client to send text and template messages.

pub mod config;
pub mod consts;
pub mod front;
pub mod metric;
pub mod webhook;
