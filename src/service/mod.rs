//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the kudos-bot:
//! - Chat services (e.g., Slack)
//! - Public ingress for the HTTP endpoint (local socket or ngrok tunnel)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod tunnel;
