//! Inbound request handling for kudos-bot.
//!
//! This module provides everything between the HTTP listener and the chat client:
//! - Verifying signed requests
//! - Routing Events API callbacks (handshake, mentions, messages)
//! - Routing slash commands
//! - Directory lookups for the CLI

pub mod app_mention;
pub mod command;
pub mod directory;
pub mod event;
pub mod message;
pub mod verify;
