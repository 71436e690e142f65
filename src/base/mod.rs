//! Core components, types, and utilities for the kudos-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Canned replies and the supported slash command table.
//! - Common types and result handling.

pub mod config;
pub mod replies;
pub mod types;
