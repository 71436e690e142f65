//! Chat service integration for kudos-bot.
//!
//! This module provides functionality for talking back to the chat platform:
//! - Posting messages to channels
//! - Looking up users and user groups
//!
//! It defines the `GenericChatClient` trait that can be implemented for different
//! chat services, with a default implementation for Slack.

pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, Void};

// Types.

/// A workspace member, as reported by the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    pub real_name: Option<String>,
    pub email: Option<String>,
}

/// A named group of workspace members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatUserGroup {
    pub id: String,
    pub name: String,
    pub users: Vec<String>,
}

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// The routers only ever post replies through this trait, so tests can swap in
/// a fake implementation.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Post a plain-text message to a channel.
    async fn post_message(&self, channel_id: &str, text: &str) -> Void;

    /// List the members of the workspace.
    async fn list_users(&self) -> Res<Vec<ChatUser>>;

    /// Look up a single member by ID.
    async fn user_info(&self, user_id: &str) -> Res<ChatUser>;

    /// List the user groups of the workspace, including their members.
    async fn list_user_groups(&self) -> Res<Vec<ChatUserGroup>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
