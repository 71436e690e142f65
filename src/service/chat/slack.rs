//! Slack implementation of the chat client, on top of `slack-morphism`.

use crate::base::{
    config::Config,
    types::{Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument};

use std::{future::Future, sync::Arc};

use super::{ChatClient, ChatUser, ChatUserGroup, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Page size used when listing users.
const USER_LIST_LIMIT: u16 = 100;

/// Upper bound on pages fetched for a single listing.
const MAX_PAGES: usize = 1000;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    bot_token: SlackApiToken,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Check the token up front, so a bad token is a startup failure.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self { bot_token, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn post_message(&self, channel_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message);

        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        debug!("Posted message {} to {}", response.ts.0, channel_id);

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Res<Vec<ChatUser>> {
        let request = SlackApiUsersListRequest::new().with_limit(USER_LIST_LIMIT);

        let session = self.client.open_session(&self.bot_token);
        let session = &session;

        let members = collect_pages(|cursor| {
            let request = request.clone().opt_cursor(cursor);

            async move {
                let response = session.users_list(&request).await.map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;
                let next_cursor = response.response_metadata.and_then(|m| m.next_cursor);

                Ok((response.members, next_cursor))
            }
        })
        .await?;

        Ok(members.iter().map(to_chat_user).collect())
    }

    #[instrument(skip(self))]
    async fn user_info(&self, user_id: &str) -> Res<ChatUser> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let response = session.users_info(&request).await.map_err(|e| anyhow::anyhow!("Failed to get user info: {}", e))?;

        Ok(to_chat_user(&response.user))
    }

    #[instrument(skip(self))]
    async fn list_user_groups(&self) -> Res<Vec<ChatUserGroup>> {
        let request = SlackApiUserGroupsListRequest::new().with_include_users(true);

        let session = self.client.open_session(&self.bot_token);

        let response = session.usergroups_list(&request).await.map_err(|e| anyhow::anyhow!("Failed to list user groups: {}", e))?;

        Ok(response.usergroups.iter().map(to_chat_user_group).collect())
    }
}

// Pagination.

/// Fetch cursor-paginated pages until Slack stops returning a next cursor.
///
/// `fetch` is called with `None` for the first page, then with each returned cursor.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Res<Vec<T>>
where
    F: FnMut(Option<SlackCursorId>) -> Fut,
    Fut: Future<Output = Res<(Vec<T>, Option<SlackCursorId>)>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    for page in 1..=MAX_PAGES {
        let (page_items, next_cursor) = fetch(cursor).await?;
        items.extend(page_items);

        match next_cursor {
            Some(next) if !next.0.is_empty() => cursor = Some(next),
            _ => return Ok(items),
        }

        debug!("Fetched page {}, continuing ...", page);
    }

    Err(anyhow::anyhow!("Gave up after {} pages.", MAX_PAGES))
}

// Conversions.

fn to_chat_user(user: &SlackUser) -> ChatUser {
    let profile = user.profile.as_ref();

    ChatUser {
        id: user.id.0.clone(),
        name: user.name.clone().unwrap_or_default(),
        real_name: profile.and_then(|p| p.real_name.clone()).or_else(|| user.real_name.clone()),
        email: profile.and_then(|p| p.email.as_ref()).map(|e| e.0.clone()),
    }
}

fn to_chat_user_group(group: &SlackUserGroup) -> ChatUserGroup {
    ChatUserGroup {
        id: group.id.0.clone(),
        name: group.name.clone(),
        users: group.users.iter().flatten().map(|u| u.0.clone()).collect(),
    }
}

// Tests.
