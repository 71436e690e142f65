//! Workspace directory lookups (users and user groups).
//!
//! These back the `users`, `user` and `groups` subcommands, and render one line per entry.

use tracing::instrument;

use crate::{base::types::Res, service::chat::ChatClient};

/// One `Name: <name>, ID: <id>` line per workspace member.
#[instrument(skip_all)]
pub async fn list_users(chat: &ChatClient) -> Res<Vec<String>> {
    let users = chat.list_users().await?;

    Ok(users.iter().map(|user| format!("Name: {}, ID: {}", user.name, user.id)).collect())
}

/// A single `ID: <id>, Fullname: <name>, Email: <email>` line.
#[instrument(skip(chat))]
pub async fn user_info(chat: &ChatClient, user_id: &str) -> Res<String> {
    let user = chat.user_info(user_id).await?;

    Ok(format!(
        "ID: {}, Fullname: {}, Email: {}",
        user.id,
        user.real_name.as_deref().unwrap_or_default(),
        user.email.as_deref().unwrap_or_default()
    ))
}

/// One `ID: <id>, Name: <name>, Users: <id>, <id>, ...` line per user group.
#[instrument(skip_all)]
pub async fn list_groups(chat: &ChatClient) -> Res<Vec<String>> {
    let groups = chat.list_user_groups().await?;

    Ok(groups.iter().map(|group| format!("ID: {}, Name: {}, Users: {}", group.id, group.name, group.users.join(", "))).collect())
}
