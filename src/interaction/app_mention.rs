use tracing::{error, info, instrument};

use crate::service::chat::ChatClient;

use super::event::AppMention;

/// Greets whoever @-mentioned the bot, in the channel they mentioned it from.
#[instrument(skip_all, fields(channel = %event.channel))]
pub async fn handle_app_mention(event: AppMention, reply: &str, chat: &ChatClient) {
    info!("Received app mention event ...");

    // Delivery failures are logged, never surfaced to the caller.
    if let Err(err) = chat.post_message(&event.channel, reply).await {
        error!("Error while replying to mention: {}", err);
    }
}
