use tracing::{debug, error, info, instrument};

use crate::service::chat::ChatClient;

use super::event::Message;

/// Replies to a channel message whose text is exactly the trigger phrase.
///
/// The comparison is case-sensitive and does no trimming: `"Sweetwater"` or
/// `"sweetwater!"` do not match `"sweetwater"`.
#[instrument(skip_all, fields(channel = %event.channel))]
pub async fn handle_message(event: Message, trigger_phrase: &str, reply: &str, chat: &ChatClient) {
    if !is_trigger(&event, trigger_phrase) {
        debug!("Message does not match the trigger phrase.");
        return;
    }

    info!("Trigger phrase received, sending kudos ...");

    if let Err(err) = chat.post_message(&event.channel, reply).await {
        error!("Error while replying to message: {}", err);
    }
}

/// Whether the message text is exactly the trigger phrase.
pub fn is_trigger(event: &Message, trigger_phrase: &str) -> bool {
    event.text.as_deref() == Some(trigger_phrase)
}

// Tests.
