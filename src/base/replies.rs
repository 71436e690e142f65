//! Canned replies used by the event and command routers.

/// Reply posted whenever the bot is @-mentioned.
pub const MENTION_REPLY: &str = "Yes, hello.";

/// Phrase that, matched exactly, earns a celebratory reply.
pub const TRIGGER_PHRASE: &str = "sweetwater";

/// Reply posted when a message matches the trigger phrase.
pub const TRIGGER_REPLY: &str = "Sweetwater rocks!";

/// Reply for the `/kudosstats` slash command.
pub const KUDOS_STATS_REPLY: &str = "You get some stats!";

/// Supported slash commands and their fixed responses.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[("/kudosstats", KUDOS_STATS_REPLY)];
