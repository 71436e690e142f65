//! Runtime services and shared state for the kudos-bot.

use axum::{
    Router,
    routing::{get, post},
};
use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{command, event, verify::RequestVerifier},
    service::{chat::ChatClient, tunnel},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the request verifier, and the chat client.
/// All of it is read-only after startup, and it is designed to be trivially
/// cloneable, allowing it to be passed around (and used as axum state) without
/// the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// Verifier for inbound signed requests.
    pub verifier: RequestVerifier,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance, connecting to Slack.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self::with_chat(config, chat))
    }

    /// Create a runtime around an already constructed chat client.
    pub fn with_chat(config: Config, chat: ChatClient) -> Self {
        let verifier = RequestVerifier::new(config.slack_signing_secret.as_bytes(), config.request_max_age_secs);

        Self { config, verifier, chat }
    }

    /// The HTTP surface of the bot.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/events", post(event::handle_events))
            .route("/slash", post(command::handle_slash_command))
            .route("/health", get(health))
            .with_state(self.clone())
    }

    /// Serve the router until shutdown.
    pub async fn start(&self) -> Void {
        tunnel::serve(&self.config, self.router()).await
    }
}

async fn health() -> &'static str {
    "ok"
}
