//! Slash command routing.
//!
//! Supported commands answer with a fixed text written straight into the HTTP
//! response. An unrecognized command is answered with a 500, as the bot has always
//! done, even though the fault lies with the caller.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{base::replies::SLASH_COMMANDS, runtime::Runtime};

// Types.

/// A slash command invocation, as posted (form-encoded) by Slack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlashCommand {
    /// The command name, including the leading slash (e.g. `/kudosstats`).
    pub command: String,
    /// Free text typed after the command.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    /// Where delayed responses can be posted.
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub trigger_id: Option<String>,
}

impl SlashCommand {
    /// Parse a form-encoded request body.
    pub fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(body)
    }

    /// The fixed response for this command, if it is supported.
    pub fn reply(&self) -> Option<&'static str> {
        SLASH_COMMANDS.iter().find(|(name, _)| *name == self.command).map(|(_, reply)| *reply)
    }
}

// Handlers.

/// Axum handler for `POST /slash`.
///
/// The signature is checked against the buffered body before it is parsed, so nothing
/// about the command is acted on (or even read) for an unverified request.
#[instrument(skip_all)]
pub async fn handle_slash_command(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    info!("Got slash command");

    if let Err(err) = runtime.verifier.verify(&headers, &body) {
        warn!("Rejected slash command: {}", err);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let command = match SlashCommand::parse(&body) {
        Ok(command) => command,
        Err(err) => {
            warn!("Failed to parse slash command: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    respond(&command)
}

/// Build the response for a verified command.
pub fn respond(command: &SlashCommand) -> Response {
    match command.reply() {
        Some(reply) => {
            info!(command = %command.command, "Answering slash command");
            (StatusCode::OK, reply).into_response()
        }
        None => {
            warn!(command = %command.command, "Unsupported slash command");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// Tests.
