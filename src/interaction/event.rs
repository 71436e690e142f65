//! Events API callback routing.
//!
//! A verified body is parsed into an [`InboundEvent`] envelope. The one-time
//! `url_verification` handshake is answered by echoing its challenge; an
//! `event_callback` is dispatched on the tag of its inner event.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::runtime::Runtime;

use super::{app_mention, message};

// Types.

/// Outer envelope of an Events API request, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Endpoint ownership handshake; the challenge must be echoed back verbatim.
    UrlVerification { challenge: String },
    /// A subscribed event occurred.
    EventCallback { event: InnerEvent },
    /// Any other envelope (e.g. `app_rate_limited`).
    #[serde(other)]
    Unsupported,
}

/// Event-specific payload of an `event_callback` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    AppMention(AppMention),
    Message(Message),
    /// Event kinds the bot does not handle; ignored so new subscriptions never break the endpoint.
    #[serde(other)]
    Unknown,
}

/// The bot was @-mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppMention {
    pub channel: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
}

/// A message was posted to a channel the bot is in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub channel: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl InboundEvent {
    /// Parse the envelope out of a raw request body.
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

// Handlers.

/// Axum handler for `POST /events`.
///
/// The body is buffered once; the same bytes are verified and then parsed.
#[instrument(skip_all)]
pub async fn handle_events(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(err) = runtime.verifier.verify(&headers, &body) {
        warn!("Rejected event request: {}", err);
        return err.status().into_response();
    }

    let event = match InboundEvent::parse(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Failed to parse event body: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    dispatch(event, &runtime).await
}

/// Route a verified envelope to its handler and build the response.
pub async fn dispatch(event: InboundEvent, runtime: &Runtime) -> Response {
    match event {
        InboundEvent::UrlVerification { challenge } => {
            info!("URL verification message received");
            (StatusCode::OK, [(header::CONTENT_TYPE, "text")], challenge).into_response()
        }
        InboundEvent::EventCallback { event } => {
            dispatch_inner(event, runtime).await;
            StatusCode::OK.into_response()
        }
        InboundEvent::Unsupported => {
            warn!("Received unsupported envelope type.");
            StatusCode::OK.into_response()
        }
    }
}

async fn dispatch_inner(event: InnerEvent, runtime: &Runtime) {
    let config = &runtime.config;

    match event {
        InnerEvent::AppMention(mention) => app_mention::handle_app_mention(mention, &config.mention_reply, &runtime.chat).await,
        InnerEvent::Message(msg) => message::handle_message(msg, &config.trigger_phrase, &config.trigger_reply, &runtime.chat).await,
        InnerEvent::Unknown => warn!("Received unhandled callback event."),
    }
}

// Tests.
