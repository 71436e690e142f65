//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::replies;

use super::types::{Res, Void};

/// Largest accepted freshness window, in seconds.
const MAX_REQUEST_AGE_SECS: u64 = 3600;

/// Default local listener address.
fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Default freshness window for signed requests.
fn default_request_max_age_secs() -> u64 {
    300
}

/// Default trigger phrase.
fn default_trigger_phrase() -> String {
    replies::TRIGGER_PHRASE.to_string()
}

/// Default reply to the trigger phrase.
fn default_trigger_reply() -> String {
    replies::TRIGGER_REPLY.to_string()
}

/// Default reply to an app mention.
fn default_mention_reply() -> String {
    replies::MENTION_REPLY.to_string()
}

/// Configuration for the kudos-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The shared, immutable settings.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// The deserialized settings behind [`Config`].
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// ngrok auth token (`NGROK_AUTHTOKEN`).
    /// When present, the HTTP endpoint is exposed through an ngrok tunnel instead of a local socket.
    #[serde(default)]
    pub ngrok_authtoken: Option<String>,
    /// Local address to listen on when no tunnel is configured (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Maximum age, in seconds, of a signed request before it is rejected as a replay (`REQUEST_MAX_AGE_SECS`).
    #[serde(default = "default_request_max_age_secs")]
    pub request_max_age_secs: u64,
    /// Exact-match message text that triggers the celebratory reply (`TRIGGER_PHRASE`).
    #[serde(default = "default_trigger_phrase")]
    pub trigger_phrase: String,
    /// Reply posted for the trigger phrase (`TRIGGER_REPLY`).
    #[serde(default = "default_trigger_reply")]
    pub trigger_reply: String,
    /// Reply posted for an app mention (`MENTION_REPLY`).
    #[serde(default = "default_mention_reply")]
    pub mention_reply: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_bot_token: String::new(),
            slack_signing_secret: String::new(),
            ngrok_authtoken: None,
            bind_address: default_bind_address(),
            request_max_age_secs: default_request_max_age_secs(),
            trigger_phrase: default_trigger_phrase(),
            trigger_reply: default_trigger_reply(),
            mention_reply: default_mention_reply(),
        }
    }
}

impl Config {
    /// Load from the environment and a TOML file, then validate.
    ///
    /// The file is `explicit_path` when given, otherwise `.hidden/config.toml` if it exists.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("KUDOS_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize::<ConfigInner>()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the loaded values, so that a bad deployment fails at startup rather than per request.
    pub fn validate(&self) -> Void {
        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must be set."));
        }

        if self.slack_signing_secret.is_empty() {
            return Err(anyhow::anyhow!("Slack signing secret must be set."));
        }

        if self.trigger_phrase.is_empty() {
            return Err(anyhow::anyhow!("Trigger phrase must not be empty."));
        }

        if self.request_max_age_secs < 1 || self.request_max_age_secs > MAX_REQUEST_AGE_SECS {
            return Err(anyhow::anyhow!("Request max age must be between 1 and {} seconds.", MAX_REQUEST_AGE_SECS));
        }

        if self.ngrok_authtoken.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(anyhow::anyhow!("ngrok auth token must not be blank when set."));
        }

        Ok(())
    }
}

// Tests.
