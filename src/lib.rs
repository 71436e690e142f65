//! Library root for `kudos-bot`.
//!
//! Kudos-bot is a small Slack bot driven by the Events API and slash commands:
//! - Answers the Events API URL verification handshake
//! - Greets anyone who @-mentions it
//! - Celebrates an exact trigger phrase posted in a channel
//! - Answers the `/kudosstats` slash command
//!
//! Every inbound request is verified against the Slack signing secret before it
//! is parsed or acted upon. The chat client sits behind a trait so it can be
//! swapped out in tests.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Install the process-wide rustls crypto provider.
///
/// Safe to call more than once; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = crypto::ring::default_provider().install_default();
}

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the kudos-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client and request verifier
/// - Serves the HTTP endpoints until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting kudos-bot ...");

    install_crypto_provider();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
