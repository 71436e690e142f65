//! Binary entry point for `kudos-bot`.
//!
//! This module provides the command-line interface for kudos-bot with options
//! for configuration file paths and logging verbosity. It initializes the
//! necessary components and either serves the bot or runs a directory lookup.

use clap::{Parser, Subcommand};
use kudos_bot::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::directory,
    service::chat::ChatClient,
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Kudos-bot – a Slack bot that hands out kudos.
///
/// Configuration can come from `config.toml` or environment variables
/// (prefixed with `KUDOS_BOT_`).
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP (endpoint from the standard `OTEL_EXPORTER_OTLP_*` variables).
    #[arg(long)]
    otlp: bool,
    /// What to do (defaults to `serve`).
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the Slack event and slash command endpoints.
    Serve,
    /// List workspace members.
    Users,
    /// Show a single workspace member.
    User {
        /// The Slack user ID (e.g. `U012AB3CD`).
        id: String,
    },
    /// List workspace user groups.
    Groups,
}

/// Main entry point for the kudos-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the requested command.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if requested.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("kudos-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    // A missing or invalid config is fatal.

    let config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => kudos_bot::start(config).await,
        Command::Users => print_lines(directory::list_users(&directory_client(&config).await?).await?),
        Command::User { id } => print_lines(vec![directory::user_info(&directory_client(&config).await?, &id).await?]),
        Command::Groups => print_lines(directory::list_groups(&directory_client(&config).await?).await?),
    }
}

/// Build a chat client for one-off directory lookups.
async fn directory_client(config: &Config) -> Res<ChatClient> {
    kudos_bot::install_crypto_provider();

    ChatClient::slack(config).await
}

fn print_lines(lines: Vec<String>) -> Void {
    for line in lines {
        println!("{line}");
    }

    Ok(())
}
