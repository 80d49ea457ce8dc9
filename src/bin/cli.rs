//! Bratishka CLI
//!
//! Local execution entry point for the substitutions bot.

use std::path::PathBuf;
use std::sync::Arc;

use bratishka::{
    config,
    error::Result,
    pipeline,
    services::{HttpSource, TelegramClient},
};
use clap::{Parser, Subcommand};

/// Bratishka - lesson substitutions bot
#[derive(Parser, Debug)]
#[command(
    name = "bratishka",
    version,
    about = "Telegram bot that reports lesson substitutions"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll for updates and watch the substitutions page (default)
    Run,

    /// Validate configuration
    Validate,

    /// Fetch the substitutions page and print the rendered message
    Preview,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(&cli.config)?;
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let token = config::resolve_token(&config)?;
            let api = Arc::new(TelegramClient::new(&config.telegram, &token)?);
            let source = Arc::new(HttpSource::new(&config.source)?);

            log::info!("Bratishka starting...");
            pipeline::run_bot(&config, api, source).await?;
        }

        Command::Validate => {
            // load_config already validated the file
            log::info!(
                "✓ Config OK ({} groups, {} routes)",
                config.groups.len(),
                config.routes.len()
            );
            match &config.telegram.token {
                Some(_) => log::info!("✓ Bot token present"),
                None => log::warn!(
                    "Bot token missing; set {} before `run`",
                    config::TOKEN_VAR
                ),
            }
            if config.watcher.target_chats.is_empty() {
                log::info!("No target chats; change watcher will stay off");
            } else {
                log::info!("Watching for chats {:?}", config.watcher.target_chats);
            }
        }

        Command::Preview => {
            let source = HttpSource::new(&config.source)?;
            let message = pipeline::preview_substitutions(&config, &source).await?;
            println!("{message}");
        }
    }

    Ok(())
}
