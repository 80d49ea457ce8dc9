//! Pipeline entry points for bot operations.
//!
//! - `run_bot`: Poll updates, dispatch handlers, and watch the substitutions page
//! - `preview_substitutions`: Fetch and render the substitutions message once

pub mod dispatch;
pub mod poller;
pub mod watcher;

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{Bot, BotApi, GroupFilter, Router, SourcePage, SubstitutionParser};

pub use dispatch::run_dispatcher;
pub use poller::{PollOutcome, Poller};
pub use watcher::{ChangeWatcher, Snapshot, TickOutcome};

fn substitution_parser(config: &Config) -> Result<SubstitutionParser> {
    SubstitutionParser::new(
        GroupFilter::from_groups(&config.groups)?,
        &config.source.substitutions_url,
    )
}

/// Run the bot until the poller and dispatcher stop.
pub async fn run_bot(
    config: &Config,
    api: Arc<dyn BotApi>,
    source: Arc<dyn SourcePage>,
) -> Result<()> {
    let bot = Arc::new(Bot::new(
        Arc::clone(&api),
        Arc::clone(&source),
        substitution_parser(config)?,
        config.groups.clone(),
    )?);
    let router = Arc::new(Router::new(&config.routes, config.groups.clone()));
    log::info!(
        "Loaded {} route rules and {} groups",
        router.rule_count(),
        config.groups.len()
    );

    let (tx, rx) = mpsc::channel(config.telegram.queue_capacity);
    let mut tasks = vec![
        tokio::spawn(Poller::new(api, &config.telegram).run(tx)),
        tokio::spawn(run_dispatcher(rx, router, Arc::clone(&bot))),
    ];

    if config.watcher.target_chats.is_empty() {
        log::info!("No target chats configured, change watcher disabled");
    } else {
        let watcher = ChangeWatcher::new(source, bot, &config.watcher);
        tasks.push(tokio::spawn(watcher.run()));
    }

    for result in join_all(tasks).await {
        if let Err(e) = result {
            log::error!("Bot task failed: {}", e);
        }
    }
    Ok(())
}

/// Fetch the substitutions page and render it the way chats receive it.
pub async fn preview_substitutions(config: &Config, source: &dyn SourcePage) -> Result<String> {
    let page = source.fetch_substitutions().await?;
    substitution_parser(config)?.extract(&page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, substitutions_page};

    #[tokio::test]
    async fn test_preview_renders_fetched_page() {
        let source = FakeSource::new();
        source.push_page(substitutions_page(&[
            ["П-81", "2", "Math", "Cancelled", "101"],
            ["ІН-91", "3", "Art", "", ""],
        ]));

        let text = preview_substitutions(&Config::default(), &source)
            .await
            .unwrap();

        assert!(text.starts_with("Заміни на завтра"));
        assert!(text.contains("🎉 Cancelled"));
        assert!(!text.contains("Art"));
    }

    #[tokio::test]
    async fn test_preview_propagates_fetch_error() {
        let source = FakeSource::new();
        assert!(preview_substitutions(&Config::default(), &source)
            .await
            .unwrap_err()
            .is_transport());
    }
}
