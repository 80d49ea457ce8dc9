// src/pipeline/watcher.rs

//! Substitutions page change watcher.
//!
//! Compares each fetch with the previous snapshot byte for byte and, when
//! they differ, sends the freshly rendered message to every target chat.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::WatcherConfig;
use crate::services::{Bot, SourcePage};
use crate::utils::short_digest;

/// Last successfully fetched page.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub bytes: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            fetched_at: Utc::now(),
        }
    }

    pub fn digest(&self) -> String {
        short_digest(&self.bytes)
    }
}

/// Result of one watcher tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// First snapshot taken, nothing compared
    Seeded,
    Unchanged,
    /// Page changed; `notified` chats received the new message
    Changed { notified: usize },
}

pub struct ChangeWatcher {
    source: Arc<dyn SourcePage>,
    bot: Arc<Bot>,
    targets: Vec<i64>,
    interval: Duration,
    send_delay: Duration,
    snapshot: Option<Snapshot>,
}

impl ChangeWatcher {
    pub fn new(source: Arc<dyn SourcePage>, bot: Arc<Bot>, config: &WatcherConfig) -> Self {
        Self {
            source,
            bot,
            targets: config.target_chats.clone(),
            interval: config.interval(),
            send_delay: config.send_delay(),
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Fetch once and notify on change.
    ///
    /// A failed fetch keeps the previous snapshot. A successful one always
    /// replaces it, even when some notifications fail.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let current = Snapshot::new(self.source.fetch_substitutions().await?);

        let outcome = match &self.snapshot {
            None => TickOutcome::Seeded,
            Some(previous) if previous.bytes == current.bytes => TickOutcome::Unchanged,
            Some(previous) => {
                log::info!(
                    "Substitutions changed ({} -> {}), notifying {} chats",
                    previous.digest(),
                    current.digest(),
                    self.targets.len()
                );
                let notified = self.notify(&current.bytes).await;
                TickOutcome::Changed { notified }
            }
        };

        self.snapshot = Some(current);
        Ok(outcome)
    }

    async fn notify(&self, page: &[u8]) -> usize {
        let mut notified = 0;
        for (i, &chat_id) in self.targets.iter().enumerate() {
            if i > 0 && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
            match self.bot.publish_substitutions(chat_id, page).await {
                Ok(()) => notified += 1,
                Err(e) => log::warn!("Failed to notify chat {}: {}", chat_id, e),
            }
        }
        notified
    }

    /// Tick forever at the configured interval.
    pub async fn run(mut self) {
        log::info!(
            "Watching substitutions every {:?} for {} chats",
            self.interval,
            self.targets.len()
        );
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.tick().await {
                Ok(TickOutcome::Seeded) => {
                    if let Some(snapshot) = &self.snapshot {
                        log::info!(
                            "Seeded snapshot {} at {}",
                            snapshot.digest(),
                            snapshot.fetched_at
                        );
                    }
                }
                Ok(TickOutcome::Unchanged) => log::debug!("Substitutions unchanged"),
                Ok(TickOutcome::Changed { notified }) => {
                    log::info!("Notified {}/{} chats", notified, self.targets.len());
                }
                Err(e) => log::warn!("Failed to fetch substitutions: {}", e),
            }
        }
    }
}
