// src/pipeline/poller.rs

//! Long-poll update loop.
//!
//! Owns the update cursor. A batch is handed to the dispatcher queue in
//! delivery order, and the cursor moves past it only once every update in the
//! batch has been queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::models::{TelegramConfig, Update};
use crate::services::BotApi;

/// Cursor before any update has been observed.
pub const INITIAL_CURSOR: i64 = 0;

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Backlog from before startup, dropped without delivery
    Skipped { count: usize },
    /// Updates handed to the queue
    Delivered { count: usize },
    /// Nothing new
    Empty,
}

pub struct Poller {
    api: Arc<dyn BotApi>,
    cursor: i64,
    interval: Duration,
    timeout_secs: u64,
}

impl Poller {
    pub fn new(api: Arc<dyn BotApi>, config: &TelegramConfig) -> Self {
        Self {
            api,
            cursor: INITIAL_CURSOR,
            interval: config.poll_interval(),
            timeout_secs: config.poll_timeout_secs,
        }
    }

    /// Next update id to request.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Fetch one batch and hand it off.
    ///
    /// On any error the cursor is left where it was, so the same batch is
    /// requested again on the next call.
    pub async fn poll_once(&mut self, tx: &mpsc::Sender<Update>) -> Result<PollOutcome> {
        let updates = self.api.get_updates(self.cursor, self.timeout_secs).await?;
        let Some(next) = updates.iter().map(|u| u.id + 1).max() else {
            return Ok(PollOutcome::Empty);
        };
        let count = updates.len();

        if self.cursor == INITIAL_CURSOR {
            self.cursor = next;
            log::info!("Skipped {} pending updates, cursor at {}", count, next);
            return Ok(PollOutcome::Skipped { count });
        }

        for update in updates {
            tx.send(update).await.map_err(|_| AppError::ChannelClosed)?;
        }
        self.cursor = self.cursor.max(next);
        Ok(PollOutcome::Delivered { count })
    }

    /// Poll until the dispatcher goes away.
    pub async fn run(mut self, tx: mpsc::Sender<Update>) {
        log::info!("Polling for updates every {:?}", self.interval);
        loop {
            match self.poll_once(&tx).await {
                Ok(PollOutcome::Delivered { count }) => {
                    log::debug!("Delivered {} updates, cursor at {}", count, self.cursor);
                }
                Ok(_) => {}
                Err(AppError::ChannelClosed) => {
                    log::info!("Update queue closed, poller stopping at {}", self.cursor);
                    break;
                }
                Err(e) => log::warn!("Failed to poll updates: {}", e),
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    fn poller(api: &Arc<FakeApi>) -> Poller {
        Poller::new(api.clone(), &TelegramConfig::default())
    }

    fn drain(rx: &mut mpsc::Receiver<Update>) -> Vec<i64> {
        let mut ids = Vec::new();
        while let Ok(update) = rx.try_recv() {
            ids.push(update.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_catch_up_then_deliver() {
        let api = Arc::new(FakeApi::new());
        api.push_batch(&[101, 102, 103]);
        api.push_batch(&[104, 105]);
        let mut poller = poller(&api);
        let (tx, mut rx) = mpsc::channel(8);

        let first = poller.poll_once(&tx).await.unwrap();
        assert_eq!(first, PollOutcome::Skipped { count: 3 });
        assert_eq!(poller.cursor(), 104);
        assert!(drain(&mut rx).is_empty());

        let second = poller.poll_once(&tx).await.unwrap();
        assert_eq!(second, PollOutcome::Delivered { count: 2 });
        assert_eq!(poller.cursor(), 106);
        assert_eq!(drain(&mut rx), vec![104, 105]);

        assert_eq!(api.offsets(), vec![0, 104]);
    }

    #[tokio::test]
    async fn test_empty_batch_keeps_sentinel() {
        let api = Arc::new(FakeApi::new());
        api.push_batch(&[]);
        api.push_batch(&[7]);
        let mut poller = poller(&api);
        let (tx, mut rx) = mpsc::channel(8);

        assert_eq!(poller.poll_once(&tx).await.unwrap(), PollOutcome::Empty);
        assert_eq!(poller.cursor(), INITIAL_CURSOR);

        // First non-empty batch is still treated as backlog.
        assert_eq!(
            poller.poll_once(&tx).await.unwrap(),
            PollOutcome::Skipped { count: 1 }
        );
        assert_eq!(poller.cursor(), 8);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_advance_cursor() {
        let api = Arc::new(FakeApi::new());
        api.push_batch(&[10]);
        api.push_failure();
        api.push_batch(&[11, 12]);
        let mut poller = poller(&api);
        let (tx, mut rx) = mpsc::channel(8);

        poller.poll_once(&tx).await.unwrap();
        assert!(poller.poll_once(&tx).await.is_err());
        assert_eq!(poller.cursor(), 11);

        poller.poll_once(&tx).await.unwrap();
        assert_eq!(drain(&mut rx), vec![11, 12]);
        assert_eq!(api.offsets(), vec![0, 11, 11]);
    }

    #[tokio::test]
    async fn test_closed_queue_keeps_cursor() {
        let api = Arc::new(FakeApi::new());
        api.push_batch(&[1]);
        api.push_batch(&[2, 3]);
        let mut poller = poller(&api);
        let (tx, rx) = mpsc::channel(8);

        poller.poll_once(&tx).await.unwrap();
        drop(rx);

        let err = poller.poll_once(&tx).await.unwrap_err();
        assert!(matches!(err, AppError::ChannelClosed));
        assert_eq!(poller.cursor(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_when_queue_closes() {
        let api = Arc::new(FakeApi::new());
        api.push_batch(&[1]);
        api.push_batch(&[2]);
        let config = TelegramConfig {
            poll_interval_ms: 0,
            ..TelegramConfig::default()
        };
        let poller = Poller::new(api.clone(), &config);
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        tokio::time::timeout(Duration::from_secs(5), poller.run(tx))
            .await
            .unwrap();
        assert_eq!(api.offsets(), vec![0, 2]);
    }
}
