//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{GroupInfo, RouteRule};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Substitutions and schedule pages
    #[serde(default)]
    pub source: SourceConfig,

    /// Background change watcher
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Student groups the bot reports on
    #[serde(default = "defaults::groups")]
    pub groups: Vec<GroupInfo>,

    /// Text patterns and the commands they trigger, in priority order
    #[serde(default = "defaults::routes")]
    pub routes: Vec<RouteRule>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.api_base.trim().is_empty() {
            return Err(AppError::validation("telegram.api_base is empty"));
        }
        url::Url::parse(&self.telegram.api_base)?;
        if self.telegram.poll_interval_ms == 0 {
            return Err(AppError::validation(
                "telegram.poll_interval_ms must be > 0",
            ));
        }
        if self.telegram.request_timeout_secs <= self.telegram.poll_timeout_secs {
            return Err(AppError::validation(
                "telegram.request_timeout_secs must exceed telegram.poll_timeout_secs",
            ));
        }
        if self.telegram.queue_capacity == 0 {
            return Err(AppError::validation("telegram.queue_capacity must be > 0"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.substitutions_url)?;
        url::Url::parse(&self.source.schedule_url)?;
        if self.watcher.interval_secs == 0 {
            return Err(AppError::validation("watcher.interval_secs must be > 0"));
        }
        if self.groups.is_empty() {
            return Err(AppError::validation("No groups defined"));
        }
        for group in &self.groups {
            if group.code.trim().is_empty() {
                return Err(AppError::validation("Group code is empty"));
            }
            if !group.callback.contains("group") {
                return Err(AppError::validation(format!(
                    "Callback token '{}' for group {} must contain \"group\"",
                    group.callback, group.code
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            source: SourceConfig::default(),
            watcher: WatcherConfig::default(),
            groups: defaults::groups(),
            routes: defaults::routes(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; the `TOKEN` environment variable takes precedence
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Base URL of the Bot API
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Pause between two `getUpdates` calls in milliseconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Long-poll `timeout` parameter passed to `getUpdates`
    #[serde(default = "defaults::poll_timeout")]
    pub poll_timeout_secs: u64,

    /// HTTP timeout for Bot API calls
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Capacity of the poller → dispatcher queue
    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,
}

impl TelegramConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: defaults::api_base(),
            poll_interval_ms: defaults::poll_interval(),
            poll_timeout_secs: defaults::poll_timeout(),
            request_timeout_secs: defaults::request_timeout(),
            queue_capacity: defaults::queue_capacity(),
        }
    }
}

/// Pages scraped by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page listing lesson and classroom substitutions
    #[serde(default = "defaults::substitutions_url")]
    pub substitutions_url: String,

    /// Endpoint returning the lesson schedule for a posted group name
    #[serde(default = "defaults::schedule_url")]
    pub schedule_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            substitutions_url: defaults::substitutions_url(),
            schedule_url: defaults::schedule_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Change watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Seconds between two page fetches
    #[serde(default = "defaults::watch_interval")]
    pub interval_secs: u64,

    /// Pause between notifications to different chats
    #[serde(default = "defaults::send_delay")]
    pub send_delay_ms: u64,

    /// Chats notified when the page changes; `CHAT_ID` overrides
    #[serde(default)]
    pub target_chats: Vec<i64>,
}

impl WatcherConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::watch_interval(),
            send_delay_ms: defaults::send_delay(),
            target_chats: Vec::new(),
        }
    }
}

mod defaults {
    use crate::models::{Command, GroupInfo, RouteRule};

    // Telegram defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn poll_interval() -> u64 {
        1000
    }
    pub fn poll_timeout() -> u64 {
        1
    }
    pub fn request_timeout() -> u64 {
        30
    }
    pub fn queue_capacity() -> usize {
        64
    }

    // Source defaults
    pub fn substitutions_url() -> String {
        "http://ki.sumdu.edu.ua/zamen/mes_inst.html".into()
    }
    pub fn schedule_url() -> String {
        "https://ki.sumdu.edu.ua/?p=612".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bratishka/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Watcher defaults
    pub fn watch_interval() -> u64 {
        300
    }
    pub fn send_delay() -> u64 {
        1000
    }

    pub fn groups() -> Vec<GroupInfo> {
        vec![
            GroupInfo {
                code: "ЕІ-81".to_string(),
                callback: "group_ei81".to_string(),
            },
            GroupInfo {
                code: "П-81".to_string(),
                callback: "group_p81".to_string(),
            },
        ]
    }

    pub fn routes() -> Vec<RouteRule> {
        [
            (r"^/start$", Command::Hello),
            (r"(?i)Братишка.*подскажи замены", Command::Substitutions),
            (r"(?i)!замены", Command::Substitutions),
            (r"(?i)!пары", Command::LessonsSchedule),
            (r"(?i)Молодец.*братишка", Command::ThankYou),
            (r"(?i)Спасибо.*братишка", Command::Please),
            (r"(?i)Привет.*братишка", Command::Hello),
            (r"(?i)Братишка.*привет", Command::Hello),
            (r"(?i)Братишка.*спишь?", Command::NoSleep),
            (
                r"(?i)Братишка.*сообщи когда появятся замены",
                Command::WatchUpdates,
            ),
            (r"(?i)Братишка.*ID", Command::ChatId),
            (r"(?i)Плохой.*братишка", Command::Offended),
            (r"(?i)Что вы\?", Command::Thinking),
            (r"(?i)Спокойной ночи", Command::GoodNight),
            (r"(?i)Спите\?", Command::Sleeping),
            (r"(?i)!чат", Command::ChatInfo),
            (r"(?i)Спасибо", Command::ReplyToThanks),
        ]
        .into_iter()
        .map(|(pattern, command)| RouteRule {
            pattern: pattern.to_string(),
            command,
        })
        .collect()
    }
}
