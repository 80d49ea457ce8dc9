// src/models/mod.rs

//! Domain models for the bot.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod command;
mod config;
mod keyboard;
mod reaction;
mod update;

// Re-export all public types
pub use command::{Command, GroupInfo, RouteRule};
pub use config::{Config, SourceConfig, TelegramConfig, WatcherConfig};
pub use keyboard::{InlineKeyboardButton, InlineKeyboardMarkup};
pub use reaction::{ReactionCounts, ReactionKind};
pub use update::{CallbackEvent, TextMessage, Update, UpdatePayload, User};

/// Identifies a message the bot sent: message ids are only unique per chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub chat_id: i64,
    pub message_id: i64,
}

impl MessageKey {
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}
