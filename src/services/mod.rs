//! Service layer for the bot.
//!
//! This module contains the business logic for:
//! - Telegram Bot API access (`TelegramClient`)
//! - College page fetching (`HttpSource`)
//! - Substitutions and schedule rendering (`SubstitutionParser`, `ScheduleParser`)
//! - Update routing (`Router`) and execution (`Bot`)
//! - Reaction tallies (`ReactionStore`)

mod bot;
mod reactions;
mod router;
mod schedule;
mod source;
mod substitutions;
mod telegram;

pub use bot::{APOLOGY, Bot};
pub use reactions::ReactionStore;
pub use router::{Route, Router};
pub use schedule::ScheduleParser;
pub use source::{HttpSource, SourcePage};
pub use substitutions::{EMPTY_GLYPH, GroupFilter, SubstitutionParser, empty_message};
pub use telegram::{BotApi, OutgoingMessage, ParseMode, TelegramClient};
