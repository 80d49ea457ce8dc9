//! Text commands and the rules that trigger them.

use serde::{Deserialize, Serialize};

/// Reply the bot gives to a matched text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Hello,
    Substitutions,
    LessonsSchedule,
    ThankYou,
    Please,
    NoSleep,
    WatchUpdates,
    ChatId,
    Offended,
    Thinking,
    GoodNight,
    Sleeping,
    ChatInfo,
    ReplyToThanks,
}

/// A text pattern bound to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Regular expression matched against the message text
    pub pattern: String,

    /// Command run on the first matching rule
    pub command: Command,
}

/// A student group the bot knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Group code as printed on the substitutions page (e.g., "П-81")
    pub code: String,

    /// Callback token of the group-selection button (e.g., "group_p81")
    pub callback: String,
}
