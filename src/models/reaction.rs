//! Reaction kinds and their aggregate counts.

use crate::models::{InlineKeyboardButton, InlineKeyboardMarkup};

/// One of the three reactions offered under a substitutions message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReactionKind {
    Love,
    Thinking,
    Poop,
}

impl ReactionKind {
    /// All kinds in keyboard order.
    pub const ALL: [ReactionKind; 3] = [Self::Love, Self::Thinking, Self::Poop];

    /// Callback token carried by the keyboard button.
    pub fn token(self) -> &'static str {
        match self {
            Self::Love => "reaction1",
            Self::Thinking => "reaction2",
            Self::Poop => "reaction3",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Love => "😍",
            Self::Thinking => "🤔",
            Self::Poop => "💩",
        }
    }

    /// Parse a callback token; unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    fn index(self) -> usize {
        match self {
            Self::Love => 0,
            Self::Thinking => 1,
            Self::Poop => 2,
        }
    }
}

/// Number of users currently holding each reaction on a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    counts: [usize; 3],
}

impl ReactionCounts {
    /// Count reactions by kind.
    pub fn tally<'a>(reactions: impl IntoIterator<Item = &'a ReactionKind>) -> Self {
        let mut counts = Self::default();
        for kind in reactions {
            counts.counts[kind.index()] += 1;
        }
        counts
    }

    pub fn get(&self, kind: ReactionKind) -> usize {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Render the reaction keyboard: emoji alone at zero, emoji and count otherwise.
    pub fn keyboard(&self) -> InlineKeyboardMarkup {
        let buttons = ReactionKind::ALL
            .into_iter()
            .map(|kind| {
                let label = match self.get(kind) {
                    0 => kind.emoji().to_string(),
                    count => format!("{} {}", kind.emoji(), count),
                };
                InlineKeyboardButton::callback(label, kind.token())
            })
            .collect();
        InlineKeyboardMarkup::single_row(buttons)
    }
}
