//! In-memory reaction tallies for substitutions messages.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::models::{MessageKey, ReactionCounts, ReactionKind};

/// Per-message reactions: each user holds at most one reaction per message.
///
/// Uses `DashMap` so that updates to one message hold that entry's shard
/// lock for the whole read-aggregate-write, while other messages proceed
/// independently. Tallies live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct ReactionStore {
    tallies: DashMap<MessageKey, HashMap<i64, ReactionKind>>,
}

impl ReactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `user_id`'s reaction to a message and return the new counts.
    ///
    /// A repeated reaction by the same user replaces the previous one.
    pub fn apply_reaction(
        &self,
        message: MessageKey,
        user_id: i64,
        kind: ReactionKind,
    ) -> ReactionCounts {
        let mut tally = self.tallies.entry(message).or_default();
        tally.insert(user_id, kind);
        ReactionCounts::tally(tally.values())
    }

    /// Current counts for a message, if anyone reacted to it.
    pub fn counts(&self, message: MessageKey) -> Option<ReactionCounts> {
        self.tallies
            .get(&message)
            .map(|tally| ReactionCounts::tally(tally.values()))
    }

    /// Reaction currently held by a user on a message.
    pub fn reaction_of(&self, message: MessageKey, user_id: i64) -> Option<ReactionKind> {
        self.tallies
            .get(&message)
            .and_then(|tally| tally.get(&user_id).copied())
    }

    /// Number of messages with at least one reaction.
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}
