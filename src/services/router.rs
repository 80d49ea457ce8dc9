//! Update router.
//!
//! Resolves an [`Update`] into a [`Route`] without performing any side
//! effect. Text messages are matched against the rule list in order and the
//! first match wins; callback payloads are classified by the `reaction` and
//! `group` discriminators.

use regex::Regex;

use crate::models::{
    CallbackEvent, Command, GroupInfo, ReactionKind, RouteRule, TextMessage, Update,
    UpdatePayload,
};

const REACTION_DISCRIMINATOR: &str = "reaction";
const GROUP_DISCRIMINATOR: &str = "group";

/// What the bot should do with an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Run a text command for a message
    Command(Command, TextMessage),
    /// Record a reaction pressed under a message
    Reaction(CallbackEvent, ReactionKind),
    /// Show the schedule of the selected group
    GroupSchedule(CallbackEvent, GroupInfo),
}

/// Ordered pattern table plus the known groups.
pub struct Router {
    rules: Vec<(Regex, Command)>,
    groups: Vec<GroupInfo>,
}

impl Router {
    /// Compile the rule list. A pattern that fails to compile is skipped
    /// with a warning; the remaining rules keep their relative order.
    pub fn new(rules: &[RouteRule], groups: Vec<GroupInfo>) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) => Some((regex, rule.command)),
                Err(e) => {
                    log::warn!("Skipping route pattern '{}': {}", rule.pattern, e);
                    None
                }
            })
            .collect();
        Self { rules, groups }
    }

    /// Number of usable rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolve an update; `None` means nothing to do.
    pub fn route(&self, update: Update) -> Option<Route> {
        match update.payload {
            UpdatePayload::Text(message) => self
                .match_text(&message.text)
                .map(|command| Route::Command(command, message)),
            UpdatePayload::Callback(event) => self.route_callback(event),
            UpdatePayload::Unsupported => None,
        }
    }

    /// First command whose pattern matches `text`.
    pub fn match_text(&self, text: &str) -> Option<Command> {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(text))
            .map(|(_, command)| *command)
    }

    fn route_callback(&self, event: CallbackEvent) -> Option<Route> {
        if event.data.contains(REACTION_DISCRIMINATOR) {
            let Some(kind) = ReactionKind::from_token(&event.data) else {
                log::debug!("Ignoring unknown reaction token '{}'", event.data);
                return None;
            };
            Some(Route::Reaction(event, kind))
        } else if event.data.contains(GROUP_DISCRIMINATOR) {
            let Some(group) = self.groups.iter().find(|g| g.callback == event.data) else {
                log::debug!("Ignoring unknown group token '{}'", event.data);
                return None;
            };
            let group = group.clone();
            Some(Route::GroupSchedule(event, group))
        } else {
            None
        }
    }
}
