// src/config.rs

//! Configuration loading utilities.
//!
//! Reads the TOML file and layers the environment on top of it:
//! `TOKEN` sets the bot token and `CHAT_ID` (comma-separated) replaces the
//! watcher's target chats.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

pub const TOKEN_VAR: &str = "TOKEN";
pub const CHAT_ID_VAR: &str = "CHAT_ID";

/// Load the config file (defaults when absent), apply the environment and
/// validate the result.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    apply_overrides(&mut config, |name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

/// Apply `TOKEN` and `CHAT_ID` from `lookup`.
///
/// Chat ids that do not parse are skipped with a warning. An unset or blank
/// variable leaves the file value alone.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty()) {
        config.telegram.token = Some(token.trim().to_string());
    }

    if let Some(raw) = lookup(CHAT_ID_VAR).filter(|v| !v.trim().is_empty()) {
        config.watcher.target_chats = parse_chat_ids(&raw);
    }
}

/// Parse a comma-separated chat id list.
pub fn parse_chat_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Ignoring invalid chat id '{}': {}", part, e);
                None
            }
        })
        .collect()
}

/// Bot token, required to talk to the Bot API.
pub fn resolve_token(config: &Config) -> Result<String> {
    config.telegram.token.clone().ok_or_else(|| {
        AppError::config(format!(
            "bot token missing: set {TOKEN_VAR} or telegram.token"
        ))
    })
}
