// src/services/telegram.rs

//! Telegram Bot API transport.
//!
//! [`BotApi`] is the seam between the bot logic and the network; the
//! production implementation is [`TelegramClient`], which posts form-encoded
//! requests to `<api_base>/bot<TOKEN>/<method>`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{InlineKeyboardMarkup, MessageKey, TelegramConfig, Update};
use crate::utils::http::create_async_client;

/// Text formatting mode of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
        }
    }
}

/// A message to send to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }

    pub fn with_keyboard(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Operations the bot needs from the messaging platform.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Fetch pending updates starting at `offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>>;

    async fn send_message(&self, message: &OutgoingMessage) -> Result<()>;

    async fn edit_message_text(
        &self,
        key: MessageKey,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;

    async fn edit_reply_markup(
        &self,
        key: MessageKey,
        markup: &InlineKeyboardMarkup,
    ) -> Result<()>;

    async fn answer_callback_query(&self, query_id: &str, text: &str) -> Result<()>;
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client over HTTPS.
pub struct TelegramClient {
    client: Client,
    base: Url,
}

impl TelegramClient {
    /// Create a client for the given bot token.
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let client = create_async_client(
            concat!("bratishka/", env!("CARGO_PKG_VERSION")),
            config.request_timeout_secs,
        )?;
        let base = Url::parse(&format!(
            "{}/bot{}/",
            config.api_base.trim_end_matches('/'),
            token
        ))?;
        Ok(Self { client, base })
    }

    /// Call a Bot API method with form parameters.
    ///
    /// Request URLs carry the bot token, so they are stripped from transport
    /// errors before those reach the logs.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.base.join(method)?;
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(AppError::Status {
                    context: method.to_string(),
                    status,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP status {status}"));
            return Err(AppError::api(method, description));
        }
        envelope
            .result
            .ok_or_else(|| AppError::api(method, "response has no result"))
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ],
        )
        .await
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<()> {
        let mut params = vec![
            ("chat_id", message.chat_id.to_string()),
            ("text", message.text.clone()),
        ];
        if let Some(mode) = message.parse_mode {
            params.push(("parse_mode", mode.as_str().to_string()));
        }
        if let Some(markup) = &message.reply_markup {
            params.push(("reply_markup", markup.to_json()?));
        }
        self.call::<IgnoredAny>("sendMessage", &params).await?;
        Ok(())
    }

    async fn edit_message_text(
        &self,
        key: MessageKey,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let mut params = vec![
            ("chat_id", key.chat_id.to_string()),
            ("message_id", key.message_id.to_string()),
            ("text", text.to_string()),
        ];
        if let Some(mode) = parse_mode {
            params.push(("parse_mode", mode.as_str().to_string()));
        }
        self.call::<IgnoredAny>("editMessageText", &params).await?;
        Ok(())
    }

    async fn edit_reply_markup(
        &self,
        key: MessageKey,
        markup: &InlineKeyboardMarkup,
    ) -> Result<()> {
        let params = [
            ("chat_id", key.chat_id.to_string()),
            ("message_id", key.message_id.to_string()),
            ("reply_markup", markup.to_json()?),
        ];
        self.call::<IgnoredAny>("editMessageReplyMarkup", &params).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str, text: &str) -> Result<()> {
        let params = [
            ("callback_query_id", query_id.to_string()),
            ("text", text.to_string()),
        ];
        self.call::<IgnoredAny>("answerCallbackQuery", &params).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_urls_keep_token_path() {
        let client = TelegramClient::new(&TelegramConfig::default(), "123:abc").unwrap();
        assert_eq!(
            client.base.join("getUpdates").unwrap().as_str(),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_envelope_decodes_failure() {
        let envelope: ApiResponse<IgnoredAny> = serde_json::from_str(
            r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_envelope_decodes_updates() {
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_str(
            r#"{"ok": true, "result": [{"update_id": 5}, {"update_id": 6}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = envelope.result.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[test]
    fn test_outgoing_message_builder() {
        let message = OutgoingMessage::text(1, "hi").markdown();
        assert_eq!(message.parse_mode, Some(ParseMode::Markdown));
        assert!(message.reply_markup.is_none());
    }
}
