//! Test fixtures: update builders and in-memory fakes of the transports.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::{
    CallbackEvent, InlineKeyboardMarkup, MessageKey, TextMessage, Update, UpdatePayload, User,
};
use crate::services::{BotApi, OutgoingMessage, ParseMode, SourcePage};

pub fn user(id: i64, first_name: &str) -> User {
    User {
        id,
        is_bot: false,
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
    }
}

pub fn text_update(id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        id,
        payload: UpdatePayload::Text(TextMessage {
            message_id: id * 10,
            chat_id,
            from: user(1, "Оля"),
            text: text.to_string(),
        }),
    }
}

pub fn callback_update(id: i64, chat_id: i64, message_id: i64, data: &str) -> Update {
    Update {
        id,
        payload: UpdatePayload::Callback(callback(chat_id, message_id, 1, data)),
    }
}

pub fn callback(chat_id: i64, message_id: i64, user_id: i64, data: &str) -> CallbackEvent {
    CallbackEvent {
        query_id: format!("q{user_id}"),
        chat_id,
        message_id,
        from: user(user_id, "Ivan"),
        data: data.to_string(),
    }
}

fn unavailable(context: &str) -> AppError {
    AppError::Status {
        context: context.to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Call recorded by [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message(OutgoingMessage),
    EditText {
        key: MessageKey,
        text: String,
        parse_mode: Option<ParseMode>,
    },
    EditMarkup {
        key: MessageKey,
        markup: InlineKeyboardMarkup,
    },
    Answer {
        query_id: String,
        text: String,
    },
}

/// Bot API fake: serves queued `getUpdates` batches and records every call.
#[derive(Default)]
pub struct FakeApi {
    batches: Mutex<VecDeque<Result<Vec<Update>>>>,
    offsets: Mutex<Vec<i64>>,
    sent: Mutex<Vec<Sent>>,
    reject_markup_edits: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&self, ids: &[i64]) {
        let updates = ids.iter().map(|&id| text_update(id, 1, "hello")).collect();
        self.batches.lock().unwrap().push_back(Ok(updates));
    }

    pub fn push_updates(&self, updates: Vec<Update>) {
        self.batches.lock().unwrap().push_back(Ok(updates));
    }

    /// Make `editMessageReplyMarkup` fail like Telegram does for an
    /// unchanged keyboard.
    pub fn reject_markup_edits(&self) {
        self.reject_markup_edits.store(true, Ordering::SeqCst);
    }

    pub fn push_failure(&self) {
        self.batches
            .lock()
            .unwrap()
            .push_back(Err(unavailable("getUpdates")));
    }

    /// Offsets passed to `getUpdates`, in call order.
    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter_map(|call| match call {
                Sent::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Sent) {
        self.sent.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BotApi for FakeApi {
    async fn get_updates(&self, offset: i64, _timeout_secs: u64) -> Result<Vec<Update>> {
        self.offsets.lock().unwrap().push(offset);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<()> {
        self.record(Sent::Message(message.clone()));
        Ok(())
    }

    async fn edit_message_text(
        &self,
        key: MessageKey,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        self.record(Sent::EditText {
            key,
            text: text.to_string(),
            parse_mode,
        });
        Ok(())
    }

    async fn edit_reply_markup(
        &self,
        key: MessageKey,
        markup: &InlineKeyboardMarkup,
    ) -> Result<()> {
        if self.reject_markup_edits.load(Ordering::SeqCst) {
            return Err(AppError::api(
                "editMessageReplyMarkup",
                "Bad Request: message is not modified",
            ));
        }
        self.record(Sent::EditMarkup {
            key,
            markup: markup.clone(),
        });
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str, text: &str) -> Result<()> {
        self.record(Sent::Answer {
            query_id: query_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Source fake: serves queued pages; an exhausted queue fails like a 503.
#[derive(Default)]
pub struct FakeSource {
    pages: Mutex<VecDeque<Result<Vec<u8>>>>,
    schedule: Mutex<Option<Vec<u8>>>,
    schedule_requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: impl Into<Vec<u8>>) {
        self.pages.lock().unwrap().push_back(Ok(page.into()));
    }

    pub fn push_failure(&self) {
        self.pages
            .lock()
            .unwrap()
            .push_back(Err(unavailable("substitutions")));
    }

    pub fn set_schedule(&self, page: impl Into<Vec<u8>>) {
        *self.schedule.lock().unwrap() = Some(page.into());
    }

    pub fn schedule_requests(&self) -> Vec<String> {
        self.schedule_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourcePage for FakeSource {
    async fn fetch_substitutions(&self) -> Result<Vec<u8>> {
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable("substitutions")))
    }

    async fn fetch_schedule(&self, group: &str) -> Result<Vec<u8>> {
        self.schedule_requests
            .lock()
            .unwrap()
            .push(group.to_string());
        self.schedule
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unavailable("schedule"))
    }
}

/// Minimal substitutions page with one lesson table.
pub fn substitutions_page(rows: &[[&str; 5]]) -> Vec<u8> {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(
        "<html><body><div><p>Заміни на завтра</p><table>\
         <tr><td>Група</td><td>Пара</td><td>Предмет</td><td>Заміна</td><td>Аудиторія</td></tr>\
         {rows}</table></div></body></html>"
    )
    .into_bytes()
}
