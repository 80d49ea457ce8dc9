// src/services/bot.rs

//! Bot service: executes routes resolved by the [`Router`](super::Router).

use std::sync::Arc;

use crate::error::Result;
use crate::models::{
    CallbackEvent, Command, GroupInfo, InlineKeyboardButton, InlineKeyboardMarkup, MessageKey,
    ReactionCounts, ReactionKind, TextMessage,
};
use crate::services::{
    BotApi, OutgoingMessage, ParseMode, ReactionStore, Route, ScheduleParser, SourcePage,
    SubstitutionParser,
};

/// Reply sent when a page could not be fetched or parsed.
pub const APOLOGY: &str = "Ой, что-то пошло не так 😐";

const PICK_GROUP: &str = "Выбери свою группу 🧐";

/// Shared handler state. One instance serves every spawned handler task.
pub struct Bot {
    api: Arc<dyn BotApi>,
    source: Arc<dyn SourcePage>,
    parser: SubstitutionParser,
    schedule: ScheduleParser,
    reactions: ReactionStore,
    groups: Vec<GroupInfo>,
}

impl Bot {
    pub fn new(
        api: Arc<dyn BotApi>,
        source: Arc<dyn SourcePage>,
        parser: SubstitutionParser,
        groups: Vec<GroupInfo>,
    ) -> Result<Self> {
        Ok(Self {
            api,
            source,
            parser,
            schedule: ScheduleParser::new()?,
            reactions: ReactionStore::new(),
            groups,
        })
    }

    pub fn reactions(&self) -> &ReactionStore {
        &self.reactions
    }

    /// Execute a resolved route.
    pub async fn handle(&self, route: Route) -> Result<()> {
        match route {
            Route::Command(command, message) => self.run_command(command, &message).await,
            Route::Reaction(event, kind) => self.react(&event, kind).await,
            Route::GroupSchedule(event, group) => self.send_group_schedule(&event, &group).await,
        }
    }

    async fn run_command(&self, command: Command, message: &TextMessage) -> Result<()> {
        let chat_id = message.chat_id;
        let text = match command {
            Command::Substitutions => return self.send_substitutions(chat_id).await,
            Command::LessonsSchedule => return self.send_group_picker(chat_id).await,
            Command::ReplyToThanks if message.from.is_bot => return Ok(()),
            Command::ReplyToThanks => "Спасибом даже жопу не вытрешь 😠".to_string(),
            Command::Hello => format!("Привет, {} 🙂", message.from.first_name),
            Command::ThankYou => {
                format!("Спасибо {}, ты тоже ничего 🤗", message.from.first_name)
            }
            Command::Please => "Пожалуйста 😉".to_string(),
            Command::NoSleep => "Я не сплю, я думаю 🤔".to_string(),
            Command::WatchUpdates => "Хорошо 😊".to_string(),
            Command::ChatId => format!("Вот, держи {chat_id} 🙃"),
            Command::Offended => "А вот сейчас обидно было 😥".to_string(),
            Command::Thinking => "Думаем 🤔".to_string(),
            Command::GoodNight => "Спокойной ночи 😚".to_string(),
            Command::Sleeping => "Спим 😴".to_string(),
            Command::ChatInfo => format!("🤖 ID чата: {chat_id}"),
        };
        self.api
            .send_message(&OutgoingMessage::text(chat_id, text))
            .await
    }

    /// Fetch the substitutions page and send it to a chat.
    pub async fn send_substitutions(&self, chat_id: i64) -> Result<()> {
        match self.source.fetch_substitutions().await {
            Ok(page) => self.publish_substitutions(chat_id, &page).await,
            Err(e) => {
                log::warn!("Failed to fetch substitutions for chat {}: {}", chat_id, e);
                self.api
                    .send_message(&OutgoingMessage::text(chat_id, APOLOGY))
                    .await
            }
        }
    }

    /// Render an already fetched page and send it with an empty reaction keyboard.
    ///
    /// A page that fails to parse produces the apology instead, never a
    /// partial message.
    pub async fn publish_substitutions(&self, chat_id: i64, page: &[u8]) -> Result<()> {
        let message = match self.parser.extract(page) {
            Ok(text) => OutgoingMessage::text(chat_id, text)
                .markdown()
                .with_keyboard(ReactionCounts::default().keyboard()),
            Err(e) => {
                log::warn!("Failed to render substitutions for chat {}: {}", chat_id, e);
                OutgoingMessage::text(chat_id, APOLOGY)
            }
        };
        self.api.send_message(&message).await
    }

    async fn send_group_picker(&self, chat_id: i64) -> Result<()> {
        let buttons = self
            .groups
            .iter()
            .map(|group| InlineKeyboardButton::callback(&group.code, &group.callback))
            .collect();
        let message = OutgoingMessage::text(chat_id, PICK_GROUP)
            .markdown()
            .with_keyboard(InlineKeyboardMarkup::single_row(buttons));
        self.api.send_message(&message).await
    }

    async fn react(&self, event: &CallbackEvent, kind: ReactionKind) -> Result<()> {
        let key = MessageKey::new(event.chat_id, event.message_id);
        let counts = self.reactions.apply_reaction(key, event.from.id, kind);
        log::debug!(
            "Reaction {:?} by {} on {:?}, {} total",
            kind,
            event.from.id,
            key,
            counts.total()
        );

        // Telegram rejects an unchanged keyboard; the tap is still answered.
        if let Err(e) = self.api.edit_reply_markup(key, &counts.keyboard()).await {
            log::warn!("Failed to update reactions on {:?}: {}", key, e);
        }
        self.api
            .answer_callback_query(&event.query_id, &format!("You {} this.", kind.emoji()))
            .await
    }

    async fn send_group_schedule(&self, event: &CallbackEvent, group: &GroupInfo) -> Result<()> {
        let key = MessageKey::new(event.chat_id, event.message_id);
        let rendered = match self.source.fetch_schedule(&group.code).await {
            Ok(page) => self.schedule.render(&page, &group.code),
            Err(e) => Err(e),
        };

        match rendered {
            Ok(text) => {
                self.api
                    .edit_message_text(key, &text, Some(ParseMode::Markdown))
                    .await
            }
            Err(e) => {
                log::warn!("Failed to load schedule for {}: {}", group.code, e);
                self.api.edit_message_text(key, APOLOGY, None).await
            }
        }
    }
}
