//! Inbound Telegram updates.
//!
//! The Bot API JSON is decoded into private `Raw*` structs and converted into
//! [`Update`], which only keeps what the bot acts on.

use serde::Deserialize;

/// Telegram user that sent a message or pressed a button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default)]
    pub is_bot: bool,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

/// One inbound event, identified by its `update_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawUpdate")]
pub struct Update {
    pub id: i64,
    pub payload: UpdatePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePayload {
    Text(TextMessage),
    Callback(CallbackEvent),
    /// Any update kind the bot does not handle (stickers, edits, joins...)
    Unsupported,
}

/// A text message in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub from: User,
    pub text: String,
}

/// An inline-keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub query_id: String,
    /// Chat of the message carrying the keyboard
    pub chat_id: i64,
    /// Message carrying the keyboard
    pub message_id: i64,
    pub from: User,
    pub data: String,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    message_id: i64,
    #[serde(default)]
    from: Option<User>,
    chat: RawChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCallbackQuery {
    id: String,
    from: User,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    callback_query: Option<RawCallbackQuery>,
}

impl From<RawUpdate> for Update {
    fn from(raw: RawUpdate) -> Self {
        let payload = if let Some(query) = raw.callback_query {
            match (query.message, query.data) {
                (Some(message), Some(data)) => UpdatePayload::Callback(CallbackEvent {
                    query_id: query.id,
                    chat_id: message.chat.id,
                    message_id: message.message_id,
                    from: query.from,
                    data,
                }),
                _ => UpdatePayload::Unsupported,
            }
        } else if let Some(message) = raw.message {
            match (message.from, message.text) {
                (Some(from), Some(text)) => UpdatePayload::Text(TextMessage {
                    message_id: message.message_id,
                    chat_id: message.chat.id,
                    from,
                    text,
                }),
                _ => UpdatePayload::Unsupported,
            }
        } else {
            UpdatePayload::Unsupported
        };

        Self {
            id: raw.update_id,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_message() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 104,
                "message": {
                    "message_id": 7,
                    "from": {"id": 11, "is_bot": false, "first_name": "Оля"},
                    "chat": {"id": -100500, "type": "group"},
                    "date": 1600000000,
                    "text": "!замены"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(update.id, 104);
        let UpdatePayload::Text(message) = update.payload else {
            panic!("expected text payload");
        };
        assert_eq!(message.chat_id, -100500);
        assert_eq!(message.from.first_name, "Оля");
        assert_eq!(message.text, "!замены");
    }

    #[test]
    fn test_decode_callback_query() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 105,
                "callback_query": {
                    "id": "4382",
                    "from": {"id": 12, "is_bot": false, "first_name": "Ivan"},
                    "message": {"message_id": 9, "chat": {"id": 33}, "text": "..."},
                    "chat_instance": "x",
                    "data": "reaction2"
                }
            }"#,
        )
        .unwrap();

        let UpdatePayload::Callback(event) = update.payload else {
            panic!("expected callback payload");
        };
        assert_eq!(event.query_id, "4382");
        assert_eq!(event.chat_id, 33);
        assert_eq!(event.message_id, 9);
        assert_eq!(event.data, "reaction2");
    }

    #[test]
    fn test_unknown_update_keeps_id() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 200, "edited_message": {"message_id": 1}}"#,
        )
        .unwrap();
        assert_eq!(update.id, 200);
        assert_eq!(update.payload, UpdatePayload::Unsupported);
    }

    #[test]
    fn test_message_without_text_is_unsupported() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 201,
                "message": {"message_id": 2, "from": {"id": 1}, "chat": {"id": 1}, "sticker": {}}
            }"#,
        )
        .unwrap();
        assert_eq!(update.payload, UpdatePayload::Unsupported);
    }
}
