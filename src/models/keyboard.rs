//! Inline keyboard markup sent with messages.

use serde::Serialize;

use crate::error::Result;

/// A button that sends `callback_data` back to the bot when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// `reply_markup` payload with rows of inline buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Keyboard with all buttons on one row.
    pub fn single_row(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }

    /// Serialize for the `reply_markup` form field.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_json_shape() {
        let markup = InlineKeyboardMarkup::single_row(vec![
            InlineKeyboardButton::callback("ЕІ-81", "group_ei81"),
            InlineKeyboardButton::callback("П-81", "group_p81"),
        ]);
        let value: serde_json::Value = serde_json::from_str(&markup.to_json().unwrap()).unwrap();

        let row = &value["inline_keyboard"][0];
        assert_eq!(value["inline_keyboard"].as_array().unwrap().len(), 1);
        assert_eq!(row[1]["text"], "П-81");
        assert_eq!(row[1]["callback_data"], "group_p81");
    }
}
