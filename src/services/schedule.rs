//! Lesson schedule parser for the group-selection flow.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::utils::{element_text, parse_selector};

/// Emoji per schedule column: subject, lecturer, room, time, date.
const COLUMN_EMOJI: [&str; 5] = ["📚", "👩‍🎓", "🚪", "⏰", "📆"];

pub struct ScheduleParser {
    row_sel: Selector,
    cell_sel: Selector,
}

impl ScheduleParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row_sel: parse_selector(".post table tr")?,
            cell_sel: parse_selector("td")?,
        })
    }

    /// Render the schedule page of `group` as a Markdown message.
    ///
    /// The title and the first row are set in bold.
    pub fn render(&self, html: &[u8], group: &str) -> Result<String> {
        let text = std::str::from_utf8(html)
            .map_err(|e| AppError::extraction(format!("schedule is not valid UTF-8: {e}")))?;
        let document = Html::parse_document(text);

        let blocks: Vec<String> = document
            .select(&self.row_sel)
            .map(|row| {
                row.select(&self.cell_sel)
                    .map(|cell| element_text(&cell))
                    .enumerate()
                    .filter(|(_, text)| !text.is_empty())
                    .map(|(i, text)| match COLUMN_EMOJI.get(i) {
                        Some(emoji) => format!("{emoji} {text}"),
                        None => text,
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|block| !block.is_empty())
            .collect();

        let Some((first, rest)) = blocks.split_first() else {
            return Err(AppError::extraction(format!(
                "no schedule rows found for group {group}"
            )));
        };

        let mut message = format!("*Розклад занять для групи {group} 🥳\n\n{first}*");
        for block in rest {
            message.push_str("\n\n");
            message.push_str(block);
        }
        Ok(message)
    }
}
