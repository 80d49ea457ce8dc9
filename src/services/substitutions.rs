// src/services/substitutions.rs

//! Substitutions page parser.
//!
//! Turns the college substitutions page into a Telegram message:
//!
//! ```text
//! <header paragraph>
//!
//! <column titles>
//!
//! <one block per lesson substitution of a known group>
//!
//! Заміна аудиторій 🎈        (only when classroom rows survive)
//!
//! <one block per classroom substitution>
//!
//! [Переглянути на сайті 🦄](<page url>)
//! ```

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::GroupInfo;
use crate::utils::{element_text, parse_selector};

/// Glyph shown instead of an empty substitutions list.
pub const EMPTY_GLYPH: &str = "(•ω•)⊃──☆ﾟ.･❁｡ﾟ✧";

const NO_CHANGES: &str = "Немає замін 🙂";
const CLASSROOM_TITLE: &str = "Заміна аудиторій 🎈";

/// Emoji and title of each lesson table column.
const COLUMNS: [(&str, &str); 5] = [
    ("👩‍🎓", "Група"),
    ("⏰", "Пара"),
    ("📚", "Предмет"),
    ("🎉", "Заміна"),
    ("🚪", "Аудиторія"),
];

/// Classroom table columns, as indices into [`COLUMNS`].
const CLASSROOM_COLUMNS: [usize; 3] = [0, 1, 4];

/// Message rendered when no lesson rows survive the group filter.
pub fn empty_message() -> String {
    format!("{EMPTY_GLYPH}\n{NO_CHANGES}")
}

/// Row filter: keeps rows whose first cell names a known group.
#[derive(Debug, Clone)]
pub struct GroupFilter {
    pattern: Regex,
}

impl GroupFilter {
    /// Build a filter matching any of the given group codes.
    pub fn new<S: AsRef<str>>(codes: &[S]) -> Result<Self> {
        if codes.is_empty() {
            return Err(AppError::config("group filter needs at least one group"));
        }
        let alternation = codes
            .iter()
            .map(|code| format!("({})", regex::escape(code.as_ref())))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            pattern: Regex::new(&alternation)?,
        })
    }

    pub fn from_groups(groups: &[GroupInfo]) -> Result<Self> {
        let codes: Vec<&str> = groups.iter().map(|g| g.code.as_str()).collect();
        Self::new(&codes)
    }

    /// Test a filter key (first cell text).
    pub fn matches(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }

    /// Test a table row by its first cell.
    pub fn accepts(&self, row: &[String]) -> bool {
        row.first().is_some_and(|key| self.matches(key))
    }
}

/// Parser for the substitutions page.
pub struct SubstitutionParser {
    filter: GroupFilter,
    page_url: String,
    header_sel: Selector,
    table_sel: Selector,
    row_sel: Selector,
}

impl SubstitutionParser {
    pub fn new(filter: GroupFilter, page_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            filter,
            page_url: page_url.into(),
            header_sel: parse_selector("body > div > p")?,
            table_sel: parse_selector("table")?,
            row_sel: parse_selector("tr")?,
        })
    }

    /// Render the substitutions message from raw page bytes.
    ///
    /// The output depends only on `html` and the configured filter.
    pub fn extract(&self, html: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(html)
            .map_err(|e| AppError::extraction(format!("page is not valid UTF-8: {e}")))?;
        let document = Html::parse_document(text);

        let header = self.parse_header(&document)?;

        let mut tables = document.select(&self.table_sel);
        let first = tables.next();
        let last = tables.last();

        let lessons = self.render_lessons(first);
        let classrooms = last.map_or_else(String::new, |table| self.render_classrooms(table));
        let link = format!("[Переглянути на сайті 🦄]({})", self.page_url);

        let parts = [header, lessons, classrooms, link];
        Ok(parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Header paragraph with `<br>` turned into line breaks, lines trimmed and
    /// blank lines dropped. Spacing inside a line is kept.
    fn parse_header(&self, document: &Html) -> Result<String> {
        let paragraph = document
            .select(&self.header_sel)
            .next()
            .ok_or_else(|| AppError::extraction("header paragraph not found"))?;

        let mut raw = String::new();
        for node in paragraph.descendants() {
            match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(element) if element.name() == "br" => raw.push('\n'),
                _ => {}
            }
        }

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Lesson substitutions from the first table, or the placeholder.
    fn render_lessons(&self, table: Option<ElementRef<'_>>) -> String {
        let Some(table) = table else {
            return empty_message();
        };

        let mut rows = self.table_rows(table).into_iter();
        let titles = rows.next().unwrap_or_default();

        let blocks: Vec<String> = rows
            .filter(|row| self.filter.accepts(row))
            .map(|row| render_row(&row, |i| COLUMNS.get(i).map(|(emoji, _)| *emoji)))
            .filter(|block| !block.is_empty())
            .collect();

        if blocks.is_empty() {
            return empty_message();
        }

        let header = COLUMNS
            .iter()
            .take(titles.len())
            .map(|(emoji, title)| format!("{emoji} {title}"))
            .collect::<Vec<_>>()
            .join("\n");

        if header.is_empty() {
            blocks.join("\n\n")
        } else {
            format!("{header}\n\n{}", blocks.join("\n\n"))
        }
    }

    /// Classroom substitutions from the last table; empty when none match.
    fn render_classrooms(&self, table: ElementRef<'_>) -> String {
        let blocks: Vec<String> = self
            .table_rows(table)
            .iter()
            .filter(|row| self.filter.accepts(row))
            .map(|row| {
                render_row(row, |i| {
                    CLASSROOM_COLUMNS
                        .get(i)
                        .and_then(|&column| COLUMNS.get(column))
                        .map(|(emoji, _)| *emoji)
                })
            })
            .filter(|block| !block.is_empty())
            .collect();

        if blocks.is_empty() {
            return String::new();
        }
        format!("{CLASSROOM_TITLE}\n\n{}", blocks.join("\n\n"))
    }

    /// Cell texts of every row in a table.
    fn table_rows(&self, table: ElementRef<'_>) -> Vec<Vec<String>> {
        table
            .select(&self.row_sel)
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| element_text(&cell))
                    .collect()
            })
            .collect()
    }
}

/// One line per non-empty cell, prefixed with the column emoji when known.
fn render_row<'e>(row: &[String], emoji: impl Fn(usize) -> Option<&'e str>) -> String {
    row.iter()
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(i, text)| match emoji(i) {
            Some(emoji) => format!("{emoji} {text}"),
            None => text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
