//! Typed payloads of note blocks.
//!
//! On the wire every block carries a single `content` string. TODO and CODE blocks encode a
//! small JSON record in that string; image and PDF blocks hold a data URL or nothing. Decoding
//! never fails: unreadable payloads fall back to a safe default so older or hand-edited notes
//! stay viewable. The fallback only affects what is shown; `Block` keeps the stored string and
//! writes it back until the block is edited.

use crate::models::BlockKind;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "javascript",
    "python",
    "html",
    "css",
    "ruby",
    "json",
    "typescript",
    "csharp",
    "jsx",
    "tsx",
    "markdown",
];

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_CODE: &str = "// Start coding...";

pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

/// Language to show in the selector. Unknown stored values display as javascript.
pub fn display_language(language: &str) -> &str {
    if is_supported_language(language) {
        language
    } else {
        DEFAULT_LANGUAGE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub checked: bool,
    pub text: String,
}

impl TodoItem {
    /// Fields of the wrong JSON type decode individually to their defaults.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Self {
                checked: fields.get("checked").and_then(Value::as_bool).unwrap_or(false),
                text: fields
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            _ => {
                if !raw.is_empty() {
                    tracing::debug!("unreadable todo payload, using empty item");
                }
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub language: String,
    pub code: String,
}

impl Default for CodeSnippet {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            code: DEFAULT_CODE.to_string(),
        }
    }
}

impl CodeSnippet {
    /// Anything that is not a JSON object is legacy content: the raw string is the code.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Self {
                language: fields
                    .get("language")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_LANGUAGE)
                    .to_string(),
                code: fields
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            _ => {
                tracing::debug!("legacy code payload, treating content as javascript source");
                Self {
                    language: DEFAULT_LANGUAGE.to_string(),
                    code: raw.to_string(),
                }
            }
        }
    }

    pub fn display_language(&self) -> &str {
        display_language(&self.language)
    }
}

/// An embedded file stored as a data URL. Empty when nothing is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    source: String,
}

impl Asset {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            source: format!("data:{};base64,{}", media_type, encoded),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn media_type(&self) -> Option<&str> {
        let (header, _) = self.split_data_url()?;
        let media_type = header.split(';').next().unwrap_or_default();
        if media_type.is_empty() {
            None
        } else {
            Some(media_type)
        }
    }

    /// Size of the embedded file, when the source is a readable base64 data URL.
    pub fn decoded_len(&self) -> Option<usize> {
        let (header, payload) = self.split_data_url()?;
        if !header.ends_with(";base64") {
            return None;
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .ok()
            .map(|bytes| bytes.len())
    }

    fn split_data_url(&self) -> Option<(&str, &str)> {
        self.source.strip_prefix("data:")?.split_once(',')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent {
    Text(String),
    Heading(String),
    Todo(TodoItem),
    Code(CodeSnippet),
    Image(Asset),
    Pdf(Asset),
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text(_) => BlockKind::Text,
            Self::Heading(_) => BlockKind::Heading,
            Self::Todo(_) => BlockKind::Todo,
            Self::Code(_) => BlockKind::Code,
            Self::Image(_) => BlockKind::Image,
            Self::Pdf(_) => BlockKind::Pdf,
        }
    }

    /// Content given to a freshly added block.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Self::Text(String::new()),
            BlockKind::Heading => Self::Heading(String::new()),
            BlockKind::Todo => Self::Todo(TodoItem::default()),
            BlockKind::Code => Self::Code(CodeSnippet::default()),
            BlockKind::Image => Self::Image(Asset::default()),
            BlockKind::Pdf => Self::Pdf(Asset::default()),
        }
    }

    pub fn decode(kind: BlockKind, raw: &str) -> Self {
        match kind {
            BlockKind::Text => Self::Text(raw.to_string()),
            BlockKind::Heading => Self::Heading(raw.to_string()),
            BlockKind::Todo => Self::Todo(TodoItem::decode(raw)),
            BlockKind::Code => Self::Code(CodeSnippet::decode(raw)),
            BlockKind::Image => Self::Image(Asset::from_source(raw)),
            BlockKind::Pdf => Self::Pdf(Asset::from_source(raw)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) | Self::Heading(text) => text.clone(),
            Self::Todo(item) => encode_record(item),
            Self::Code(snippet) => encode_record(snippet),
            Self::Image(asset) | Self::Pdf(asset) => asset.source().to_string(),
        }
    }

    /// Text that search should look at. Attached files are not searched.
    pub fn searchable_text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Heading(text) => text,
            Self::Todo(item) => &item.text,
            Self::Code(snippet) => &snippet.code,
            Self::Image(_) | Self::Pdf(_) => "",
        }
    }
}

fn encode_record<T: Serialize>(record: &T) -> String {
    serde_json::to_string(record).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_code_is_legacy_javascript() {
        let snippet = CodeSnippet::decode("legacy code");
        assert_eq!(snippet.language, "javascript");
        assert_eq!(snippet.code, "legacy code");
    }

    #[test]
    fn unknown_language_is_kept_but_displayed_as_javascript() {
        let snippet = CodeSnippet::decode(r#"{"language":"cobol","code":"DISPLAY 'HI'."}"#);
        assert_eq!(snippet.language, "cobol");
        assert_eq!(snippet.display_language(), "javascript");

        let encoded = BlockContent::Code(snippet).encode();
        assert_eq!(encoded, r#"{"language":"cobol","code":"DISPLAY 'HI'."}"#);
    }

    #[test]
    fn malformed_todo_decodes_to_empty_item() {
        assert_eq!(TodoItem::decode("{not json"), TodoItem::default());
        assert_eq!(TodoItem::decode(""), TodoItem::default());
        assert_eq!(
            TodoItem::decode(r#"{"checked":"yes","text":7}"#),
            TodoItem::default()
        );
        assert_eq!(
            TodoItem::decode(r#"{"checked":true}"#),
            TodoItem {
                checked: true,
                text: String::new()
            }
        );
    }

    #[test]
    fn todo_and_code_encode_as_compact_records() {
        let todo = BlockContent::Todo(TodoItem {
            checked: true,
            text: "done".to_string(),
        });
        assert_eq!(todo.encode(), r#"{"checked":true,"text":"done"}"#);

        let code = BlockContent::default_for(BlockKind::Code);
        assert_eq!(
            code.encode(),
            r#"{"language":"javascript","code":"// Start coding..."}"#
        );
    }

    #[test]
    fn asset_reports_media_type_and_size() {
        let asset = Asset::from_bytes("image/png", &[1, 2, 3, 4, 5]);
        assert!(asset.source().starts_with("data:image/png;base64,"));
        assert_eq!(asset.media_type(), Some("image/png"));
        assert_eq!(asset.decoded_len(), Some(5));

        let empty = Asset::default();
        assert!(empty.is_empty());
        assert_eq!(empty.media_type(), None);
        assert_eq!(empty.decoded_len(), None);
    }

    #[test]
    fn text_round_trips_verbatim() {
        let raw = "**bold**\n\n> quote";
        let content = BlockContent::decode(BlockKind::Text, raw);
        assert_eq!(content.encode(), raw);
        assert_eq!(content.searchable_text(), raw);
    }
}
