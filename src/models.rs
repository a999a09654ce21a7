use crate::content::BlockContent;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanvasKind {
    Note,
    Playground,
}

impl CanvasKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "NOTE",
            Self::Playground => "PLAYGROUND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Text,
    Heading,
    Todo,
    Code,
    Image,
    Pdf,
}

impl BlockKind {
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "TEXT" => Some(Self::Text),
            "HEADING" => Some(Self::Heading),
            "TODO" => Some(Self::Todo),
            "CODE" => Some(Self::Code),
            "IMAGE" => Some(Self::Image),
            "PDF" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Heading => "HEADING",
            Self::Todo => "TODO",
            Self::Code => "CODE",
            Self::Image => "IMAGE",
            Self::Pdf => "PDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveStatus {
    Idle,
    Pending,
}

/// The whole persisted document. Serializes as a bare array of projects.
///
/// Decoding is tolerant: a project, canvas or block that cannot be read is skipped with a
/// warning, and fields holding `null` or a value of the wrong type take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace {
    #[serde(deserialize_with = "lenient_entries")]
    pub projects: Vec<Project>,
}

impl Workspace {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects, canvases and note blocks, counted together.
    pub fn entry_count(&self) -> usize {
        self.projects
            .iter()
            .map(|project| {
                1 + project
                    .canvases
                    .iter()
                    .map(|canvas| 1 + canvas.blocks().map_or(0, <[Block]>::len))
                    .sum::<usize>()
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub canvases: Vec<Canvas>,
}

impl Project {
    pub fn canvas(&self, canvas_id: &str) -> Option<&Canvas> {
        self.canvases.iter().find(|canvas| canvas.id == canvas_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default = "epoch", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_pinned: bool,
    #[serde(flatten)]
    pub body: CanvasBody,
}

impl Canvas {
    pub fn kind(&self) -> CanvasKind {
        self.body.kind()
    }

    pub fn blocks(&self) -> Option<&[Block]> {
        match &self.body {
            CanvasBody::Note { blocks } => Some(blocks),
            CanvasBody::Playground { .. } => None,
        }
    }

    pub fn playground_content(&self) -> Option<&PlaygroundContent> {
        match &self.body {
            CanvasBody::Playground { playground_content } => Some(playground_content),
            CanvasBody::Note { .. } => None,
        }
    }
}

/// Per-kind payload of a canvas, discriminated by the `type` field on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CanvasBody {
    #[serde(rename = "NOTE")]
    Note {
        #[serde(default, deserialize_with = "lenient_entries")]
        blocks: Vec<Block>,
    },
    #[serde(rename = "PLAYGROUND")]
    Playground {
        #[serde(rename = "playgroundContent", default, deserialize_with = "lenient")]
        playground_content: PlaygroundContent,
    },
}

impl CanvasBody {
    pub fn kind(&self) -> CanvasKind {
        match self {
            Self::Note { .. } => CanvasKind::Note,
            Self::Playground { .. } => CanvasKind::Playground,
        }
    }
}

/// Markup, style and script buffers of a playground. Opaque to the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaygroundContent {
    #[serde(default, deserialize_with = "lenient")]
    pub html: String,
    #[serde(default, deserialize_with = "lenient")]
    pub css: String,
    #[serde(default, deserialize_with = "lenient")]
    pub js: String,
}

/// A note block. A block read from storage remembers its wire payload when decoding was not
/// exact (unreadable records, extra fields, unknown types), and writes that payload back
/// unchanged until the block is edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: String,
    pub content: BlockContent,
    stored: Option<StoredPayload>,
}

#[derive(Debug, Clone, PartialEq)]
struct StoredPayload {
    kind: String,
    content: String,
    decoded: BlockContent,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
            stored: None,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// The payload that will be written back verbatim, if any.
    pub fn preserved_payload(&self) -> Option<&str> {
        self.stored
            .as_ref()
            .filter(|stored| stored.decoded == self.content)
            .map(|stored| stored.content.as_str())
    }

    /// Forgets the stored payload so the next save encodes `content`.
    pub(crate) fn mark_edited(&mut self) {
        self.stored = None;
    }
}

/// Wire shape of a block: `{id, type, content}` with a string-encoded payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: String,
    #[serde(default, deserialize_with = "payload_text")]
    content: String,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let known = BlockKind::from_wire(&raw.kind);
        if known.is_none() {
            tracing::warn!(block_id = %raw.id, kind = %raw.kind, "unknown block type, showing as text");
        }
        let content = BlockContent::decode(known.unwrap_or(BlockKind::Text), &raw.content);
        let exact = known.is_some() && content.encode() == raw.content;
        let stored = (!exact).then(|| StoredPayload {
            kind: raw.kind,
            content: raw.content,
            decoded: content.clone(),
        });
        Self {
            id: raw.id,
            content,
            stored,
        }
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        match block.stored {
            Some(stored) if stored.decoded == block.content => Self {
                id: block.id,
                kind: stored.kind,
                content: stored.content,
            },
            _ => Self {
                kind: block.content.kind().as_str().to_string(),
                content: block.content.encode(),
                id: block.id,
            },
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|at| at.with_timezone(&Utc))
            .ok(),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        tracing::debug!(value = %value, "unreadable canvas timestamp, using epoch");
        epoch()
    }))
}

/// Reads a value, falling back to its default on `null` or a value of the wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|error| {
        tracing::debug!(value = %value, error = %error, "unreadable field, using default");
        T::default()
    }))
}

/// Reads a list one entry at a time. Unreadable entries are skipped with a warning.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!(value = %other, "expected a list, using an empty one");
            return Ok(Vec::new());
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(error = %error, "skipping unreadable {} entry", short_type_name::<T>());
                None
            }
        })
        .collect())
}

/// Block payloads are strings. Any other JSON value is kept as its JSON text.
fn payload_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
