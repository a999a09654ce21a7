//! Canvas operations within one project, plus the read-side helpers the notebook list needs.

use crate::content::BlockContent;
use crate::errors::{AppError, AppResult};
use crate::ids::{IdAllocator, IdKind};
use crate::models::{Block, Canvas, CanvasBody, CanvasKind, PlaygroundContent, Project};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";
pub const DEFAULT_NOTE_HEADING: &str = "New Note";
pub const DEFAULT_PLAYGROUND_TITLE: &str = "New Playground";
pub const PLAYGROUND_PREVIEW: &str = "HTML/CSS/JS Playground";
pub const EMPTY_PREVIEW: &str = "No content";

const PREVIEW_CHARS: usize = 100;

pub fn default_playground_content() -> PlaygroundContent {
    PlaygroundContent {
        html: "<h1>Hello, World!</h1>".to_string(),
        css: "h1 { color: blue; }".to_string(),
        js: "console.log(\"Hello from the playground!\");".to_string(),
    }
}

pub fn new_canvas(kind: CanvasKind, ids: &mut IdAllocator, now: DateTime<Utc>) -> Canvas {
    let id = ids.allocate(IdKind::Canvas);
    match kind {
        CanvasKind::Note => Canvas {
            id,
            title: DEFAULT_NOTE_TITLE.to_string(),
            created_at: now,
            is_pinned: false,
            body: CanvasBody::Note {
                blocks: vec![Block::new(
                    ids.allocate(IdKind::Block),
                    BlockContent::Heading(DEFAULT_NOTE_HEADING.to_string()),
                )],
            },
        },
        CanvasKind::Playground => Canvas {
            id,
            title: DEFAULT_PLAYGROUND_TITLE.to_string(),
            created_at: now,
            is_pinned: false,
            body: CanvasBody::Playground {
                playground_content: default_playground_content(),
            },
        },
    }
}

impl Project {
    pub fn canvas_mut(&mut self, canvas_id: &str) -> Option<&mut Canvas> {
        self.canvases.iter_mut().find(|canvas| canvas.id == canvas_id)
    }

    /// Newest first: the canvas goes to the front of the sequence.
    pub fn add_canvas(&mut self, canvas: Canvas) {
        self.canvases.insert(0, canvas);
    }

    /// Returns the first remaining canvas as the selection fallback.
    pub fn delete_canvas(&mut self, canvas_id: &str) -> AppResult<Option<String>> {
        let index = self
            .canvases
            .iter()
            .position(|canvas| canvas.id == canvas_id)
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
        self.canvases.remove(index);
        Ok(self.canvases.first().map(|canvas| canvas.id.clone()))
    }

    /// Returns the new pin state.
    pub fn toggle_pin(&mut self, canvas_id: &str) -> AppResult<bool> {
        let canvas = self
            .canvas_mut(canvas_id)
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
        canvas.is_pinned = !canvas.is_pinned;
        Ok(canvas.is_pinned)
    }

    pub fn update_title(&mut self, canvas_id: &str, title: &str) -> AppResult<()> {
        let canvas = self
            .canvas_mut(canvas_id)
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
        canvas.title = title.to_string();
        Ok(())
    }

    /// `Ok(false)` when the canvas is a note; nothing changes in that case.
    pub fn update_playground_content(
        &mut self,
        canvas_id: &str,
        content: PlaygroundContent,
    ) -> AppResult<bool> {
        let canvas = self
            .canvas_mut(canvas_id)
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
        match &mut canvas.body {
            CanvasBody::Playground { playground_content } => {
                *playground_content = content;
                Ok(true)
            }
            CanvasBody::Note { .. } => Ok(false),
        }
    }

    /// Pinned canvases first, then newest first. Ties keep sequence order.
    pub fn display_order(&self) -> Vec<&Canvas> {
        let mut ordered: Vec<&Canvas> = self.canvases.iter().collect();
        ordered.sort_by(|left, right| {
            right
                .is_pinned
                .cmp(&left.is_pinned)
                .then_with(|| right.created_at.cmp(&left.created_at))
        });
        ordered
    }

    pub fn search_canvases(&self, term: &str) -> Vec<&Canvas> {
        let term = term.to_lowercase();
        self.display_order()
            .into_iter()
            .filter(|canvas| term.is_empty() || canvas_matches(canvas, &term))
            .collect()
    }
}

fn canvas_matches(canvas: &Canvas, lowered_term: &str) -> bool {
    if canvas.title.to_lowercase().contains(lowered_term) {
        return true;
    }
    canvas.blocks().unwrap_or_default().iter().any(|block| {
        block
            .content
            .searchable_text()
            .to_lowercase()
            .contains(lowered_term)
    })
}

/// A row of the notebook list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSummary {
    pub id: String,
    pub title: String,
    pub kind: CanvasKind,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

impl CanvasSummary {
    pub fn of(canvas: &Canvas) -> Self {
        Self {
            id: canvas.id.clone(),
            title: canvas.title.clone(),
            kind: canvas.kind(),
            is_pinned: canvas.is_pinned,
            created_at: canvas.created_at,
            preview: preview_text(canvas),
        }
    }
}

/// One-line summary shown under the canvas title in the notebook list.
pub fn preview_text(canvas: &Canvas) -> String {
    let blocks = match &canvas.body {
        CanvasBody::Playground { .. } => return PLAYGROUND_PREVIEW.to_string(),
        CanvasBody::Note { blocks } => blocks,
    };

    let first_text = blocks.iter().find_map(|block| match &block.content {
        BlockContent::Heading(text) => Some(format!("H: {}", text)),
        BlockContent::Text(text) => Some(text.chars().take(PREVIEW_CHARS).collect()),
        _ => None,
    });
    if let Some(preview) = first_text {
        return preview;
    }

    match blocks.first() {
        Some(block) => match &block.content {
            BlockContent::Todo(item) if !item.text.is_empty() => item.text.clone(),
            content => format!("[{} block]", content.kind().as_str().to_lowercase()),
        },
        None => EMPTY_PREVIEW.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Asset, CodeSnippet, TodoItem};
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid date") + Duration::minutes(minutes)
    }

    fn note_with(id: &str, title: &str, created: i64, blocks: Vec<BlockContent>) -> Canvas {
        Canvas {
            id: id.to_string(),
            title: title.to_string(),
            created_at: at(created),
            is_pinned: false,
            body: CanvasBody::Note {
                blocks: blocks
                    .into_iter()
                    .enumerate()
                    .map(|(index, content)| Block::new(format!("{}-b{}", id, index), content))
                    .collect(),
            },
        }
    }

    fn project_with(canvases: Vec<Canvas>) -> Project {
        Project {
            id: "p".to_string(),
            name: "P".to_string(),
            parent_id: None,
            canvases,
        }
    }

    #[test]
    fn new_note_has_default_heading_block() {
        let mut ids = IdAllocator::default();
        let canvas = new_canvas(CanvasKind::Note, &mut ids, at(0));
        assert_eq!(canvas.title, DEFAULT_NOTE_TITLE);
        let blocks = canvas.blocks().expect("note");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, BlockContent::Heading("New Note".to_string()));
        assert!(blocks[0].id.starts_with("block_"));
    }

    #[test]
    fn new_playground_has_non_empty_buffers() {
        let mut ids = IdAllocator::default();
        let canvas = new_canvas(CanvasKind::Playground, &mut ids, at(0));
        let content = canvas.playground_content().expect("playground");
        assert!(!content.html.is_empty());
        assert!(!content.css.is_empty());
        assert!(!content.js.is_empty());
    }

    #[test]
    fn add_prepends_and_delete_returns_first_remaining() {
        let mut project = project_with(vec![note_with("old", "Old", 0, vec![])]);
        project.add_canvas(note_with("new", "New", 5, vec![]));
        assert_eq!(project.canvases[0].id, "new");

        assert_eq!(project.delete_canvas("new").expect("delete"), Some("old".to_string()));
        assert_eq!(project.delete_canvas("old").expect("delete"), None);
        assert!(matches!(project.delete_canvas("old"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn playground_update_is_noop_on_notes() {
        let mut ids = IdAllocator::default();
        let mut project = project_with(vec![
            note_with("n", "Note", 0, vec![]),
            new_canvas(CanvasKind::Playground, &mut ids, at(1)),
        ]);
        let playground_id = project.canvases[1].id.clone();
        let replacement = PlaygroundContent {
            html: "<p>x</p>".to_string(),
            ..PlaygroundContent::default()
        };

        let before = project.clone();
        assert!(!project.update_playground_content("n", replacement.clone()).expect("note"));
        assert_eq!(project, before);

        assert!(project.update_playground_content(&playground_id, replacement.clone()).expect("update"));
        assert_eq!(project.canvases[1].playground_content(), Some(&replacement));
    }

    #[test]
    fn pin_and_title_updates() {
        let mut project = project_with(vec![note_with("n", "Note", 0, vec![])]);
        assert!(project.toggle_pin("n").expect("pin"));
        assert!(!project.toggle_pin("n").expect("unpin"));
        project.update_title("n", "Renamed").expect("title");
        assert_eq!(project.canvases[0].title, "Renamed");
        assert!(matches!(project.update_title("x", "t"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn display_order_puts_pinned_first_then_newest() {
        let mut pinned_old = note_with("pinned-old", "a", 0, vec![]);
        pinned_old.is_pinned = true;
        let project = project_with(vec![
            note_with("mid", "b", 5, vec![]),
            pinned_old,
            note_with("newest", "c", 10, vec![]),
            note_with("oldest", "d", -5, vec![]),
        ]);
        let order: Vec<&str> = project.display_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["pinned-old", "newest", "mid", "oldest"]);
    }

    #[test]
    fn search_matches_titles_and_decoded_block_text() {
        let project = project_with(vec![
            note_with("title", "Rust Notes", 0, vec![]),
            note_with(
                "code",
                "Snippets",
                1,
                vec![BlockContent::Code(CodeSnippet {
                    language: "python".to_string(),
                    code: "def rust_belt(): pass".to_string(),
                })],
            ),
            note_with(
                "todo",
                "Chores",
                2,
                vec![BlockContent::Todo(TodoItem {
                    checked: false,
                    text: "Buy milk".to_string(),
                })],
            ),
            note_with("image", "Pics", 3, vec![BlockContent::Image(Asset::from_source("data:rust"))]),
        ]);

        let hits: Vec<&str> = project.search_canvases("RUST").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(hits, vec!["code", "title"]);
        assert_eq!(project.search_canvases("milk").len(), 1);
        assert_eq!(project.search_canvases("").len(), 4);
    }

    #[test]
    fn preview_prefers_first_text_like_block() {
        let heading = note_with(
            "h",
            "t",
            0,
            vec![
                BlockContent::Todo(TodoItem::default()),
                BlockContent::Heading("Intro".to_string()),
            ],
        );
        assert_eq!(preview_text(&heading), "H: Intro");

        let long = "x".repeat(150);
        let text = note_with("t", "t", 0, vec![BlockContent::Text(long)]);
        assert_eq!(preview_text(&text).chars().count(), 100);
    }

    #[test]
    fn preview_falls_back_to_todo_text_or_kind_label() {
        let todo = note_with(
            "t",
            "t",
            0,
            vec![BlockContent::Todo(TodoItem {
                checked: true,
                text: "Ship it".to_string(),
            })],
        );
        assert_eq!(preview_text(&todo), "Ship it");

        let empty_todo = note_with("e", "t", 0, vec![BlockContent::Todo(TodoItem::default())]);
        assert_eq!(preview_text(&empty_todo), "[todo block]");

        let code = note_with("c", "t", 0, vec![BlockContent::Code(CodeSnippet::default())]);
        assert_eq!(preview_text(&code), "[code block]");

        assert_eq!(preview_text(&note_with("n", "t", 0, vec![])), EMPTY_PREVIEW);

        let mut ids = IdAllocator::default();
        let playground = new_canvas(CanvasKind::Playground, &mut ids, at(0));
        assert_eq!(preview_text(&playground), PLAYGROUND_PREVIEW);
    }
}
