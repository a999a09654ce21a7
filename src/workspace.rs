//! The workspace controller: owns the canonical snapshot, the active selection and pending
//! edit drafts, and hands every accepted change to the persistence engine.
//!
//! Each operation runs against a copy of the current state and replaces it only on success,
//! so callers never observe a half-applied change. Drafts staged through `stage_*` are
//! committed after the quiet period; an abrupt exit inside that window loses the last draft.
//! Call `flush_drafts` before shutting down to avoid that.

use crate::canvas::{self, CanvasSummary};
use crate::config::WorkspaceSettings;
use crate::content::{BlockContent, CodeSnippet, TodoItem};
use crate::db::DurableStore;
use crate::debounce::KeyedDebouncer;
use crate::document;
use crate::errors::{AppError, AppResult};
use crate::ids::{IdAllocator, IdKind};
use crate::migration;
use crate::models::{
    Block, BlockKind, Canvas, CanvasBody, CanvasKind, PlaygroundContent, Project, SaveStatus, Workspace,
};
use crate::persistence::PersistenceEngine;
use crate::tree::{CascadeDeletion, ExportDocument, ImportOutcome, ProjectNode};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Block {
        project_id: String,
        canvas_id: String,
        block_id: String,
    },
    Playground {
        project_id: String,
        canvas_id: String,
    },
}

impl DraftKey {
    fn project_id(&self) -> &str {
        match self {
            Self::Block { project_id, .. } | Self::Playground { project_id, .. } => project_id,
        }
    }

    fn canvas_id(&self) -> &str {
        match self {
            Self::Block { canvas_id, .. } | Self::Playground { canvas_id, .. } => canvas_id,
        }
    }
}

#[derive(Debug, Clone)]
enum Draft {
    Block(Block),
    Playground(PlaygroundContent),
}

#[derive(Debug, Clone, Default)]
struct WorkspaceState {
    workspace: Workspace,
    ids: IdAllocator,
    active_project_id: Option<String>,
    active_canvas_id: Option<String>,
}

impl WorkspaceState {
    fn select_project(&mut self, project_id: Option<String>) {
        self.active_canvas_id = project_id
            .as_deref()
            .and_then(|id| self.workspace.project(id))
            .and_then(|project| project.canvases.first())
            .map(|canvas| canvas.id.clone());
        self.active_project_id = project_id;
    }

    fn active_project(&self) -> AppResult<&Project> {
        let project_id = self
            .active_project_id
            .as_deref()
            .ok_or_else(|| AppError::NotFound("no active project".to_string()))?;
        self.workspace
            .project(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))
    }
}

fn active_project_mut<'a>(workspace: &'a mut Workspace, active: &Option<String>) -> AppResult<&'a mut Project> {
    let project_id = active
        .as_deref()
        .ok_or_else(|| AppError::NotFound("no active project".to_string()))?;
    workspace
        .project_mut(project_id)
        .ok_or_else(|| AppError::project_not_found(project_id))
}

struct ServiceInner {
    state: Mutex<WorkspaceState>,
    persistence: PersistenceEngine,
    drafts: Mutex<HashMap<DraftKey, Draft>>,
    edit_debouncer: KeyedDebouncer<DraftKey>,
    settings: WorkspaceSettings,
}

impl ServiceInner {
    fn state(&self) -> AppResult<MutexGuard<'_, WorkspaceState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("workspace state mutex poisoned".to_string()))
    }

    fn drafts(&self) -> AppResult<MutexGuard<'_, HashMap<DraftKey, Draft>>> {
        self.drafts
            .lock()
            .map_err(|_| AppError::Internal("draft table mutex poisoned".to_string()))
    }

    /// Applies `apply` to a copy of the state and swaps it in on success. Every accepted
    /// operation is written through, including one that leaves the workspace as it was.
    fn mutate<T, F>(&self, operation: &'static str, apply: F) -> AppResult<T>
    where
        F: FnOnce(&mut WorkspaceState) -> AppResult<T>,
    {
        let mut state = self.state()?;
        let mut next = state.clone();
        let value = apply(&mut next).inspect_err(|error| {
            tracing::debug!(operation, error = %error, "workspace operation rejected");
        })?;
        *state = next;
        tracing::debug!(operation, "workspace operation accepted");
        self.persistence.persist(&state.workspace);
        Ok(value)
    }

    fn commit_draft(&self, key: &DraftKey) {
        let draft = match self.drafts() {
            Ok(mut drafts) => drafts.remove(key),
            Err(error) => {
                tracing::error!(error = %error, "could not read edit drafts");
                return;
            }
        };
        let Some(draft) = draft else {
            return;
        };

        let project_id = key.project_id().to_string();
        let canvas_id = key.canvas_id().to_string();
        let result = self.mutate("commit_draft", |state| {
            let project = state
                .workspace
                .project_mut(&project_id)
                .ok_or_else(|| AppError::project_not_found(&project_id))?;
            match draft {
                Draft::Block(block) => project.update_block(&canvas_id, block),
                Draft::Playground(content) => project.update_playground_content(&canvas_id, content).map(|_| ()),
            }
        });
        if let Err(error) = result {
            tracing::warn!(
                project_id = %project_id,
                canvas_id = %canvas_id,
                error = %error,
                "dropped edit draft whose target no longer exists"
            );
        }
    }

    fn discard_drafts<P>(&self, matches: P)
    where
        P: Fn(&DraftKey) -> bool,
    {
        let Ok(mut drafts) = self.drafts() else {
            return;
        };
        let doomed: Vec<DraftKey> = drafts.keys().filter(|key| matches(key)).cloned().collect();
        for key in doomed {
            drafts.remove(&key);
            self.edit_debouncer.cancel(&key);
        }
    }
}

/// Cheap to clone; clones share one workspace.
#[derive(Clone)]
pub struct WorkspaceService {
    inner: Arc<ServiceInner>,
}

impl WorkspaceService {
    /// Loads the stored workspace, upgrading legacy canvases and repairing parent links.
    ///
    /// An absent document is seeded with the welcome content. An unreadable one is backed up
    /// under `<key>.corrupt` first. Entries that cannot be read are skipped, and the stored
    /// document is backed up the same way before anything overwrites it.
    pub fn open(store: Arc<dyn DurableStore>, settings: WorkspaceSettings) -> AppResult<Self> {
        let persistence = PersistenceEngine::new(store, settings.storage_key.clone(), settings.saving_dwell());
        let mut ids = IdAllocator::default();
        let (mut workspace, mut dirty) = load_workspace(&persistence, &settings, &mut ids)?;
        ids.reserve_workspace(&workspace);

        let repairs = workspace.normalize_parents();
        if !repairs.is_empty() {
            tracing::warn!(
                dangling = ?repairs.dangling,
                cycles_broken = ?repairs.cycles_broken,
                "repaired project parent links"
            );
            dirty = true;
        }
        if dirty {
            persistence.persist(&workspace);
        }

        let mut state = WorkspaceState {
            workspace,
            ids,
            active_project_id: None,
            active_canvas_id: None,
        };
        let first = state.workspace.projects.first().map(|project| project.id.clone());
        state.select_project(first);
        tracing::info!(
            projects = state.workspace.projects.len(),
            key = %settings.storage_key,
            "workspace opened"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                state: Mutex::new(state),
                persistence,
                drafts: Mutex::new(HashMap::new()),
                edit_debouncer: KeyedDebouncer::new(settings.edit_quiet()),
                settings,
            }),
        })
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.inner.settings
    }

    pub fn snapshot(&self) -> AppResult<Workspace> {
        Ok(self.inner.state()?.workspace.clone())
    }

    pub fn project(&self, project_id: &str) -> AppResult<Project> {
        self.inner
            .state()?
            .workspace
            .project(project_id)
            .cloned()
            .ok_or_else(|| AppError::project_not_found(project_id))
    }

    pub fn project_tree(&self) -> AppResult<Vec<ProjectNode>> {
        Ok(self.inner.state()?.workspace.project_tree())
    }

    pub fn active_project_id(&self) -> AppResult<Option<String>> {
        Ok(self.inner.state()?.active_project_id.clone())
    }

    pub fn active_canvas_id(&self) -> AppResult<Option<String>> {
        Ok(self.inner.state()?.active_canvas_id.clone())
    }

    /// Selecting a project selects its first canvas.
    pub fn select_project(&self, project_id: &str) -> AppResult<()> {
        let mut state = self.inner.state()?;
        if !state.workspace.contains_project(project_id) {
            return Err(AppError::project_not_found(project_id));
        }
        state.select_project(Some(project_id.to_string()));
        Ok(())
    }

    pub fn select_canvas(&self, canvas_id: &str) -> AppResult<()> {
        let mut state = self.inner.state()?;
        if state.active_project()?.canvas(canvas_id).is_none() {
            return Err(AppError::canvas_not_found(canvas_id));
        }
        state.active_canvas_id = Some(canvas_id.to_string());
        Ok(())
    }

    pub fn create_project(&self, parent_id: Option<&str>) -> AppResult<String> {
        let project_id = self.inner.mutate("create_project", |state| {
            let project_id = state.workspace.create_project(parent_id, &mut state.ids);
            state.active_project_id = Some(project_id.clone());
            state.active_canvas_id = None;
            Ok(project_id)
        })?;
        tracing::info!(project_id = %project_id, parent_id = ?parent_id, "project created");
        Ok(project_id)
    }

    /// `Ok(false)` when no project has this id.
    pub fn rename_project(&self, project_id: &str, name: &str) -> AppResult<bool> {
        self.inner
            .mutate("rename_project", |state| Ok(state.workspace.rename_project(project_id, name)))
    }

    pub fn move_project(&self, project_id: &str, new_parent_id: Option<&str>) -> AppResult<()> {
        self.inner.mutate("move_project", |state| {
            state.workspace.move_project(project_id, new_parent_id)
        })
    }

    pub fn delete_project(&self, project_id: &str) -> AppResult<CascadeDeletion> {
        let deletion = self.inner.mutate("delete_project", |state| {
            let deletion = state.workspace.delete_project_cascading(project_id)?;
            let active_removed = state
                .active_project_id
                .as_deref()
                .is_some_and(|active| deletion.removed(active));
            if active_removed {
                state.select_project(deletion.fallback_project_id.clone());
            }
            Ok(deletion)
        })?;
        self.inner
            .discard_drafts(|key| deletion.removed(key.project_id()));
        tracing::info!(
            project_id = %project_id,
            removed = deletion.removed_project_ids.len(),
            "project subtree deleted"
        );
        Ok(deletion)
    }

    pub fn export_project(&self, project_id: &str) -> AppResult<ExportDocument> {
        self.inner.state()?.workspace.export_document(project_id)
    }

    /// Parses an export document and appends it under fresh ids. Nothing changes on error.
    pub fn import_document(&self, raw: &str) -> AppResult<ImportOutcome> {
        let batch = document::parse_export_document(raw)?;
        let outcome = self
            .inner
            .mutate("import_document", |state| state.workspace.import_projects(batch, &mut state.ids))?;
        tracing::info!(projects = outcome.project_ids.len(), "projects imported");
        Ok(outcome)
    }

    pub fn add_canvas(&self, kind: CanvasKind) -> AppResult<String> {
        self.inner.mutate("add_canvas", |state| {
            let canvas = canvas::new_canvas(kind, &mut state.ids, Utc::now());
            let canvas_id = canvas.id.clone();
            active_project_mut(&mut state.workspace, &state.active_project_id)?.add_canvas(canvas);
            state.active_canvas_id = Some(canvas_id.clone());
            Ok(canvas_id)
        })
    }

    pub fn delete_canvas(&self, canvas_id: &str) -> AppResult<()> {
        self.inner.mutate("delete_canvas", |state| {
            let fallback = active_project_mut(&mut state.workspace, &state.active_project_id)?.delete_canvas(canvas_id)?;
            if state.active_canvas_id.as_deref() == Some(canvas_id) {
                state.active_canvas_id = fallback;
            }
            Ok(())
        })?;
        self.inner.discard_drafts(|key| key.canvas_id() == canvas_id);
        Ok(())
    }

    pub fn toggle_pin(&self, canvas_id: &str) -> AppResult<bool> {
        self.inner.mutate("toggle_pin", |state| {
            active_project_mut(&mut state.workspace, &state.active_project_id)?.toggle_pin(canvas_id)
        })
    }

    pub fn update_title(&self, canvas_id: &str, title: &str) -> AppResult<()> {
        self.inner.mutate("update_title", |state| {
            active_project_mut(&mut state.workspace, &state.active_project_id)?.update_title(canvas_id, title)
        })
    }

    /// `Ok(false)` on a note canvas.
    pub fn update_playground_content(&self, canvas_id: &str, content: PlaygroundContent) -> AppResult<bool> {
        let (project_id, updated) = self.inner.mutate("update_playground_content", |state| {
            let project = active_project_mut(&mut state.workspace, &state.active_project_id)?;
            let updated = project.update_playground_content(canvas_id, content)?;
            Ok((project.id.clone(), updated))
        })?;
        let superseded = DraftKey::Playground {
            project_id,
            canvas_id: canvas_id.to_string(),
        };
        self.inner.discard_drafts(|key| *key == superseded);
        Ok(updated)
    }

    pub fn canvases(&self, search: &str) -> AppResult<Vec<CanvasSummary>> {
        let state = self.inner.state()?;
        let summaries = state
            .active_project()?
            .search_canvases(search)
            .into_iter()
            .map(CanvasSummary::of)
            .collect();
        Ok(summaries)
    }

    pub fn canvas(&self, canvas_id: &str) -> AppResult<Canvas> {
        let state = self.inner.state()?;
        state
            .active_project()?
            .canvas(canvas_id)
            .cloned()
            .ok_or_else(|| AppError::canvas_not_found(canvas_id))
    }

    pub fn add_block(&self, canvas_id: &str, kind: BlockKind) -> AppResult<String> {
        self.inner.mutate("add_block", |state| {
            active_project_mut(&mut state.workspace, &state.active_project_id)?.add_block(canvas_id, kind, &mut state.ids)
        })
    }

    pub fn update_block(&self, canvas_id: &str, block: Block) -> AppResult<()> {
        let block_id = block.id.clone();
        let project_id = self.inner.mutate("update_block", |state| {
            let project = active_project_mut(&mut state.workspace, &state.active_project_id)?;
            project.update_block(canvas_id, block)?;
            Ok(project.id.clone())
        })?;
        let superseded = DraftKey::Block {
            project_id,
            canvas_id: canvas_id.to_string(),
            block_id,
        };
        self.inner.discard_drafts(|key| *key == superseded);
        Ok(())
    }

    pub fn delete_block(&self, canvas_id: &str, block_id: &str) -> AppResult<()> {
        self.inner.mutate("delete_block", |state| {
            active_project_mut(&mut state.workspace, &state.active_project_id)?.delete_block(canvas_id, block_id)
        })?;
        self.inner.discard_drafts(|key| {
            matches!(key, DraftKey::Block { canvas_id: c, block_id: b, .. } if c == canvas_id && b == block_id)
        });
        Ok(())
    }

    pub fn reorder_blocks(&self, canvas_id: &str, from: usize, to: usize) -> AppResult<bool> {
        self.inner.mutate("reorder_blocks", |state| {
            active_project_mut(&mut state.workspace, &state.active_project_id)?.reorder_blocks(canvas_id, from, to)
        })
    }

    /// Records a high-frequency block edit. It is readable through `draft_block` at once
    /// and committed after the quiet period with no further edits to the same block.
    pub fn stage_block_edit(&self, canvas_id: &str, block: Block) -> AppResult<()> {
        let project_id = {
            let state = self.inner.state()?;
            let project = state.active_project()?;
            let canvas = project
                .canvas(canvas_id)
                .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
            let existing = canvas
                .blocks()
                .ok_or_else(|| AppError::InvalidFormat(format!("canvas {} has no blocks", canvas_id)))?
                .iter()
                .find(|existing| existing.id == block.id)
                .ok_or_else(|| AppError::block_not_found(&block.id))?;
            if existing.kind() != block.kind() {
                return Err(AppError::InvalidFormat(format!(
                    "block {} is {}, not {}",
                    block.id,
                    existing.kind().as_str(),
                    block.kind().as_str()
                )));
            }
            project.id.clone()
        };

        let key = DraftKey::Block {
            project_id,
            canvas_id: canvas_id.to_string(),
            block_id: block.id.clone(),
        };
        self.stage(key, Draft::Block(block))
    }

    pub fn stage_playground_edit(&self, canvas_id: &str, content: PlaygroundContent) -> AppResult<()> {
        let project_id = {
            let state = self.inner.state()?;
            let project = state.active_project()?;
            let canvas = project
                .canvas(canvas_id)
                .ok_or_else(|| AppError::canvas_not_found(canvas_id))?;
            if canvas.kind() != CanvasKind::Playground {
                return Err(AppError::InvalidFormat(format!(
                    "canvas {} is not a playground",
                    canvas_id
                )));
            }
            project.id.clone()
        };

        let key = DraftKey::Playground {
            project_id,
            canvas_id: canvas_id.to_string(),
        };
        self.stage(key, Draft::Playground(content))
    }

    /// The staged edit for a block if one is pending, else the committed block.
    pub fn draft_block(&self, canvas_id: &str, block_id: &str) -> AppResult<Option<Block>> {
        let state = self.inner.state()?;
        let project = state.active_project()?;
        let key = DraftKey::Block {
            project_id: project.id.clone(),
            canvas_id: canvas_id.to_string(),
            block_id: block_id.to_string(),
        };
        if let Some(Draft::Block(block)) = self.inner.drafts()?.get(&key) {
            return Ok(Some(block.clone()));
        }
        Ok(project
            .canvas(canvas_id)
            .and_then(|canvas| canvas.blocks())
            .and_then(|blocks| blocks.iter().find(|block| block.id == block_id))
            .cloned())
    }

    pub fn draft_playground(&self, canvas_id: &str) -> AppResult<Option<PlaygroundContent>> {
        let state = self.inner.state()?;
        let project = state.active_project()?;
        let key = DraftKey::Playground {
            project_id: project.id.clone(),
            canvas_id: canvas_id.to_string(),
        };
        if let Some(Draft::Playground(content)) = self.inner.drafts()?.get(&key) {
            return Ok(Some(content.clone()));
        }
        Ok(project
            .canvas(canvas_id)
            .and_then(|canvas| canvas.playground_content())
            .cloned())
    }

    pub fn has_pending_drafts(&self) -> AppResult<bool> {
        Ok(!self.inner.drafts()?.is_empty())
    }

    /// Commits every staged edit now. Returns how many drafts were committed.
    pub fn flush_drafts(&self) -> AppResult<usize> {
        let keys: Vec<DraftKey> = self.inner.drafts()?.keys().cloned().collect();
        for key in &keys {
            self.inner.edit_debouncer.cancel(key);
            self.inner.commit_draft(key);
        }
        if !keys.is_empty() {
            tracing::info!(drafts = keys.len(), "flushed edit drafts");
        }
        Ok(keys.len())
    }

    pub fn save_status(&self) -> SaveStatus {
        self.inner.persistence.status()
    }

    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.persistence.subscribe()
    }

    pub fn last_write_error(&self) -> Option<String> {
        self.inner.persistence.last_write_error()
    }

    fn stage(&self, key: DraftKey, draft: Draft) -> AppResult<()> {
        self.inner.drafts()?.insert(key.clone(), draft);
        let weak: Weak<ServiceInner> = Arc::downgrade(&self.inner);
        let commit_key = key.clone();
        self.inner.edit_debouncer.debounce(key, move || {
            if let Some(inner) = weak.upgrade() {
                inner.commit_draft(&commit_key);
            }
        });
        Ok(())
    }
}

/// Returns the loaded workspace and whether it must be written back.
fn load_workspace(
    persistence: &PersistenceEngine,
    settings: &WorkspaceSettings,
    ids: &mut IdAllocator,
) -> AppResult<(Workspace, bool)> {
    let Some(raw) = persistence.load()? else {
        if settings.seed_welcome_content {
            tracing::info!("no stored workspace, seeding welcome content");
            return Ok((welcome_workspace(ids, Utc::now()), true));
        }
        return Ok((Workspace::default(), false));
    };

    let mut value = match serde_json::from_slice::<serde_json::Value>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(error = %error, "stored workspace is not valid JSON");
            return recover_from_corrupt(persistence, settings, ids, &raw);
        }
    };

    if !value.is_array() {
        tracing::error!("stored workspace is not a list of projects");
        return recover_from_corrupt(persistence, settings, ids, &raw);
    }

    let report = migration::migrate(&mut value);
    if report.changed() {
        tracing::info!(
            canvases = report.canvases_migrated,
            projects = report.projects_touched,
            "migrated legacy canvases"
        );
    }

    let stored_entries = migration::entry_count(&value);
    match serde_json::from_value::<Workspace>(value) {
        Ok(workspace) => {
            let skipped = stored_entries.saturating_sub(workspace.entry_count());
            if skipped > 0 {
                tracing::warn!(skipped, "stored workspace has unreadable entries, keeping a backup");
                persistence.back_up_corrupt(&raw)?;
            }
            Ok((workspace, report.changed()))
        }
        Err(error) => {
            tracing::error!(error = %error, "stored workspace has an unreadable shape");
            recover_from_corrupt(persistence, settings, ids, &raw)
        }
    }
}

fn recover_from_corrupt(
    persistence: &PersistenceEngine,
    settings: &WorkspaceSettings,
    ids: &mut IdAllocator,
    raw: &[u8],
) -> AppResult<(Workspace, bool)> {
    persistence.back_up_corrupt(raw)?;
    let workspace = if settings.seed_welcome_content {
        welcome_workspace(ids, Utc::now())
    } else {
        Workspace::default()
    };
    Ok((workspace, true))
}

/// Starter content for a brand-new workspace.
pub fn welcome_workspace(ids: &mut IdAllocator, now: DateTime<Utc>) -> Workspace {
    let mut block = |content: BlockContent| Block::new(ids.allocate(IdKind::Block), content);
    let todo = |text: &str| {
        BlockContent::Todo(TodoItem {
            checked: true,
            text: text.to_string(),
        })
    };

    let guide_blocks = vec![
        block(BlockContent::Heading("Welcome to Atelier!".to_string())),
        block(BlockContent::Text(
            "Atelier is your personal digital workshop, designed for focused work and creativity. \
             Your work is saved automatically."
                .to_string(),
        )),
        block(BlockContent::Heading("Core Features Checklist".to_string())),
        block(todo("**Hierarchical Projects:** Organize your work with nested folders.")),
        block(todo("**Rich Notes:** Write using full Markdown support.")),
        block(todo("**Code Playgrounds:** Experiment with live HTML, CSS, and JS.")),
        block(todo("**Drag & Drop:** Reorder blocks within any note.")),
        block(todo("**Import & Export:** Backup and share your projects.")),
        block(BlockContent::Heading("Code Blocks & Playgrounds".to_string())),
        block(BlockContent::Code(CodeSnippet {
            language: "python".to_string(),
            code: "# This is a Python code block\ndef fibonacci(n):\n    a, b = 0, 1\n    while a < n:\n        print(a, end=' ')\n        a, b = b, a+b\n\nfibonacci(1000)".to_string(),
        })),
        block(BlockContent::Heading("Backups and Sharing".to_string())),
        block(BlockContent::Text(
            "Export a project to a JSON file from the library, then import it back on any device."
                .to_string(),
        )),
    ];

    let root_id = ids.allocate(IdKind::Project);
    let root = Project {
        id: root_id.clone(),
        name: "Welcome to Atelier".to_string(),
        parent_id: None,
        canvases: vec![
            Canvas {
                id: ids.allocate(IdKind::Canvas),
                title: "Getting Started Guide".to_string(),
                created_at: now,
                is_pinned: true,
                body: CanvasBody::Note { blocks: guide_blocks },
            },
            Canvas {
                id: ids.allocate(IdKind::Canvas),
                title: "My First Playground".to_string(),
                created_at: now,
                is_pinned: false,
                body: CanvasBody::Playground {
                    playground_content: PlaygroundContent {
                        html: "<h1>Hello, Playground!</h1>\n<p>Edit the HTML, CSS, and JS panels to see the live preview update.</p>\n<div id=\"root\"></div>".to_string(),
                        css: "body { font-family: sans-serif; color: #333; }\nh1 { color: #007aff; }\n#root { border: 1px solid #ccc; padding: 1rem; margin-top: 1rem; }".to_string(),
                        js: "const root = document.getElementById(\"root\");\nconsole.log(\"Logging to the custom console!\");\nroot.textContent = \"Hello from JavaScript!\";".to_string(),
                    },
                },
            },
        ],
    };
    let snippets = Project {
        id: ids.allocate(IdKind::Project),
        name: "Web Development Snippets".to_string(),
        parent_id: Some(root_id),
        canvases: Vec::new(),
    };

    Workspace::new(vec![root, snippets])
}
