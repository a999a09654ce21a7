//! Operations over the project forest.
//!
//! Projects live in one flat list and point at their parent by id. Children are derived on
//! demand by grouping on `parent_id`, so no operation has back-references to maintain.

use crate::document;
use crate::errors::{AppError, AppResult};
use crate::ids::{IdAllocator, IdKind};
use crate::models::{CanvasBody, Project, Workspace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_PROJECT_NAME: &str = "New Project";

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDeletion {
    /// Removed projects, in their former workspace order.
    pub removed_project_ids: Vec<String>,
    pub removed_canvas_ids: Vec<String>,
    /// Remaining root project, else any remaining project.
    pub fallback_project_id: Option<String>,
}

impl CascadeDeletion {
    pub fn removed(&self, project_id: &str) -> bool {
        self.removed_project_ids.iter().any(|id| id == project_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRemap {
    pub projects: HashMap<String, String>,
    pub canvases: HashMap<String, String>,
    pub blocks: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub project_ids: Vec<String>,
    pub remap: IdRemap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRepairs {
    pub dangling: Vec<String>,
    pub cycles_broken: Vec<String>,
}

impl ParentRepairs {
    pub fn is_empty(&self) -> bool {
        self.dangling.is_empty() && self.cycles_broken.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub project_id: String,
    pub name: String,
    pub children: Vec<ProjectNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

impl Workspace {
    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id == project_id)
    }

    pub fn contains_project(&self, project_id: &str) -> bool {
        self.project(project_id).is_some()
    }

    /// A parent that does not exist is dropped, so the new project becomes a root.
    pub fn create_project(&mut self, parent_id: Option<&str>, ids: &mut IdAllocator) -> String {
        let parent_id = parent_id
            .filter(|parent| self.contains_project(parent))
            .map(str::to_string);
        let id = ids.allocate(IdKind::Project);
        self.projects.push(Project {
            id: id.clone(),
            name: DEFAULT_PROJECT_NAME.to_string(),
            parent_id,
            canvases: Vec::new(),
        });
        id
    }

    pub fn rename_project(&mut self, project_id: &str, name: &str) -> bool {
        match self.project_mut(project_id) {
            Some(project) => {
                project.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn move_project(&mut self, project_id: &str, new_parent_id: Option<&str>) -> AppResult<()> {
        let closure = self
            .descendant_closure(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))?;
        if let Some(parent) = new_parent_id {
            if !self.contains_project(parent) {
                return Err(AppError::project_not_found(parent));
            }
            if closure.contains(parent) {
                return Err(AppError::InvalidParent(format!(
                    "project {} cannot be moved under {}, which is inside its own subtree",
                    project_id, parent
                )));
            }
        }
        if let Some(project) = self.project_mut(project_id) {
            project.parent_id = new_parent_id.map(str::to_string);
        }
        Ok(())
    }

    /// The project plus every transitive descendant. `None` when the id is unknown.
    pub fn descendant_closure(&self, project_id: &str) -> Option<HashSet<String>> {
        if !self.contains_project(project_id) {
            return None;
        }
        let children = self.children_by_parent();
        let mut closure = HashSet::new();
        let mut stack = vec![project_id];
        while let Some(current) = stack.pop() {
            if !closure.insert(current.to_string()) {
                continue;
            }
            if let Some(kids) = children.get(current) {
                stack.extend(kids.iter().copied());
            }
        }
        Some(closure)
    }

    pub fn delete_project_cascading(&mut self, project_id: &str) -> AppResult<CascadeDeletion> {
        let closure = self
            .descendant_closure(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))?;

        let mut removed_project_ids = Vec::with_capacity(closure.len());
        let mut removed_canvas_ids = Vec::new();
        self.projects.retain(|project| {
            if !closure.contains(&project.id) {
                return true;
            }
            removed_project_ids.push(project.id.clone());
            removed_canvas_ids.extend(project.canvases.iter().map(|canvas| canvas.id.clone()));
            false
        });

        Ok(CascadeDeletion {
            removed_project_ids,
            removed_canvas_ids,
            fallback_project_id: self.fallback_project_id(),
        })
    }

    pub fn fallback_project_id(&self) -> Option<String> {
        self.projects
            .iter()
            .find(|project| project.parent_id.is_none())
            .or_else(|| self.projects.first())
            .map(|project| project.id.clone())
    }

    /// The closure of `project_id` in workspace order, ids and parent links untouched.
    pub fn export_subtree(&self, project_id: &str) -> AppResult<Vec<Project>> {
        let closure = self
            .descendant_closure(project_id)
            .ok_or_else(|| AppError::project_not_found(project_id))?;
        Ok(self
            .projects
            .iter()
            .filter(|project| closure.contains(&project.id))
            .cloned()
            .collect())
    }

    pub fn export_document(&self, project_id: &str) -> AppResult<ExportDocument> {
        let projects = self.export_subtree(project_id)?;
        let name = self
            .project(project_id)
            .map(|project| project.name.as_str())
            .unwrap_or_default();
        Ok(ExportDocument {
            file_name: export_file_name(name),
            contents: document::render_export_document(&projects)?,
        })
    }

    /// Appends an imported batch under freshly generated ids. Nothing changes on error.
    pub fn import_projects(
        &mut self,
        batch: Vec<Project>,
        ids: &mut IdAllocator,
    ) -> AppResult<ImportOutcome> {
        if batch.is_empty() {
            return Err(AppError::InvalidFormat(
                "import document contains no projects".to_string(),
            ));
        }

        let (projects, remap) = regenerate_ids(batch, ids);
        let project_ids = projects.iter().map(|project| project.id.clone()).collect();
        self.projects.extend(projects);

        let repairs = self.normalize_parents();
        if !repairs.cycles_broken.is_empty() {
            tracing::warn!(
                projects = ?repairs.cycles_broken,
                "imported projects formed a parent cycle; promoted to roots"
            );
        }

        Ok(ImportOutcome { project_ids, remap })
    }

    /// Points dangling parents at nothing and breaks parent cycles.
    ///
    /// Within a cycle, the member that comes first in workspace order becomes a root.
    pub fn normalize_parents(&mut self) -> ParentRepairs {
        let mut repairs = ParentRepairs::default();

        let known: HashSet<String> = self.projects.iter().map(|project| project.id.clone()).collect();
        for project in &mut self.projects {
            let dangling = project
                .parent_id
                .as_ref()
                .is_some_and(|parent| !known.contains(parent));
            if dangling {
                project.parent_id = None;
                repairs.dangling.push(project.id.clone());
            }
        }

        let mut parents: HashMap<String, Option<String>> = self
            .projects
            .iter()
            .map(|project| (project.id.clone(), project.parent_id.clone()))
            .collect();
        for project in &mut self.projects {
            let mut seen = HashSet::from([project.id.clone()]);
            let mut cursor = parents.get(&project.id).cloned().flatten();
            while let Some(current) = cursor {
                if current == project.id {
                    project.parent_id = None;
                    parents.insert(project.id.clone(), None);
                    repairs.cycles_broken.push(project.id.clone());
                    break;
                }
                if !seen.insert(current.clone()) {
                    break;
                }
                cursor = parents.get(&current).cloned().flatten();
            }
        }

        repairs
    }

    /// Nested view of the forest. Projects with an unknown parent appear as roots.
    pub fn project_tree(&self) -> Vec<ProjectNode> {
        let known: HashSet<&str> = self.projects.iter().map(|project| project.id.as_str()).collect();
        let mut roots = Vec::new();
        let mut children: HashMap<&str, Vec<&Project>> = HashMap::new();
        for project in &self.projects {
            let parent = project
                .parent_id
                .as_deref()
                .filter(|parent| known.contains(parent) && *parent != project.id);
            match parent {
                Some(parent) => children.entry(parent).or_default().push(project),
                None => roots.push(project),
            }
        }

        let mut visited = HashSet::new();
        roots
            .into_iter()
            .filter_map(|project| build_node(project, &children, &mut visited))
            .collect()
    }

    fn children_by_parent(&self) -> HashMap<&str, Vec<&str>> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for project in &self.projects {
            if let Some(parent) = project.parent_id.as_deref() {
                children.entry(parent).or_default().push(project.id.as_str());
            }
        }
        children
    }
}

/// Gives every project, canvas and block in `batch` a fresh id, then relinks parents.
///
/// A parent outside the batch, including none at all, makes the project a root.
pub fn regenerate_ids(mut batch: Vec<Project>, ids: &mut IdAllocator) -> (Vec<Project>, IdRemap) {
    let mut remap = IdRemap::default();
    let original_parents: Vec<Option<String>> =
        batch.iter().map(|project| project.parent_id.clone()).collect();

    for project in &mut batch {
        let fresh = ids.allocate(IdKind::Project);
        let previous = std::mem::replace(&mut project.id, fresh.clone());
        remap.projects.entry(previous).or_insert(fresh);

        for canvas in &mut project.canvases {
            let fresh = ids.allocate(IdKind::Canvas);
            let previous = std::mem::replace(&mut canvas.id, fresh.clone());
            remap.canvases.entry(previous).or_insert(fresh);

            if let CanvasBody::Note { blocks } = &mut canvas.body {
                for block in blocks {
                    let fresh = ids.allocate(IdKind::Block);
                    let previous = std::mem::replace(&mut block.id, fresh.clone());
                    remap.blocks.entry(previous).or_insert(fresh);
                }
            }
        }
    }

    for (project, original_parent) in batch.iter_mut().zip(original_parents) {
        project.parent_id = original_parent
            .and_then(|parent| remap.projects.get(&parent).cloned())
            .filter(|parent| *parent != project.id);
    }

    (batch, remap)
}

pub fn export_file_name(project_name: &str) -> String {
    let slug = WHITESPACE_RUN_RE
        .replace_all(project_name, "_")
        .to_lowercase();
    if slug.is_empty() {
        "atelier-export-project.json".to_string()
    } else {
        format!("atelier-export-{}.json", slug)
    }
}

fn build_node<'a>(
    project: &'a Project,
    children: &HashMap<&'a str, Vec<&'a Project>>,
    visited: &mut HashSet<&'a str>,
) -> Option<ProjectNode> {
    if !visited.insert(project.id.as_str()) {
        return None;
    }
    let nested = children
        .get(project.id.as_str())
        .map(|kids| {
            kids.iter()
                .filter_map(|child| build_node(child, children, visited))
                .collect()
        })
        .unwrap_or_default();
    Some(ProjectNode {
        project_id: project.id.clone(),
        name: project.name.clone(),
        children: nested,
    })
}
