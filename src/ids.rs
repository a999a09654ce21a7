use crate::models::{CanvasBody, Workspace};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Project,
    Canvas,
    Block,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Project => "proj",
            Self::Canvas => "canvas",
            Self::Block => "block",
        }
    }
}

pub fn new_id(kind: IdKind) -> String {
    format!("{}_{}", kind.prefix(), Uuid::new_v4().simple())
}

/// Hands out ids that are unique across every id the workspace has ever held in this session.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let mut allocator = Self::default();
        allocator.reserve_workspace(workspace);
        allocator
    }

    pub fn reserve_workspace(&mut self, workspace: &Workspace) {
        for project in &workspace.projects {
            self.taken.insert(project.id.clone());
            for canvas in &project.canvases {
                self.taken.insert(canvas.id.clone());
                if let CanvasBody::Note { blocks } = &canvas.body {
                    self.taken.extend(blocks.iter().map(|block| block.id.clone()));
                }
            }
        }
    }

    pub fn allocate(&mut self, kind: IdKind) -> String {
        loop {
            let candidate = new_id(kind);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }
}
