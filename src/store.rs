use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Running,
    Stopped,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub status: ProjectStatus,
    /// Informational only. Older backends omit it.
    #[serde(default)]
    pub path: String,
}

impl Project {
    pub fn new(name: impl Into<String>, status: ProjectStatus, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            path: path.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ProjectStatus::Running
    }
}

/// Client-side snapshot of every project, in the order of the last sync.
///
/// Only the event loop touches the store, so a render pass always iterates a
/// sequence that is not being replaced underneath it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectStore {
    snapshot: Vec<Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a new snapshot. Duplicate names keep their first occurrence.
    pub fn replace_all(&mut self, new_snapshot: Vec<Project>) {
        let mut seen = std::collections::HashSet::new();
        self.snapshot = new_snapshot
            .into_iter()
            .filter(|p| seen.insert(p.name.clone()))
            .collect();
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Project> {
        self.snapshot.iter().find(|p| p.name == name)
    }

    /// Returns `false` when no project has that name.
    pub fn set_status(&mut self, name: &str, status: ProjectStatus) -> bool {
        match self.snapshot.iter_mut().find(|p| p.name == name) {
            Some(project) => {
                project.status = status;
                true
            }
            None => false,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// `(running, stopped)`.
    pub fn counts(&self) -> (usize, usize) {
        let running = self.snapshot.iter().filter(|p| p.is_running()).count();
        (running, self.snapshot.len() - running)
    }
}
