//! Read-only compose-file overlay.
//!
//! The file is fetched once per open and scrolled locally. A reopen marker in
//! the state directory is written before the edit hand-off and consumed once
//! at startup: it names the project whose compose file opens again after the
//! first grid render.

use crate::backend::Backend;
use crate::error::{ApiError, PanelError};
use crate::events::AppEvent;
use color_eyre::eyre::{eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause between the first grid render and honouring the reopen marker.
pub const REOPEN_DELAY: Duration = Duration::from_millis(200);

const REOPEN_MARKER_FILE: &str = "reopen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeContent {
    Loading,
    Loaded(String),
    Failed(String),
}

#[derive(Debug)]
pub struct ComposeView {
    pub project: String,
    pub content: ComposeContent,
    pub scroll: usize,
}

impl ComposeView {
    pub fn new(project: String) -> Self {
        Self {
            project,
            content: ComposeContent::Loading,
            scroll: 0,
        }
    }

    pub fn apply(&mut self, result: Result<String, ApiError>) {
        self.content = match result {
            Ok(text) => ComposeContent::Loaded(text),
            Err(source) => {
                let err = PanelError::Compose {
                    project: self.project.clone(),
                    source,
                };
                tracing::warn!("{err}");
                ComposeContent::Failed(err.to_string())
            }
        };
        self.scroll = 0;
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ComposeContent::Loaded(text) => Some(text),
            ComposeContent::Loading | ComposeContent::Failed(_) => None,
        }
    }

    pub fn line_count(&self) -> usize {
        match &self.content {
            ComposeContent::Loaded(text) => text.lines().count(),
            ComposeContent::Loading | ComposeContent::Failed(_) => 1,
        }
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize, visible: usize) {
        let max_scroll = self.line_count().saturating_sub(visible);
        self.scroll = (self.scroll + amount).min(max_scroll);
    }

    pub fn scroll_to_bottom(&mut self, visible: usize) {
        self.scroll = self.line_count().saturating_sub(visible);
    }
}

pub fn spawn_fetch(backend: Arc<dyn Backend>, project: String, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = backend.fetch_compose(&project).await;
        if tx.send(AppEvent::ComposeResult { project, result }).is_err() {
            tracing::warn!("fetch_compose: channel closed");
        }
    });
}

// --- Reopen marker ---
//
// Set right before handing the operator to the external editor page, consumed
// once on the next start so the compose view of that project comes back up.

fn marker_path(state_dir: &Path) -> PathBuf {
    state_dir.join(REOPEN_MARKER_FILE)
}

pub fn write_reopen_marker(state_dir: &Path, project: &str) -> Result<()> {
    std::fs::create_dir_all(state_dir)
        .map_err(|e| eyre!("Failed to create state directory {state_dir:?}: {e}"))?;
    let path = marker_path(state_dir);
    std::fs::write(&path, project).map_err(|e| eyre!("Failed to write {path:?}: {e}"))?;
    Ok(())
}

/// Reads and deletes the marker. A missing or blank marker yields `None`.
pub fn take_reopen_marker(state_dir: &Path) -> Option<String> {
    let path = marker_path(state_dir);
    let content = std::fs::read_to_string(&path).ok()?;
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!("could not remove reopen marker {path:?}: {e}");
    }
    let project = content.trim().to_string();
    (!project.is_empty()).then_some(project)
}
