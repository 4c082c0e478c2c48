//! Per-project container dropdowns opened by hovering a card's console trigger.
//!
//! Timers are tokio sleep tasks that post back to the event loop. Each one
//! carries a token; a timer whose token is no longer the pending one is stale
//! and ignored, so cancelling is both an abort and a token reset.

use crate::backend::{Backend, Container};
use crate::error::{ApiError, PanelError};
use crate::events::AppEvent;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(150);
pub const HIDE_GRACE: Duration = Duration::from_millis(300);
pub const LOAD_ERROR_LABEL: &str = "⚠ could not load containers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Container(String),
    LoadError,
}

impl MenuEntry {
    pub fn label(&self) -> &str {
        match self {
            Self::Container(name) => name,
            Self::LoadError => LOAD_ERROR_LABEL,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContainerDropdown {
    pub loaded: bool,
    pub loading: bool,
    pub visible: bool,
    pub entries: Vec<MenuEntry>,
    /// Reveal once the in-flight load resolves.
    reveal_on_load: bool,
    next_token: u64,
    pending_hover: Option<(u64, AbortHandle)>,
    pending_hide: Option<(u64, AbortHandle)>,
}

impl ContainerDropdown {
    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn cancel_hover(&mut self) {
        if let Some((_, handle)) = self.pending_hover.take() {
            handle.abort();
        }
    }

    fn cancel_hide(&mut self) {
        if let Some((_, handle)) = self.pending_hide.take() {
            handle.abort();
        }
    }

    /// Container names, in the order the backend listed them.
    pub fn containers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            MenuEntry::Container(name) => Some(name.as_str()),
            MenuEntry::LoadError => None,
        })
    }
}

/// All dropdowns, keyed by project name. Entries are created on first hover and
/// outlive render passes, so a project's containers are fetched once.
#[derive(Debug, Default)]
pub struct DropdownSet {
    dropdowns: HashMap<String, ContainerDropdown>,
}

impl DropdownSet {
    pub fn get(&self, project: &str) -> Option<&ContainerDropdown> {
        self.dropdowns.get(project)
    }

    pub fn is_visible(&self, project: &str) -> bool {
        self.get(project).is_some_and(|d| d.visible)
    }

    pub fn visible(&self) -> impl Iterator<Item = (&str, &ContainerDropdown)> {
        self.dropdowns
            .iter()
            .filter(|(_, d)| d.visible)
            .map(|(name, d)| (name.as_str(), d))
    }

    pub fn pointer_enter(&mut self, project: &str, tx: &mpsc::UnboundedSender<AppEvent>) {
        let dropdown = self.dropdowns.entry(project.to_string()).or_default();
        dropdown.cancel_hide();
        dropdown.cancel_hover();
        let token = dropdown.token();
        let handle = spawn_timer(HOVER_DEBOUNCE, tx.clone(), AppEvent::HoverElapsed {
            project: project.to_string(),
            token,
        });
        dropdown.pending_hover = Some((token, handle));
    }

    pub fn pointer_leave(&mut self, project: &str, tx: &mpsc::UnboundedSender<AppEvent>) {
        let Some(dropdown) = self.dropdowns.get_mut(project) else {
            return;
        };
        dropdown.cancel_hover();
        // A load already in flight still reveals the menu; the grace timer closes it.
        if dropdown.pending_hide.is_some() {
            return;
        }
        let token = dropdown.token();
        let handle = spawn_timer(HIDE_GRACE, tx.clone(), AppEvent::HideElapsed {
            project: project.to_string(),
            token,
        });
        dropdown.pending_hide = Some((token, handle));
    }

    /// Pointer moved into an open menu: keep it open.
    pub fn menu_enter(&mut self, project: &str) {
        if let Some(dropdown) = self.dropdowns.get_mut(project) {
            dropdown.cancel_hide();
        }
    }

    /// Debounce elapsed. Returns `true` when a container fetch was started.
    pub fn on_hover_elapsed(
        &mut self,
        project: &str,
        token: u64,
        backend: &Arc<dyn Backend>,
        tx: &mpsc::UnboundedSender<AppEvent>,
    ) -> bool {
        let Some(dropdown) = self.dropdowns.get_mut(project) else {
            return false;
        };
        if dropdown.pending_hover.as_ref().map(|(t, _)| *t) != Some(token) {
            return false;
        }
        dropdown.pending_hover = None;

        if dropdown.loaded {
            dropdown.visible = true;
            return false;
        }
        dropdown.reveal_on_load = true;
        if dropdown.loading {
            return false;
        }
        dropdown.loading = true;
        spawn_fetch(Arc::clone(backend), project.to_string(), tx.clone());
        true
    }

    pub fn on_containers(&mut self, project: &str, result: Result<Vec<Container>, ApiError>) {
        let dropdown = self.dropdowns.entry(project.to_string()).or_default();
        dropdown.loading = false;
        match result {
            Ok(containers) => {
                dropdown.entries = containers
                    .into_iter()
                    .map(|c| MenuEntry::Container(c.name))
                    .collect();
                dropdown.loaded = true;
            }
            Err(source) => {
                let err = PanelError::ContainerList {
                    project: project.to_string(),
                    source,
                };
                tracing::warn!("{err}");
                dropdown.entries = vec![MenuEntry::LoadError];
            }
        }
        if std::mem::take(&mut dropdown.reveal_on_load) {
            dropdown.visible = true;
        }
    }

    pub fn on_hide_elapsed(&mut self, project: &str, token: u64) {
        let Some(dropdown) = self.dropdowns.get_mut(project) else {
            return;
        };
        if dropdown.pending_hide.as_ref().map(|(t, _)| *t) != Some(token) {
            return;
        }
        dropdown.pending_hide = None;
        dropdown.reveal_on_load = false;
        dropdown.visible = false;
    }

    /// Closes every menu immediately (keyboard escape).
    pub fn hide_all(&mut self) {
        for dropdown in self.dropdowns.values_mut() {
            dropdown.cancel_hover();
            dropdown.cancel_hide();
            dropdown.reveal_on_load = false;
            dropdown.visible = false;
        }
    }

    /// Rebinds to the triggers of a new render pass. Dropdowns whose trigger is
    /// gone lose their timers and close; loaded lists are kept.
    pub fn rebind<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let keys: HashSet<&str> = keys.into_iter().collect();
        for (name, dropdown) in &mut self.dropdowns {
            if !keys.contains(name.as_str()) {
                dropdown.cancel_hover();
                dropdown.cancel_hide();
                dropdown.reveal_on_load = false;
                dropdown.visible = false;
            }
        }
    }
}

fn spawn_timer(
    delay: Duration,
    tx: mpsc::UnboundedSender<AppEvent>,
    event: AppEvent,
) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(event).is_err() {
            tracing::debug!("dropdown timer: channel closed");
        }
    })
    .abort_handle()
}

fn spawn_fetch(backend: Arc<dyn Backend>, project: String, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = backend.fetch_containers(&project).await;
        if tx
            .send(AppEvent::ContainersResult { project, result })
            .is_err()
        {
            tracing::warn!("fetch_containers: channel closed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn containers(names: &[&str]) -> Vec<Container> {
        names
            .iter()
            .map(|n| Container {
                name: (*n).to_string(),
            })
            .collect()
    }

    #[test]
    fn load_success_marks_loaded() {
        let mut set = DropdownSet::default();
        set.on_containers("web", Ok(containers(&["web-app-1", "web-db-1"])));
        let d = set.get("web").unwrap();
        assert!(d.loaded);
        assert!(!d.loading);
        assert_eq!(d.containers().collect::<Vec<_>>(), vec!["web-app-1", "web-db-1"]);
    }

    #[test]
    fn load_failure_shows_placeholder_and_stays_unloaded() {
        let mut set = DropdownSet::default();
        set.on_containers("web", Err(ApiError::Transport("refused".into())));
        let d = set.get("web").unwrap();
        assert!(!d.loaded);
        assert_eq!(d.entries, vec![MenuEntry::LoadError]);
        assert_eq!(d.entries[0].label(), LOAD_ERROR_LABEL);
    }

    #[test]
    fn unsolicited_load_does_not_reveal() {
        let mut set = DropdownSet::default();
        set.on_containers("web", Ok(containers(&["a"])));
        assert!(!set.is_visible("web"));
    }

    #[test]
    fn stale_hide_token_ignored() {
        let mut set = DropdownSet::default();
        set.on_containers("web", Ok(containers(&["a"])));
        set.dropdowns.get_mut("web").unwrap().visible = true;
        set.on_hide_elapsed("web", 42);
        assert!(set.is_visible("web"));
    }

    #[test]
    fn rebind_closes_orphans_keeps_cache() {
        let mut set = DropdownSet::default();
        set.on_containers("web", Ok(containers(&["a"])));
        set.dropdowns.get_mut("web").unwrap().visible = true;
        set.rebind(["db"]);
        let d = set.get("web").unwrap();
        assert!(!d.visible);
        assert!(d.loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn leave_cancels_hover_and_starts_grace() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut set = DropdownSet::default();
        set.pointer_enter("web", &tx);
        assert!(set.dropdowns["web"].pending_hover.is_some());

        set.pointer_leave("web", &tx);
        let d = &set.dropdowns["web"];
        assert!(d.pending_hover.is_none());
        assert!(d.pending_hide.is_some());

        match rx.recv().await {
            Some(AppEvent::HideElapsed { project, token }) => {
                assert_eq!(project, "web");
                set.on_hide_elapsed(&project, token);
            }
            other => panic!("expected HideElapsed, got {other:?}"),
        }
        assert!(set.dropdowns["web"].pending_hide.is_none());
        assert!(!set.is_visible("web"));
    }

    #[test]
    fn load_resolving_after_leave_still_reveals() {
        let mut set = DropdownSet::default();
        let d = set.dropdowns.entry("web".into()).or_default();
        d.loading = true;
        d.reveal_on_load = true;
        set.on_containers("web", Ok(containers(&["a"])));
        assert!(set.is_visible("web"));
    }

    #[tokio::test(start_paused = true)]
    async fn grace_elapsing_before_load_keeps_menu_closed() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut set = DropdownSet::default();
        let d = set.dropdowns.entry("web".into()).or_default();
        d.loading = true;
        d.reveal_on_load = true;

        set.pointer_leave("web", &tx);
        let token = set.dropdowns["web"]
            .pending_hide
            .as_ref()
            .map(|(t, _)| *t)
            .unwrap();
        set.on_hide_elapsed("web", token);
        set.on_containers("web", Ok(containers(&["a"])));

        assert!(!set.is_visible("web"));
        assert!(set.get("web").unwrap().loaded);
    }

    #[test]
    fn hide_all_closes_everything() {
        let mut set = DropdownSet::default();
        for name in ["web", "db"] {
            set.on_containers(name, Ok(containers(&["a"])));
            set.dropdowns.get_mut(name).unwrap().visible = true;
        }
        set.hide_all();
        assert_eq!(set.visible().count(), 0);
    }
}
