use crate::compose::ComposeView;
use crate::diff::{self, StatusChange};
use crate::dropdown::DropdownSet;
use crate::logs::LogSession;
use crate::store::{Project, ProjectStatus, ProjectStore};
use crate::sync::SnapshotSource;
use crate::view::{self, CardRegion, GridView};
use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

// UI constants
pub const NOTIFICATION_TTL_SECS: u64 = 5;
pub const ERROR_TTL_SECS: u64 = 10;
pub const SPINNER_FRAME_COUNT: usize = 8;
pub const QUICK_SELECT_MAX: usize = 9;
pub const NARROW_WIDTH_THRESHOLD: u16 = 70;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// What the body of the screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectsView {
    Grid,
    /// The refresh task itself failed; shown instead of the grid.
    LoadError(String),
}

#[derive(Debug)]
pub enum ActiveOverlay {
    None,
    Log(LogSession),
    Compose(ComposeView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Trigger(String),
    Menu(String),
}

impl PointerTarget {
    pub fn project(&self) -> &str {
        match self {
            Self::Trigger(p) | Self::Menu(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub timestamp: Instant,
}

/// Geometry of one open container menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLayout {
    pub project: String,
    pub area: Rect,
    pub labels: Vec<String>,
}

impl MenuLayout {
    /// Entry under `row`, if any.
    pub fn entry_at(&self, column: u16, row: u16) -> Option<usize> {
        if !view::contains(self.area, column, row) {
            return None;
        }
        let index = usize::from(row.checked_sub(self.area.y + 1)?);
        (index < self.labels.len()).then_some(index)
    }
}

/// Immutable configuration set at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub interval_secs: u64,
    pub desktop_notify: bool,
    pub mouse: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval_secs: crate::sync::REFRESH_INTERVAL_SECS,
            desktop_notify: false,
            mouse: true,
        }
    }
}

pub struct AppState {
    pub config: AppConfig,

    // Project data
    pub store: ProjectStore,
    pub grid: GridView,
    pub view: ProjectsView,
    pub previous_statuses: HashMap<String, (ProjectStatus, u64)>,
    pub refresh_count: u64,
    pub snapshot_source: Option<SnapshotSource>,
    pub last_sync: Option<DateTime<Local>>,
    /// Projects with a start/stop/restart request in flight.
    pub in_flight: HashSet<String>,

    // Navigation
    pub cursor: usize,
    pub dropdowns: DropdownSet,
    pub pointer: Option<PointerTarget>,
    pub screen: Rect,

    // Active overlay (mutually exclusive)
    pub overlay: ActiveOverlay,
    pub next_log_session: u64,

    // Transient UI
    pub alerts: VecDeque<String>,
    pub notifications: Vec<Notification>,
    pub error: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub loading_count: u16,
    pub should_quit: bool,
    pub focused: bool,

    /// Project whose compose view reopens after the first refresh.
    pub pending_reopen: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: ProjectStore::new(),
            grid: GridView::default(),
            view: ProjectsView::Grid,
            previous_statuses: HashMap::new(),
            refresh_count: 0,
            snapshot_source: None,
            last_sync: None,
            in_flight: HashSet::new(),
            cursor: 0,
            dropdowns: DropdownSet::default(),
            pointer: None,
            screen: Rect::default(),
            overlay: ActiveOverlay::None,
            next_log_session: 0,
            alerts: VecDeque::new(),
            notifications: Vec::new(),
            error: None,
            spinner_frame: 0,
            loading_count: 0,
            should_quit: false,
            focused: true,
            pending_reopen: None,
        }
    }

    // --- Refresh cycle ---

    pub fn begin_refresh(&mut self) {
        self.loading_count = self.loading_count.saturating_add(1);
        self.render();
    }

    pub fn finish_refresh(&mut self) {
        self.loading_count = self.loading_count.saturating_sub(1);
    }

    pub fn is_loading(&self) -> bool {
        self.loading_count > 0
    }

    /// Replaces the store with a fetched snapshot and redraws the grid.
    /// Returns the status changes since the previous live snapshot.
    pub fn apply_snapshot(
        &mut self,
        projects: Vec<Project>,
        source: SnapshotSource,
    ) -> Vec<StatusChange> {
        self.store.replace_all(projects);
        self.snapshot_source = Some(source);
        self.last_sync = Some(Local::now());
        let changes = if source == SnapshotSource::Live {
            diff::detect_changes(self)
        } else {
            Vec::new()
        };
        self.view = ProjectsView::Grid;
        self.render();
        changes
    }

    pub fn fail_refresh(&mut self, message: String) {
        self.dropdowns.hide_all();
        self.pointer = None;
        self.view = ProjectsView::LoadError(message);
    }

    /// Render pass over the store. An empty store leaves the grid as it was.
    pub fn render(&mut self) {
        let Some(mut grid) = view::render_pass(&self.store) else {
            return;
        };
        for name in &self.in_flight {
            grid.mark_busy(name);
        }
        self.grid = grid;
        self.dropdowns.rebind(self.grid.trigger_keys());
        if self
            .pointer
            .as_ref()
            .is_some_and(|p| self.grid.card(p.project()).is_none())
        {
            self.pointer = None;
        }
        if self.cursor >= self.grid.len() {
            self.cursor = self.grid.len().saturating_sub(1);
        }
    }

    pub fn remember_status(&mut self, project: &str, status: ProjectStatus) {
        self.previous_statuses
            .insert(project.to_string(), (status, self.refresh_count));
    }

    // --- Grid navigation ---

    pub fn body_area(&self) -> Rect {
        let [_, body, _] = view::screen_layout(self.screen);
        body
    }

    fn columns(&self) -> usize {
        view::columns_for(self.body_area().width)
    }

    pub fn card_regions(&self) -> Vec<CardRegion> {
        if self.view != ProjectsView::Grid {
            return Vec::new();
        }
        view::card_regions(self.body_area(), self.grid.len(), self.cursor)
    }

    pub fn menu_layouts(&self) -> Vec<MenuLayout> {
        self.card_regions()
            .into_iter()
            .filter_map(|region| {
                let card = self.grid.cards.get(region.index)?;
                let dropdown = self.dropdowns.get(&card.name).filter(|d| d.visible)?;
                let labels: Vec<String> = dropdown
                    .entries
                    .iter()
                    .map(|e| e.label().to_string())
                    .collect();
                let area = view::menu_region(region.trigger, &labels, self.screen);
                Some(MenuLayout {
                    project: card.name.clone(),
                    area,
                    labels,
                })
            })
            .collect()
    }

    pub fn selected_project(&self) -> Option<&str> {
        if self.view != ProjectsView::Grid {
            return None;
        }
        self.grid.cards.get(self.cursor).map(|c| c.name.as_str())
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor + 1 < self.grid.len() {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_up(&mut self) {
        let columns = self.columns();
        if self.cursor >= columns {
            self.cursor -= columns;
        }
    }

    pub fn move_cursor_down(&mut self) {
        let columns = self.columns();
        if self.cursor + columns < self.grid.len() {
            self.cursor += columns;
        }
    }

    /// Selects the nth card (1-indexed).
    pub fn quick_select(&mut self, n: usize) {
        if n >= 1 && n <= self.grid.len() {
            self.cursor = n - 1;
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.grid.len() {
            self.cursor = index;
        }
    }

    // --- Alerts, errors, notifications ---

    pub fn push_alert(&mut self, message: String) {
        self.alerts.push_back(message);
    }

    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn acknowledge_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn notify(&mut self, message: String) {
        self.notifications.push(Notification {
            message,
            timestamp: Instant::now(),
        });
    }

    pub fn prune_notifications(&mut self) {
        let now = Instant::now();
        self.notifications
            .retain(|n| now.duration_since(n.timestamp).as_secs() < NOTIFICATION_TTL_SECS);
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }

    // --- Overlays ---

    pub fn has_log_overlay(&self) -> bool {
        matches!(self.overlay, ActiveOverlay::Log(_))
    }

    pub fn has_compose_overlay(&self) -> bool {
        matches!(self.overlay, ActiveOverlay::Compose(_))
    }

    /// Starts a fresh log session, abandoning the previous one. Returns the
    /// id that the reader's chunks must carry.
    pub fn open_log_overlay(&mut self, project: &str) -> u64 {
        self.next_log_session += 1;
        let id = self.next_log_session;
        self.overlay = ActiveOverlay::Log(LogSession::new(id, project.to_string()));
        id
    }

    /// The open log session, if it is `id`. Chunks of abandoned sessions find
    /// nothing here and are dropped.
    pub fn log_session_mut(&mut self, id: u64) -> Option<&mut LogSession> {
        match &mut self.overlay {
            ActiveOverlay::Log(session) if session.id == id => Some(session),
            _ => None,
        }
    }

    pub fn open_compose_overlay(&mut self, project: &str) {
        self.overlay = ActiveOverlay::Compose(ComposeView::new(project.to_string()));
    }

    pub fn compose_view_mut(&mut self, project: &str) -> Option<&mut ComposeView> {
        match &mut self.overlay {
            ActiveOverlay::Compose(view) if view.project == project => Some(view),
            _ => None,
        }
    }

    /// Closes whichever overlay is open. Dropping a log session aborts its reader.
    pub fn close_overlay(&mut self) {
        self.overlay = ActiveOverlay::None;
    }

    pub fn overlay_viewport(&self) -> usize {
        view::overlay_viewport(self.screen)
    }

    pub fn scroll_overlay_up(&mut self, amount: usize) {
        let visible = self.overlay_viewport();
        match &mut self.overlay {
            ActiveOverlay::Log(session) => session.scroll_up(amount, visible),
            ActiveOverlay::Compose(view) => view.scroll_up(amount),
            ActiveOverlay::None => {}
        }
    }

    pub fn scroll_overlay_down(&mut self, amount: usize) {
        let visible = self.overlay_viewport();
        match &mut self.overlay {
            ActiveOverlay::Log(session) => session.scroll_down(amount, visible),
            ActiveOverlay::Compose(view) => view.scroll_down(amount, visible),
            ActiveOverlay::None => {}
        }
    }

    pub fn scroll_overlay_to_top(&mut self) {
        match &mut self.overlay {
            ActiveOverlay::Log(session) => session.scroll_to_top(),
            ActiveOverlay::Compose(view) => view.scroll = 0,
            ActiveOverlay::None => {}
        }
    }

    pub fn scroll_overlay_to_bottom(&mut self) {
        let visible = self.overlay_viewport();
        match &mut self.overlay {
            ActiveOverlay::Log(session) => session.scroll_to_bottom(),
            ActiveOverlay::Compose(view) => view.scroll_to_bottom(visible),
            ActiveOverlay::None => {}
        }
    }

    /// Text the copy key puts on the clipboard.
    pub fn overlay_text(&self) -> Option<String> {
        match &self.overlay {
            ActiveOverlay::Log(session) => Some(session.text()),
            ActiveOverlay::Compose(view) => view.text().map(str::to_string),
            ActiveOverlay::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropdown::MenuEntry;
    use pretty_assertions::assert_eq;

    fn project(name: &str, status: ProjectStatus) -> Project {
        Project::new(name, status, format!("/srv/{name}"))
    }

    fn state_with(projects: Vec<Project>) -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.screen = Rect::new(0, 0, 100, 40);
        state.apply_snapshot(projects, SnapshotSource::Live);
        state
    }

    fn five() -> Vec<Project> {
        ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| project(n, ProjectStatus::Running))
            .collect()
    }

    #[test]
    fn snapshot_counters_match_length() {
        let state = state_with(vec![
            project("web", ProjectStatus::Running),
            project("db", ProjectStatus::Stopped),
            project("cache", ProjectStatus::Stopped),
        ]);
        assert_eq!(state.grid.running_count, 1);
        assert_eq!(state.grid.stopped_count, 2);
        assert_eq!(
            state.grid.running_count + state.grid.stopped_count,
            state.store.len()
        );
        assert!(state.last_sync.is_some());
    }

    #[test]
    fn empty_snapshot_keeps_previous_grid() {
        let mut state = state_with(vec![project("web", ProjectStatus::Running)]);
        let before = state.grid.clone();
        state.apply_snapshot(Vec::new(), SnapshotSource::Live);
        assert_eq!(state.grid, before);
        assert!(state.store.is_empty());
    }

    #[test]
    fn refresh_loading_flag_balances() {
        let mut state = state_with(vec![]);
        state.begin_refresh();
        state.begin_refresh();
        assert!(state.is_loading());
        state.finish_refresh();
        assert!(state.is_loading());
        state.finish_refresh();
        assert!(!state.is_loading());
        state.finish_refresh();
        assert_eq!(state.loading_count, 0);
    }

    #[test]
    fn failed_refresh_replaces_grid_with_error() {
        let mut state = state_with(vec![project("web", ProjectStatus::Running)]);
        state.fail_refresh("task panicked".to_string());
        assert_eq!(
            state.view,
            ProjectsView::LoadError("task panicked".to_string())
        );
        assert_eq!(state.selected_project(), None);
        state.apply_snapshot(
            vec![project("web", ProjectStatus::Running)],
            SnapshotSource::Live,
        );
        assert_eq!(state.view, ProjectsView::Grid);
    }

    #[test]
    fn render_keeps_in_flight_cards_busy() {
        let mut state = state_with(vec![project("web", ProjectStatus::Running)]);
        state.in_flight.insert("web".to_string());
        state.render();
        assert!(!state.grid.card("web").unwrap().enabled);
    }

    #[test]
    fn cursor_clamped_when_grid_shrinks() {
        let mut state = state_with(five());
        state.cursor = 4;
        state.apply_snapshot(
            vec![project("a", ProjectStatus::Running)],
            SnapshotSource::Live,
        );
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn cursor_moves_through_grid() {
        // 100 columns fit three cards per row.
        let mut state = state_with(five());
        state.move_cursor_right();
        assert_eq!(state.cursor, 1);
        state.move_cursor_down();
        assert_eq!(state.cursor, 4);
        state.move_cursor_down();
        assert_eq!(state.cursor, 4);
        state.move_cursor_up();
        assert_eq!(state.cursor, 1);
        state.move_cursor_left();
        state.move_cursor_left();
        assert_eq!(state.cursor, 0);
        assert_eq!(state.selected_project(), Some("a"));
    }

    #[test]
    fn quick_select_bounds() {
        let mut state = state_with(five());
        state.quick_select(3);
        assert_eq!(state.cursor, 2);
        state.quick_select(9);
        assert_eq!(state.cursor, 2);
        state.quick_select(0);
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn alerts_are_fifo() {
        let mut state = state_with(vec![]);
        state.push_alert("first".into());
        state.push_alert("second".into());
        assert_eq!(state.current_alert(), Some("first"));
        state.acknowledge_alert();
        assert_eq!(state.current_alert(), Some("second"));
        state.acknowledge_alert();
        assert_eq!(state.current_alert(), None);
    }

    #[test]
    fn error_lifecycle() {
        let mut state = state_with(vec![]);
        assert!(state.error_message().is_none());
        state.set_error("something broke".to_string());
        assert_eq!(state.error_message(), Some("something broke"));
        state.clear_error();
        assert!(state.error_message().is_none());
    }

    #[test]
    fn spinner_wraps() {
        let mut state = state_with(vec![]);
        for _ in 0..SPINNER_FRAME_COUNT {
            state.advance_spinner();
        }
        assert_eq!(state.spinner_frame, 0);
    }

    #[test]
    fn new_log_session_abandons_old_one() {
        let mut state = state_with(vec![]);
        let first = state.open_log_overlay("web");
        let second = state.open_log_overlay("db");
        assert_ne!(first, second);
        assert!(state.log_session_mut(first).is_none());
        assert!(state.log_session_mut(second).is_some());
        state.close_overlay();
        assert!(state.log_session_mut(second).is_none());
    }

    #[test]
    fn compose_result_for_other_project_ignored() {
        let mut state = state_with(vec![]);
        state.open_compose_overlay("web");
        assert!(state.compose_view_mut("db").is_none());
        assert!(state.compose_view_mut("web").is_some());
    }

    #[test]
    fn overlay_text_of_log() {
        let mut state = state_with(vec![]);
        let id = state.open_log_overlay("web");
        state.log_session_mut(id).unwrap().append("A\n".into());
        state.log_session_mut(id).unwrap().append("B\n".into());
        assert_eq!(state.overlay_text(), Some("A\nB\n".to_string()));
    }

    #[test]
    fn hidden_dropdown_has_no_menu_layout() {
        let mut state = state_with(vec![project("web", ProjectStatus::Running)]);
        state.dropdowns.on_containers(
            "web",
            Ok(vec![crate::backend::Container {
                name: "web-app-1".into(),
            }]),
        );
        assert_eq!(
            state.dropdowns.get("web").unwrap().entries,
            vec![MenuEntry::Container("web-app-1".into())]
        );
        assert!(state.menu_layouts().is_empty());
    }

    #[test]
    fn no_card_regions_in_error_state() {
        let mut state = state_with(vec![project("web", ProjectStatus::Running)]);
        assert_eq!(state.card_regions().len(), 1);
        state.fail_refresh("boom".into());
        assert!(state.card_regions().is_empty());
    }

    #[test]
    fn menu_entry_hit_test() {
        let layout = MenuLayout {
            project: "web".into(),
            area: Rect::new(10, 5, 20, 4),
            labels: vec!["a".into(), "b".into()],
        };
        assert_eq!(layout.entry_at(12, 6), Some(0));
        assert_eq!(layout.entry_at(12, 7), Some(1));
        assert_eq!(layout.entry_at(12, 5), None);
        assert_eq!(layout.entry_at(12, 8), None);
        assert_eq!(layout.entry_at(40, 6), None);
    }
}
