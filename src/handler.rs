//! Applies one [`AppEvent`] to the [`AppState`]. Everything the event loop
//! does between two frames goes through [`handle_event`].

use crate::app::{ActiveOverlay, AppState, PointerTarget};
use crate::backend::Backend;
use crate::compose::{self, REOPEN_DELAY};
use crate::desktop;
use crate::events::AppEvent;
use crate::input::{self, Action, InputContext, OverlayMode};
use crate::logs;
use crate::notify;
use crate::sync::{self, RefreshTrigger};
use crate::toggle;
use crate::view;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

const PAGE: usize = 20;
const MOUSE_SCROLL: usize = 3;

/// What the handlers need besides the state: the backend and a way to post
/// results back to the loop.
#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn Backend>,
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub state_dir: PathBuf,
}

pub fn handle_event(state: &mut AppState, event: AppEvent, services: &Services) {
    match event {
        AppEvent::Key(key) => {
            let action = input::map_key(key, &input_context(state));
            handle_action(state, action, services);
        }
        AppEvent::Mouse(mouse) => handle_mouse(state, mouse, services),
        AppEvent::FocusGained => {
            let regained = !state.focused;
            state.focused = true;
            if regained {
                request_refresh(state, RefreshTrigger::FocusRegained, services);
            }
        }
        AppEvent::FocusLost => state.focused = false,
        AppEvent::Resize(width, height) => {
            state.screen = Rect::new(0, 0, width, height);
        }
        AppEvent::Tick => {
            state.advance_spinner();
            state.prune_notifications();
            state.prune_error();
        }
        AppEvent::RefreshRequested(trigger) => request_refresh(state, trigger, services),
        AppEvent::Refreshed { projects, source } => {
            let changes = state.apply_snapshot(projects, source);
            if state.config.desktop_notify {
                for change in &changes {
                    notify::send_desktop(change);
                }
            }
            if let Some(project) = state.pending_reopen.take() {
                schedule_reopen(project, services.tx.clone());
            }
        }
        AppEvent::RefreshFinished => state.finish_refresh(),
        AppEvent::RefreshFailed(message) => {
            state.fail_refresh(format!("Could not load projects: {message}"));
        }
        AppEvent::ActionResult { request, result } => toggle::finish(state, request, result),
        AppEvent::HoverElapsed { project, token } => {
            state
                .dropdowns
                .on_hover_elapsed(&project, token, &services.backend, &services.tx);
        }
        AppEvent::HideElapsed { project, token } => {
            state.dropdowns.on_hide_elapsed(&project, token);
        }
        AppEvent::ContainersResult { project, result } => {
            state.dropdowns.on_containers(&project, result);
        }
        AppEvent::LogChunk { session, text } => {
            if let Some(log) = state.log_session_mut(session) {
                log.append(text);
            }
        }
        AppEvent::LogEnded { session, error } => {
            if let Some(log) = state.log_session_mut(session) {
                log.finish(error);
            }
        }
        AppEvent::ComposeResult { project, result } => {
            if let Some(view) = state.compose_view_mut(&project) {
                view.apply(result);
            }
        }
        AppEvent::ReopenCompose(project) => open_compose(state, &project, services),
        AppEvent::ClipboardResult(result) => match result {
            Ok(()) => state.notify("Copied to clipboard".to_string()),
            Err(e) => state.set_error(e),
        },
        AppEvent::Error(e) => state.set_error(e),
    }
}

pub fn input_context(state: &AppState) -> InputContext {
    InputContext {
        has_alert: !state.alerts.is_empty(),
        has_error: state.error.is_some(),
        is_loading: state.is_loading(),
        menu_open: state.dropdowns.visible().next().is_some(),
        overlay: match state.overlay {
            ActiveOverlay::None => OverlayMode::None,
            ActiveOverlay::Log(_) => OverlayMode::Log,
            ActiveOverlay::Compose(_) => OverlayMode::Compose,
        },
    }
}

pub fn handle_action(state: &mut AppState, action: Action, services: &Services) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::AcknowledgeAlert => state.acknowledge_alert(),
        Action::DismissError => state.clear_error(),
        Action::MoveUp => move_cursor(state, services, AppState::move_cursor_up),
        Action::MoveDown => move_cursor(state, services, AppState::move_cursor_down),
        Action::MoveLeft => move_cursor(state, services, AppState::move_cursor_left),
        Action::MoveRight => move_cursor(state, services, AppState::move_cursor_right),
        Action::QuickSelect(n) => move_cursor(state, services, |s| s.quick_select(n)),
        Action::Toggle => {
            if let Some(project) = state.selected_project().map(str::to_string) {
                start_toggle(state, &project, services);
            }
        }
        Action::Restart => {
            if let Some(project) = state.selected_project().map(str::to_string) {
                match toggle::begin_restart(state, &project) {
                    Some(request) => {
                        toggle::spawn(Arc::clone(&services.backend), request, services.tx.clone());
                    }
                    None if state.in_flight.contains(&project) => {}
                    None => state.set_error(format!("{project} is not running")),
                }
            }
        }
        Action::Refresh => request_refresh(state, RefreshTrigger::Manual, services),
        Action::OpenLogs => {
            if let Some(project) = state.selected_project().map(str::to_string) {
                open_logs(state, &project, services);
            }
        }
        Action::OpenCompose => {
            if let Some(project) = state.selected_project().map(str::to_string) {
                open_compose(state, &project, services);
            }
        }
        Action::OpenConsole => {
            if let Some(project) = state.selected_project().map(str::to_string) {
                set_pointer(state, Some(PointerTarget::Trigger(project)), services);
            }
        }
        Action::CloseMenu => {
            state.dropdowns.hide_all();
            state.pointer = None;
        }
        Action::OpenContainer(n) => {
            // The menu under the pointer first, else any open one.
            let project = state
                .pointer
                .as_ref()
                .map(PointerTarget::project)
                .filter(|p| state.dropdowns.is_visible(p))
                .or_else(|| state.dropdowns.visible().next().map(|(p, _)| p));
            let container = project
                .and_then(|p| state.dropdowns.get(p))
                .and_then(|d| d.containers().nth(n.saturating_sub(1)))
                .map(str::to_string);
            if let Some(container) = container {
                open_url(services.backend.exec_url(&container), services);
            }
        }
        Action::EditCompose => {
            if let ActiveOverlay::Compose(view) = &state.overlay {
                let project = view.project.clone();
                match compose::write_reopen_marker(&services.state_dir, &project) {
                    Ok(()) => open_url(services.backend.edit_url(&project), services),
                    Err(e) => state.set_error(format!("{e}")),
                }
            }
        }
        Action::CopyToClipboard => {
            if let Some(text) = state.overlay_text() {
                let tx = services.tx.clone();
                tokio::spawn(async move {
                    let result = desktop::copy_to_clipboard(&text)
                        .await
                        .map_err(|e| format!("{e}"));
                    let _ = tx.send(AppEvent::ClipboardResult(result));
                });
            }
        }
        Action::CloseOverlay => state.close_overlay(),
        Action::ScrollUp => state.scroll_overlay_up(1),
        Action::ScrollDown => state.scroll_overlay_down(1),
        Action::PageUp => state.scroll_overlay_up(PAGE),
        Action::PageDown => state.scroll_overlay_down(PAGE),
        Action::ScrollToTop => state.scroll_overlay_to_top(),
        Action::ScrollToBottom => state.scroll_overlay_to_bottom(),
        Action::None => {}
    }
}

fn request_refresh(state: &mut AppState, trigger: RefreshTrigger, services: &Services) {
    tracing::debug!(?trigger, "refresh requested");
    state.begin_refresh();
    sync::spawn_refresh(Arc::clone(&services.backend), services.tx.clone());
}

fn start_toggle(state: &mut AppState, project: &str, services: &Services) {
    if let Some(request) = toggle::begin(state, project) {
        toggle::spawn(Arc::clone(&services.backend), request, services.tx.clone());
    }
}

/// Moves the keyboard cursor; a console menu opened from the old card is left.
fn move_cursor(state: &mut AppState, services: &Services, apply: impl FnOnce(&mut AppState)) {
    let before = state.cursor;
    apply(state);
    if state.cursor != before {
        set_pointer(state, None, services);
    }
}

fn open_logs(state: &mut AppState, project: &str, services: &Services) {
    let session = state.open_log_overlay(project);
    let reader = logs::spawn_reader(
        Arc::clone(&services.backend),
        project.to_string(),
        session,
        services.tx.clone(),
    );
    if let Some(log) = state.log_session_mut(session) {
        log.attach_reader(reader);
    }
}

fn open_compose(state: &mut AppState, project: &str, services: &Services) {
    state.open_compose_overlay(project);
    compose::spawn_fetch(
        Arc::clone(&services.backend),
        project.to_string(),
        services.tx.clone(),
    );
}

fn open_url(url: String, services: &Services) {
    let tx = services.tx.clone();
    tokio::spawn(async move {
        if let Err(e) = desktop::open_in_browser(&url).await {
            let _ = tx.send(AppEvent::Error(format!("{e}")));
        }
    });
}

fn schedule_reopen(project: String, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        tokio::time::sleep(REOPEN_DELAY).await;
        let _ = tx.send(AppEvent::ReopenCompose(project));
    });
}

/// Moves the pointer between console triggers and menus, driving the
/// dropdown enter/leave transitions.
fn set_pointer(state: &mut AppState, target: Option<PointerTarget>, services: &Services) {
    if state.pointer == target {
        return;
    }
    if let Some(old) = state.pointer.take() {
        state.dropdowns.pointer_leave(old.project(), &services.tx);
    }
    match &target {
        Some(PointerTarget::Trigger(project)) => {
            state.dropdowns.pointer_enter(project, &services.tx);
        }
        Some(PointerTarget::Menu(project)) => state.dropdowns.menu_enter(project),
        None => {}
    }
    state.pointer = target;
}

// --- Mouse ---

fn pointer_target_at(state: &AppState, column: u16, row: u16) -> Option<PointerTarget> {
    if let Some(menu) = state
        .menu_layouts()
        .into_iter()
        .find(|m| view::contains(m.area, column, row))
    {
        return Some(PointerTarget::Menu(menu.project));
    }
    state
        .card_regions()
        .into_iter()
        .find(|r| view::contains(r.trigger, column, row))
        .and_then(|r| state.grid.cards.get(r.index))
        .map(|card| PointerTarget::Trigger(card.name.clone()))
}

fn handle_mouse(state: &mut AppState, mouse: MouseEvent, services: &Services) {
    if !state.alerts.is_empty() {
        return;
    }
    if !matches!(state.overlay, ActiveOverlay::None) {
        match mouse.kind {
            MouseEventKind::ScrollUp => state.scroll_overlay_up(MOUSE_SCROLL),
            MouseEventKind::ScrollDown => state.scroll_overlay_down(MOUSE_SCROLL),
            _ => {}
        }
        return;
    }

    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => {
            let target = pointer_target_at(state, column, row);
            set_pointer(state, target, services);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let menu_hit = state
                .menu_layouts()
                .into_iter()
                .find_map(|m| m.entry_at(column, row).map(|i| (m.project, i)));
            if let Some((project, index)) = menu_hit {
                let container = state
                    .dropdowns
                    .get(&project)
                    .and_then(|d| d.containers().nth(index).map(str::to_string));
                if let Some(container) = container {
                    open_url(services.backend.exec_url(&container), services);
                }
                return;
            }
            let Some(region) = state
                .card_regions()
                .into_iter()
                .find(|r| view::contains(r.card, column, row))
            else {
                return;
            };
            state.select(region.index);
            if view::contains(region.toggle, column, row) {
                if let Some(project) = state.selected_project().map(str::to_string) {
                    start_toggle(state, &project, services);
                }
            }
        }
        MouseEventKind::ScrollDown => move_cursor(state, services, AppState::move_cursor_down),
        MouseEventKind::ScrollUp => move_cursor(state, services, AppState::move_cursor_up),
        _ => {}
    }
}
