//! Start/stop (and restart) of a single project.
//!
//! The card's control goes busy as soon as the request leaves; the status in
//! the store only changes once the backend acknowledged the action. A refused
//! or failed request re-enables the control, labelled for the project's current
//! status, and raises one blocking alert.

use crate::app::AppState;
use crate::backend::{ActionAck, Backend, ProjectAction};
use crate::error::{ApiError, PanelError};
use crate::events::AppEvent;
use crate::view;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    pub project: String,
    pub action: ProjectAction,
    /// Control label before it went busy, put back on failure.
    pub original_label: String,
}

/// Marks the card busy and builds the start/stop request. `None` when the
/// project is unknown or a request for it is already in flight.
pub fn begin(state: &mut AppState, project: &str) -> Option<ToggleRequest> {
    let status = state.store.find_by_name(project)?.status;
    start_request(state, project, ProjectAction::toggle_for(status))
}

/// Same as [`begin`] for a restart. Only running projects can be restarted.
pub fn begin_restart(state: &mut AppState, project: &str) -> Option<ToggleRequest> {
    if !state.store.find_by_name(project)?.is_running() {
        return None;
    }
    start_request(state, project, ProjectAction::Restart)
}

fn start_request(
    state: &mut AppState,
    project: &str,
    action: ProjectAction,
) -> Option<ToggleRequest> {
    if state.in_flight.contains(project) {
        return None;
    }
    let original_label = match state.grid.mark_busy(project) {
        Some(label) => label,
        None => {
            let status = state.store.find_by_name(project)?.status;
            view::toggle_label(status).to_string()
        }
    };
    state.in_flight.insert(project.to_string());
    tracing::debug!(project, action = action.as_str(), "sending project action");
    Some(ToggleRequest {
        project: project.to_string(),
        action,
        original_label,
    })
}

pub async fn send(backend: &dyn Backend, request: &ToggleRequest) -> Result<ActionAck, ApiError> {
    backend
        .project_action(&request.project, request.action)
        .await
}

/// Applies the backend's answer to a request started with [`begin`].
pub fn finish(state: &mut AppState, request: ToggleRequest, result: Result<ActionAck, ApiError>) {
    state.in_flight.remove(&request.project);
    match result {
        Ok(_) => {
            let confirmed = state
                .store
                .find_by_name(&request.project)
                .map(|p| request.action.resulting_status(p.status));
            if let Some(status) = confirmed {
                state.store.set_status(&request.project, status);
                state.remember_status(&request.project, status);
            }
            tracing::info!(
                project = %request.project,
                action = request.action.as_str(),
                "project action confirmed"
            );
            state.render();
            if request.action == ProjectAction::Restart {
                state.notify(format!("{} restarted", request.project));
            }
        }
        Err(source) => {
            // Rebuild from the store: a sync may have changed the status since `begin`.
            state.render();
            if state
                .grid
                .card(&request.project)
                .is_some_and(|card| !card.enabled)
            {
                state.grid.restore(&request.project, request.original_label);
            }
            let err = PanelError::Toggle {
                project: request.project,
                action: request.action.as_str(),
                source,
            };
            tracing::warn!("{err}");
            state.push_alert(err.to_string());
        }
    }
}

/// Sends the request in the background; the answer comes back as
/// [`AppEvent::ActionResult`].
pub fn spawn(
    backend: Arc<dyn Backend>,
    request: ToggleRequest,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        let result = send(backend.as_ref(), &request).await;
        if tx.send(AppEvent::ActionResult { request, result }).is_err() {
            tracing::warn!("project action: channel closed");
        }
    });
}
