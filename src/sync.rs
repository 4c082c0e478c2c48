//! Keeps the project store in line with the backend.
//!
//! [`SyncEngine::run`] only emits refresh requests: once at startup, then on a
//! fixed interval. Terminal focus and the `r` key request refreshes too. Each
//! request becomes an independent task ([`spawn_refresh`]); they may overlap,
//! and the event loop applies whichever resolves last.

use crate::backend::Backend;
use crate::error::PanelError;
use crate::events::AppEvent;
use crate::store::{Project, ProjectStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

pub const REFRESH_INTERVAL_SECS: u64 = 30;

const DEMO_ROOT: &str = "/root/projects-docker-compose";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Interval,
    FocusRegained,
    Manual,
}

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Live,
    /// The backend could not be reached; sample data stands in.
    Demo,
}

/// Shown when the project list cannot be fetched, so the grid is never blank.
pub fn demo_projects() -> Vec<Project> {
    vec![
        Project::new(
            "demo-nginx",
            ProjectStatus::Stopped,
            format!("{DEMO_ROOT}/demo-nginx"),
        ),
        Project::new(
            "demo-redis",
            ProjectStatus::Running,
            format!("{DEMO_ROOT}/demo-redis"),
        ),
    ]
}

/// Fetches the project list, substituting the demo dataset on any failure.
pub async fn load_projects(backend: &dyn Backend) -> (Vec<Project>, SnapshotSource) {
    match backend.fetch_projects().await {
        Ok(projects) => (projects, SnapshotSource::Live),
        Err(source) => {
            let status = source.status();
            tracing::warn!(
                ?status,
                "{}; showing demo projects",
                PanelError::Fetch(source)
            );
            (demo_projects(), SnapshotSource::Demo)
        }
    }
}

/// Posts [`AppEvent::RefreshFinished`] when dropped, so the loading flag is
/// cleared on every exit path of a refresh task.
pub struct RefreshGuard {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl RefreshGuard {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if self.tx.send(AppEvent::RefreshFinished).is_err() {
            tracing::debug!("refresh guard: channel closed");
        }
    }
}

/// Runs one refresh in the background. The caller has already raised the
/// loading flag; the guard lowers it.
pub fn spawn_refresh(backend: Arc<dyn Backend>, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let _guard = RefreshGuard::new(tx.clone());
        let fetch = tokio::spawn(async move { load_projects(backend.as_ref()).await });
        let event = match fetch.await {
            Ok((projects, source)) => AppEvent::Refreshed { projects, source },
            Err(join_err) => {
                let msg = if join_err.is_panic() {
                    match join_err.into_panic().downcast::<String>() {
                        Ok(s) => *s,
                        Err(payload) => payload
                            .downcast::<&str>()
                            .map_or_else(|_| "unknown panic".to_string(), |s| s.to_string()),
                    }
                } else {
                    "refresh cancelled".to_string()
                };
                tracing::error!("refresh task failed: {msg}");
                AppEvent::RefreshFailed(msg)
            }
        };
        if tx.send(event).is_err() {
            tracing::warn!("refresh: channel closed");
        }
    });
}

pub struct SyncEngine {
    tx: mpsc::UnboundedSender<AppEvent>,
    interval: Duration,
}

impl SyncEngine {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>, interval_secs: u64) -> Self {
        Self {
            tx,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger = RefreshTrigger::Startup;
        loop {
            ticker.tick().await;
            if self.tx.send(AppEvent::RefreshRequested(trigger)).is_err() {
                return;
            }
            trigger = RefreshTrigger::Interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn demo_dataset_shape() {
        let demo = demo_projects();
        assert_eq!(demo.len(), 2);
        assert_eq!(demo[0].name, "demo-nginx");
        assert_eq!(demo[0].status, ProjectStatus::Stopped);
        assert_eq!(demo[1].name, "demo-redis");
        assert_eq!(demo[1].status, ProjectStatus::Running);
        assert_eq!(demo[1].path, "/root/projects-docker-compose/demo-redis");
    }

    #[test]
    fn guard_reports_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(RefreshGuard::new(tx));
        assert!(matches!(rx.try_recv(), Ok(AppEvent::RefreshFinished)));
    }

    #[tokio::test(start_paused = true)]
    async fn engine_requests_startup_then_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(SyncEngine::new(tx, 30).run());

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::RefreshRequested(RefreshTrigger::Startup))
        ));
        let before = time::Instant::now();
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::RefreshRequested(RefreshTrigger::Interval))
        ));
        assert_eq!(before.elapsed(), Duration::from_secs(30));
        handle.abort();
    }
}
