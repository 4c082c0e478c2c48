#![allow(dead_code)]

use async_trait::async_trait;
use dcw::app::{AppConfig, AppState};
use dcw::backend::{ActionAck, Backend, ByteStream, Container, ProjectAction};
use dcw::error::ApiError;
use dcw::events::AppEvent;
use dcw::handler::Services;
use dcw::store::{Project, ProjectStatus};
use dcw::sync::SnapshotSource;
use futures_util::StreamExt;
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 100,
    height: 40,
};

pub fn project(name: &str, status: ProjectStatus) -> Project {
    Project::new(name, status, format!("/srv/compose/{name}"))
}

pub fn running(name: &str) -> Project {
    project(name, ProjectStatus::Running)
}

pub fn stopped(name: &str) -> Project {
    project(name, ProjectStatus::Stopped)
}

/// `web` running, `db` stopped, `cache` running.
pub fn sample_projects() -> Vec<Project> {
    vec![running("web"), stopped("db"), running("cache")]
}

pub fn make_state(projects: Vec<Project>) -> AppState {
    let mut state = AppState::new(AppConfig {
        desktop_notify: false,
        ..AppConfig::default()
    });
    state.screen = SCREEN;
    state.apply_snapshot(projects, SnapshotSource::Live);
    state
}

pub fn temp_state_dir() -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("dcw-test-{}-{n}", std::process::id()))
}

pub fn services(backend: Arc<MockBackend>) -> (Services, mpsc::UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let services = Services {
        backend,
        tx,
        state_dir: temp_state_dir(),
    };
    (services, rx)
}

/// Scripted backend. Remembers every call so tests can count round trips.
#[derive(Default)]
pub struct MockBackend {
    projects: Mutex<Vec<Project>>,
    projects_error: Mutex<Option<ApiError>>,
    action_errors: Mutex<HashMap<String, ApiError>>,
    containers: Mutex<HashMap<String, Result<Vec<String>, ApiError>>>,
    container_delay: Mutex<Duration>,
    log_chunks: Mutex<Vec<Result<Vec<u8>, ApiError>>>,
    compose: Mutex<HashMap<String, String>>,

    pub project_fetches: AtomicUsize,
    pub container_fetches: AtomicUsize,
    pub actions: Mutex<Vec<(String, ProjectAction)>>,
}

impl MockBackend {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let backend = Self::default();
        *backend.projects.lock().unwrap() = projects;
        backend
    }

    pub fn unreachable() -> Self {
        let backend = Self::default();
        backend.fail_projects(ApiError::Transport("connection refused".into()));
        backend
    }

    pub fn fail_projects(&self, error: ApiError) {
        *self.projects_error.lock().unwrap() = Some(error);
    }

    pub fn fail_action(&self, project: &str, error: ApiError) {
        self.action_errors
            .lock()
            .unwrap()
            .insert(project.to_string(), error);
    }

    pub fn set_containers(&self, project: &str, names: &[&str]) {
        self.containers.lock().unwrap().insert(
            project.to_string(),
            Ok(names.iter().map(|n| (*n).to_string()).collect()),
        );
    }

    /// Container lists answer only after `delay`.
    pub fn delay_containers(&self, delay: Duration) {
        *self.container_delay.lock().unwrap() = delay;
    }

    pub fn fail_containers(&self, project: &str, error: ApiError) {
        self.containers
            .lock()
            .unwrap()
            .insert(project.to_string(), Err(error));
    }

    pub fn push_log_chunk(&self, chunk: &[u8]) {
        self.log_chunks.lock().unwrap().push(Ok(chunk.to_vec()));
    }

    pub fn push_log_error(&self, error: ApiError) {
        self.log_chunks.lock().unwrap().push(Err(error));
    }

    pub fn set_compose(&self, project: &str, text: &str) {
        self.compose
            .lock()
            .unwrap()
            .insert(project.to_string(), text.to_string());
    }

    pub fn action_count(&self) -> usize {
        self.actions.lock().unwrap().len()
    }
}

pub fn http_500(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.project_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.projects_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn project_action(
        &self,
        project: &str,
        action: ProjectAction,
    ) -> Result<ActionAck, ApiError> {
        self.actions
            .lock()
            .unwrap()
            .push((project.to_string(), action));
        if let Some(error) = self.action_errors.lock().unwrap().get(project) {
            return Err(error.clone());
        }
        let mut projects = self.projects.lock().unwrap();
        if let Some(p) = projects.iter_mut().find(|p| p.name == project) {
            p.status = action.resulting_status(p.status);
        }
        Ok(ActionAck {
            success: Some(true),
            action: Some(action.as_str().to_string()),
            project: Some(project.to_string()),
            ..ActionAck::default()
        })
    }

    async fn fetch_containers(&self, project: &str) -> Result<Vec<Container>, ApiError> {
        self.container_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.container_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.containers.lock().unwrap().get(project) {
            Some(Ok(names)) => Ok(names
                .iter()
                .map(|name| Container { name: name.clone() })
                .collect()),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn stream_logs(&self, _project: &str) -> Result<ByteStream, ApiError> {
        let chunks = self.log_chunks.lock().unwrap().clone();
        Ok(futures_util::stream::iter(chunks).boxed())
    }

    async fn fetch_compose(&self, project: &str) -> Result<String, ApiError> {
        self.compose
            .lock()
            .unwrap()
            .get(project)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "not found".into(),
            })
    }

    fn exec_url(&self, container: &str) -> String {
        format!("http://backend.test/exec/{container}")
    }

    fn edit_url(&self, project: &str) -> String {
        format!("http://backend.test/edit/{project}")
    }
}
