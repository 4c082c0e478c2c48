//! The HTTP contract the console consumes, behind a trait so the event loop and
//! tests can run against something other than a live server.

pub mod http;
pub mod parser;

use crate::error::ApiError;
use crate::store::ProjectStatus;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Deserialize;

/// Raw log body, one item per chunk as it arrives off the wire.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ApiError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAction {
    Start,
    Stop,
    Restart,
}

impl ProjectAction {
    /// The action that flips a project out of `status`.
    pub fn toggle_for(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Running => Self::Stop,
            ProjectStatus::Stopped => Self::Start,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// Status the project has once the backend confirmed the action.
    pub fn resulting_status(self, current: ProjectStatus) -> ProjectStatus {
        match self {
            Self::Start => ProjectStatus::Running,
            Self::Stop => ProjectStatus::Stopped,
            Self::Restart => current,
        }
    }
}

/// Acknowledgement of a start/stop/restart call. Every field is optional:
/// backends answer `{success, action, project}`, `{status, project}` or
/// nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionAck {
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false) || self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Container {
    pub name: String,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_projects(&self) -> Result<Vec<crate::store::Project>, ApiError>;
    async fn project_action(&self, project: &str, action: ProjectAction)
        -> Result<ActionAck, ApiError>;
    async fn fetch_containers(&self, project: &str) -> Result<Vec<Container>, ApiError>;
    async fn stream_logs(&self, project: &str) -> Result<ByteStream, ApiError>;
    async fn fetch_compose(&self, project: &str) -> Result<String, ApiError>;
    /// Interactive console for one container, opened outside the TUI.
    fn exec_url(&self, container: &str) -> String;
    /// Compose editor page, opened outside the TUI.
    fn edit_url(&self, project: &str) -> String;
}
