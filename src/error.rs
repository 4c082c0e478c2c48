//! Typed errors for backend calls and the operations built on them.
//!
//! [`ApiError`] describes what went wrong on the wire. [`PanelError`] says which
//! console operation it broke, which decides how the failure is surfaced:
//! fallback dataset, alert, placeholder entry or a silently ended stream.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::Rejected(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            };
        }
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PanelError {
    #[error("could not load projects: {0}")]
    Fetch(#[source] ApiError),

    #[error("could not {action} {project}: {source}")]
    Toggle {
        project: String,
        action: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("could not list containers of {project}: {source}")]
    ContainerList {
        project: String,
        #[source]
        source: ApiError,
    },

    #[error("log stream of {project} ended: {source}")]
    LogStream {
        project: String,
        #[source]
        source: ApiError,
    },

    #[error("could not load compose file of {project}: {source}")]
    Compose {
        project: String,
        #[source]
        source: ApiError,
    },
}
