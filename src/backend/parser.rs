use crate::backend::{ActionAck, Container};
use crate::error::ApiError;
use crate::store::Project;

/// Longest server error message kept for an alert.
const MAX_ERROR_MESSAGE_CHARS: usize = 200;

pub fn parse_projects(json: &str) -> Result<Vec<Project>, ApiError> {
    let projects: Vec<Project> = serde_json::from_str(json)?;
    Ok(projects)
}

pub fn parse_containers(json: &str) -> Result<Vec<Container>, ApiError> {
    let containers: Vec<Container> = serde_json::from_str(json)?;
    Ok(containers)
}

/// A 2xx body that is empty or not JSON still counts as an acknowledgement.
pub fn parse_ack(body: &str) -> ActionAck {
    if body.trim().is_empty() {
        return ActionAck::default();
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!("unrecognised action response ({e}), treating as acknowledged");
        ActionAck::default()
    })
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// Extracts a human-readable message from an error response body.
/// Understands `{"error": "..."}`; anything else is used as plain text.
pub fn error_message(body: &str, fallback: &str) -> String {
    let text = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.lines().next().unwrap_or("").trim().to_string(),
    };
    if text.is_empty() {
        return fallback.to_string();
    }
    if text.chars().count() > MAX_ERROR_MESSAGE_CHARS {
        let mut cut: String = text.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        cut.push('…');
        cut
    } else {
        text
    }
}
