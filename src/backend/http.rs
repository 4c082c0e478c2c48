use crate::backend::{parser, ActionAck, Backend, ByteStream, Container, ProjectAction};
use crate::error::ApiError;
use crate::store::Project;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, Url};

/// Talks to the compose panel server over HTTP.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid server URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "server URL {base_url:?} cannot carry a path"
            )));
        }
        // No overall timeout: the log endpoint streams for as long as the container lives.
        let client = Client::builder()
            .user_agent(concat!("dcw/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, ApiError> {
        let url = self.url(segments);
        tracing::debug!("GET {url}");
        let resp = self.client.get(url).send().await?;
        checked(resp).await
    }
}

async fn checked(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let reason = status.canonical_reason().unwrap_or("request failed");
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: parser::error_message(&body, reason),
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        let body = self.get(&["api", "projects"]).await?.text().await?;
        parser::parse_projects(&body)
    }

    async fn project_action(
        &self,
        project: &str,
        action: ProjectAction,
    ) -> Result<ActionAck, ApiError> {
        let url = self.url(&["api", "projects", project, action.as_str()]);
        tracing::debug!("POST {url}");
        let resp = self.client.post(url).send().await?;
        let body = checked(resp).await?.text().await.unwrap_or_default();
        let ack = parser::parse_ack(&body);
        if ack.is_rejected() {
            let reason = ack
                .error
                .clone()
                .unwrap_or_else(|| format!("{} was not applied", action.as_str()));
            return Err(ApiError::Rejected(reason));
        }
        Ok(ack)
    }

    async fn fetch_containers(&self, project: &str) -> Result<Vec<Container>, ApiError> {
        let body = self
            .get(&["api", "projects", project, "containers"])
            .await?
            .text()
            .await?;
        parser::parse_containers(&body)
    }

    async fn stream_logs(&self, project: &str) -> Result<ByteStream, ApiError> {
        let resp = self.get(&["logs", project]).await?;
        Ok(resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ApiError::from))
            .boxed())
    }

    async fn fetch_compose(&self, project: &str) -> Result<String, ApiError> {
        Ok(self.get(&["compose", project]).await?.text().await?)
    }

    fn exec_url(&self, container: &str) -> String {
        self.url(&["exec", container]).to_string()
    }

    fn edit_url(&self, project: &str) -> String {
        self.url(&["edit", project]).to_string()
    }
}
