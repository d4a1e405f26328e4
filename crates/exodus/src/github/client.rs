use std::sync::Arc;
use std::time::Duration;

use crate::transport::{HttpTransport, Method, Request, ReqwestTransport, Response};

use super::error::GitHubError;

/// Media type selecting the source-import preview API.
pub(super) const IMPORT_PREVIEW_ACCEPT: &str = "application/vnd.github.barred-rock-preview";

/// Media type for the stable REST endpoints.
pub(super) const JSON_ACCEPT: &str = "application/vnd.github+json";

const USER_AGENT: &str = "exodus";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default base URL of the target API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Client scoped to one target repository.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(
        api_url: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        Ok(Self::with_transport(
            api_url,
            owner,
            repo,
            token,
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        api_url: &str,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// URL under the target repository, e.g. `repo_url("/import")`.
    pub(super) fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, tail)
    }

    /// A request carrying the auth token and user agent.
    pub(super) fn authed(&self, method: Method, url: String, accept: &str) -> Request {
        Request::new(method, url)
            .header("Accept", accept)
            .header("Authorization", format!("token {}", self.token))
            .header("User-Agent", USER_AGENT)
    }

    pub(super) async fn send(&self, request: Request) -> Result<Response, GitHubError> {
        self.transport
            .send(request)
            .await
            .map_err(|e| GitHubError::Http(e.to_string()))
    }

    /// Send and map any non-2xx status to an API error.
    pub(super) async fn send_checked(&self, request: Request) -> Result<Response, GitHubError> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(GitHubError::Api {
                status: response.status,
                message: response.text(),
            });
        }
        Ok(response)
    }
}
