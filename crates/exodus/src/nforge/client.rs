use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::transport::{HttpTransport, Method, Request, ReqwestTransport, Response};

use super::error::NforgeError;
use super::parse;
use super::types::{FileEntry, ReleaseDetail, SourceProject};

const USER_AGENT: &str = "exodus";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the source forge's download board.
#[derive(Clone)]
pub struct NforgeClient {
    transport: Arc<dyn HttpTransport>,
}

impl NforgeClient {
    pub fn new() -> Result<Self, NforgeError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)
            .map_err(|e| NforgeError::Http(e.to_string()))?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn request(&self, project: &SourceProject, url: &str) -> Request {
        let mut request = Request::new(Method::Get, url).header("User-Agent", USER_AGENT);
        if let Some(cookie) = &project.session_cookie {
            request = request.header("Cookie", cookie);
        }
        request
    }

    async fn fetch(&self, project: &SourceProject, url: String) -> Result<Response, NforgeError> {
        let response = self
            .transport
            .send(self.request(project, &url))
            .await
            .map_err(|e| NforgeError::Http(e.to_string()))?;

        if !response.is_success() {
            return Err(NforgeError::Api {
                status: response.status,
                url,
            });
        }

        Ok(response)
    }

    /// Fetch the ordered release identifiers from the download listing.
    ///
    /// The listing endpoint returns a single page of identifiers no matter
    /// what request parameters are sent, so the result is best-effort
    /// complete rather than the project's full history.
    pub async fn release_ids(&self, project: &SourceProject) -> Result<Vec<String>, NforgeError> {
        let response = self.fetch(project, project.listing_url()).await?;
        let ids = parse::parse_release_ids(&response.text())?;
        debug!(project = %project.name, count = ids.len(), "release listing fetched");
        Ok(ids)
    }

    /// Fetch one release's detail document.
    ///
    /// Returns `Ok(None)` when the forge answers with an empty payload,
    /// which it intermittently does for valid identifiers; callers skip
    /// such releases entirely.
    pub async fn release_detail(
        &self,
        project: &SourceProject,
        release_id: &str,
    ) -> Result<Option<ReleaseDetail>, NforgeError> {
        let response = self.fetch(project, project.release_url(release_id)).await?;
        if response.body.is_empty() {
            return Ok(None);
        }
        parse::parse_release_detail(&response.text()).map(Some)
    }

    /// Download the raw bytes of one attached file.
    pub async fn download_file(
        &self,
        project: &SourceProject,
        entry: &FileEntry,
    ) -> Result<Vec<u8>, NforgeError> {
        let response = self
            .fetch(project, project.file_url(&entry.id, &entry.name))
            .await?;
        Ok(response.body)
    }
}
