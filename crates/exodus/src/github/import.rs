//! The asynchronous source import: start request and poll-until-complete.

use std::time::Duration;

use tracing::debug;

use crate::credentials::{CredentialError, CredentialProvider};
use crate::migrate::{MigrateProgress, ProgressCallback, emit};
use crate::nforge::{SourceProject, VcsKind};
use crate::transport::Method;

use super::client::{GitHubClient, IMPORT_PREVIEW_ACCEPT};
use super::error::GitHubError;
use super::types::{ImportRequest, ImportStatus};

/// Status value that terminates the poll loop.
pub const IMPORT_COMPLETE: &str = "complete";

/// Account accepted by the forge's anonymous read-only subversion endpoint.
const ANON_SVN: &str = "anonsvn";

/// The VCS descriptor submitted to the import API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsDescriptor {
    pub vcs: &'static str,
    pub url: String,
    pub username: String,
    pub password: String,
}

impl VcsDescriptor {
    /// Build the descriptor for a source project.
    ///
    /// Git repositories are handed over as an https URL with the username
    /// embedded; the import API rejects plain-protocol git URLs. Anything
    /// else is checked out anonymously over the forge's read-only
    /// subversion endpoint. The forge's `staging.` host alias never serves
    /// imports, so it is stripped.
    pub fn for_project(
        project: &SourceProject,
        credentials: &dyn CredentialProvider,
    ) -> Result<Self, CredentialError> {
        let host = project.host();
        let host = host.strip_prefix("staging.").unwrap_or(host);

        Ok(match project.vcs {
            VcsKind::Git => {
                let credentials = credentials.vcs_credentials()?;
                Self {
                    vcs: "git",
                    url: format!(
                        "https://{}@{}/git/{}.git",
                        credentials.username, host, project.name
                    ),
                    username: credentials.username,
                    password: credentials.password,
                }
            }
            VcsKind::Subversion => Self {
                vcs: "subversion",
                url: format!("https://{}/svn/{}", host, project.name),
                username: ANON_SVN.to_string(),
                password: ANON_SVN.to_string(),
            },
        })
    }
}

impl GitHubClient {
    /// Submit the start-import request.
    ///
    /// Anything but 201 Created is a fatal rejection; the raw response
    /// body is carried on the error for diagnosis. On success the initial
    /// import status is returned.
    pub async fn start_import(&self, descriptor: &VcsDescriptor) -> Result<String, GitHubError> {
        let body = serde_json::to_vec(&ImportRequest {
            vcs: descriptor.vcs,
            vcs_url: &descriptor.url,
            vcs_username: &descriptor.username,
            vcs_password: &descriptor.password,
        })?;

        let request = self
            .authed(Method::Put, self.repo_url("/import"), IMPORT_PREVIEW_ACCEPT)
            .header("Content-Type", "application/json")
            .body(body);

        let response = self.send(request).await?;
        if response.status != 201 {
            return Err(GitHubError::ImportRejected {
                status: response.status,
                body: response.text(),
            });
        }

        let status: ImportStatus = serde_json::from_slice(&response.body)?;
        Ok(status.status)
    }

    /// Poll the import status once.
    pub async fn import_status(&self) -> Result<String, GitHubError> {
        let request = self.authed(Method::Get, self.repo_url("/import"), IMPORT_PREVIEW_ACCEPT);
        let response = self.send_checked(request).await?;
        let status: ImportStatus = serde_json::from_slice(&response.body)?;
        Ok(status.status)
    }

    /// Poll until the import reports `complete`, waiting `poll_interval`
    /// between polls as a courtesy to the API.
    ///
    /// Polling is bounded: after `max_attempts` polls the job is declared
    /// timed out instead of looping forever. A failed poll request is
    /// fatal. Returns the number of polls performed (zero when the start
    /// request already reported completion).
    pub async fn await_import(
        &self,
        initial_status: &str,
        poll_interval: Duration,
        max_attempts: u32,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<u32, GitHubError> {
        if initial_status == IMPORT_COMPLETE {
            return Ok(0);
        }

        let mut last_status = initial_status.to_string();
        for attempt in 1..=max_attempts {
            tokio::time::sleep(poll_interval).await;

            let status = self.import_status().await?;
            debug!(status = %status, attempt, "import status poll");
            emit(
                on_progress,
                MigrateProgress::ImportPolled {
                    status: status.clone(),
                    attempt,
                },
            );

            if status == IMPORT_COMPLETE {
                return Ok(attempt);
            }
            last_status = status;
        }

        Err(GitHubError::ImportTimeout {
            attempts: max_attempts,
            last_status,
        })
    }
}
