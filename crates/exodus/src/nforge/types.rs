use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Version control system hosted by the source forge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Subversion,
}

impl VcsKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Subversion => "subversion",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown vcs kind: {0} (expected git, svn, or subversion)")]
pub struct UnknownVcsKind(String);

impl FromStr for VcsKind {
    type Err = UnknownVcsKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(VcsKind::Git),
            "svn" | "subversion" => Ok(VcsKind::Subversion),
            other => Err(UnknownVcsKind(other.to_string())),
        }
    }
}

/// A project on the source forge. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct SourceProject {
    /// Project name, as it appears in forge URLs.
    pub name: String,
    /// Base URL of the forge API.
    pub api_url: Url,
    /// Session cookie for boards that require a login.
    pub session_cookie: Option<String>,
    /// The VCS the project's source lives in.
    pub vcs: VcsKind,
    /// Usernames of the project's developers.
    pub developers: Vec<String>,
    /// Exported wiki pages, title to markdown content. Ordered so wiki
    /// export output is deterministic.
    pub wiki_pages: BTreeMap<String, String>,
}

impl SourceProject {
    pub fn new(name: impl Into<String>, api_url: Url, vcs: VcsKind) -> Self {
        Self {
            name: name.into(),
            api_url,
            session_cookie: None,
            vcs,
            developers: Vec::new(),
            wiki_pages: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie;
        self
    }

    #[must_use]
    pub fn with_developers(mut self, developers: Vec<String>) -> Self {
        self.developers = developers;
        self
    }

    #[must_use]
    pub fn with_wiki_pages(mut self, pages: BTreeMap<String, String>) -> Self {
        self.wiki_pages = pages;
        self
    }

    fn api_base(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }

    /// Root URL of the project on the forge.
    #[must_use]
    pub fn project_url(&self) -> String {
        format!("{}/{}", self.api_base(), self.name)
    }

    /// URL of the download-board listing document.
    #[must_use]
    pub fn listing_url(&self) -> String {
        format!("{}/download.xml", self.project_url())
    }

    /// URL of one release's detail document.
    #[must_use]
    pub fn release_url(&self, release_id: &str) -> String {
        format!("{}/download/{}.xml", self.project_url(), release_id)
    }

    /// Download URL for one attached file.
    #[must_use]
    pub fn file_url(&self, file_id: &str, file_name: &str) -> String {
        format!("{}/frs/download.php/{}/{}", self.api_base(), file_id, file_name)
    }

    /// Host name of the forge.
    #[must_use]
    pub fn host(&self) -> &str {
        self.api_url.host_str().unwrap_or_default()
    }
}

/// One release document fetched from the download board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDetail {
    pub name: String,
    pub description: String,
    /// Attached files, in document order. Empty when the release ships
    /// nothing.
    pub files: Vec<FileEntry>,
}

/// A file attachment listed in a release document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
}

impl FileEntry {
    /// The text after the last dot, or the whole name when there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
