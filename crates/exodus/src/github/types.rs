//! Wire types for the REST endpoints used during migration.

use serde::{Deserialize, Serialize};

/// Body of the start-import request.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRequest<'a> {
    pub vcs: &'a str,
    pub vcs_url: &'a str,
    pub vcs_username: &'a str,
    pub vcs_password: &'a str,
}

/// Status document returned by the import endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportStatus {
    pub status: String,
}

/// The subset of the create-release response needed for asset uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRelease {
    pub id: u64,
    pub upload_url: String,
}

impl CreatedRelease {
    /// The upload URL arrives as an RFC 6570 template
    /// (`.../assets{?name,label}`); return it with the template suffix
    /// stripped.
    #[must_use]
    pub fn upload_endpoint(&self) -> &str {
        self.upload_url
            .split('{')
            .next()
            .unwrap_or(&self.upload_url)
    }
}
