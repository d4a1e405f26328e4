//! Client for the target host's REST API.
//!
//! Only the endpoints the migration needs are implemented: the source
//! import API (start + poll), release creation, asset upload, and
//! collaborator grants. Everything goes through the shared transport so
//! tests can run against a canned one.

mod client;
mod error;
mod import;
mod release;
mod types;

pub use client::{DEFAULT_API_URL, GitHubClient};
pub use error::GitHubError;
pub use import::{IMPORT_COMPLETE, VcsDescriptor};
pub use types::{CreatedRelease, ImportStatus};
