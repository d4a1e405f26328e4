//! Exodus - migrate a project off a legacy nFORGE-derived forge onto
//! GitHub.
//!
//! A migration run covers four concerns:
//!
//! - scraping the forge's download board into ordered release bundles,
//!   tolerating the forge's one-page listing defect and its intermittent
//!   blank detail documents;
//! - driving the target's asynchronous source import through a bounded
//!   poll-until-complete loop;
//! - recreating releases and their binary assets on the target, strictly
//!   in scrape order, once the import has completed;
//! - best-effort side work: collaborator grants and wiki export.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use url::Url;
//!
//! use exodus::credentials::EnvCredentials;
//! use exodus::github::GitHubClient;
//! use exodus::migrate::{migrate_project, MigrateOptions, VersionRule};
//! use exodus::nforge::{NforgeClient, SourceProject, VcsKind};
//!
//! let project = SourceProject::new(
//!     "d2coding",
//!     Url::parse("https://dev.example.com")?,
//!     VcsKind::Git,
//! );
//! let source = NforgeClient::new()?;
//! let target = GitHubClient::new("https://api.github.com", "me", "d2coding", token)?;
//! let rule: VersionRule = Arc::new(|name| name.to_string());
//!
//! let report = migrate_project(
//!     &source, &target, &project,
//!     &EnvCredentials::default(), &rule,
//!     &MigrateOptions::default(), None,
//! ).await?;
//! println!("releases created: {}", report.releases_created);
//! ```

pub mod credentials;
pub mod github;
pub mod migrate;
pub mod nforge;
pub mod transport;
pub mod wiki;

pub use credentials::{
    CredentialError, CredentialProvider, EnvCredentials, StaticCredentials, VcsCredentials,
};
pub use github::{GitHubClient, GitHubError, VcsDescriptor};
pub use migrate::{
    FileAsset, MigrateError, MigrateOptions, MigrateProgress, MigrationReport, ProgressCallback,
    ReleaseBundle, ReleaseDraft, VersionRule, migrate_project, scrape_releases,
};
pub use nforge::{NforgeClient, NforgeError, SourceProject, VcsKind};
