//! Core types and constants for the migration pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::nforge::ReleaseDetail;

/// Default seconds between import status polls. The wait is a rate-limit
/// courtesy to the target provider, not a performance knob.
pub const DEFAULT_WAIT_TIME_SECS: u64 = 5;

/// Default number of concurrent detail/file fetches against the source forge.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Default bound on import status polls before giving up
/// (30 minutes at the default interval).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 360;

/// Rule deriving a release tag from a release name.
///
/// How versions are embedded in release names is a project-specific
/// convention, so the rule is injected by the caller rather than guessed
/// here.
pub type VersionRule = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A release to recreate on the target, in the shape the release API
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDraft {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
    pub draft: bool,
}

impl ReleaseDraft {
    /// Build a draft from a fetched release document.
    ///
    /// Imported repositories get their history on `master`, so that is
    /// what releases are tagged against.
    pub fn from_detail(detail: &ReleaseDetail, version_rule: &VersionRule) -> Self {
        Self {
            tag_name: version_rule.as_ref()(&detail.name),
            target_commitish: "master".to_string(),
            name: detail.name.clone(),
            body: detail.description.clone(),
            prerelease: false,
            draft: false,
        }
    }
}

/// A binary attachment downloaded from the source forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAsset {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub data: Vec<u8>,
}

/// A draft together with its attachments.
///
/// The pairing is structural: an asset can only ever belong to the bundle
/// that carries it, so draft/asset alignment cannot drift.
#[derive(Debug, Clone)]
pub struct ReleaseBundle {
    pub draft: ReleaseDraft,
    pub assets: Vec<FileAsset>,
}

/// What the scraper produced.
#[derive(Debug, Default)]
pub struct ScrapeResult {
    /// Bundles in listing order.
    pub bundles: Vec<ReleaseBundle>,
    /// Listed identifiers skipped because their document came back blank.
    pub skipped: usize,
}

/// Tunables for a migration run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Wait between import status polls.
    pub poll_interval: Duration,
    /// Polls before the import is declared timed out.
    pub max_poll_attempts: u32,
    /// Concurrent fetches against the source forge.
    pub fetch_concurrency: usize,
    /// Where to write the project's wiki pages, if anywhere.
    pub wiki_dir: Option<PathBuf>,
    /// Skip collaborator grants.
    pub skip_collaborators: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_WAIT_TIME_SECS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            wiki_dir: None,
            skip_collaborators: false,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Releases recreated on the target.
    pub releases_created: usize,
    /// Assets uploaded across all releases.
    pub assets_uploaded: usize,
    /// Listed releases skipped because their document came back blank.
    pub blank_skipped: usize,
    /// Collaborators granted access.
    pub collaborators_added: usize,
    /// Per-username grant failures (`user: error`). Never fatal.
    pub collaborator_errors: Vec<String>,
    /// Wiki pages written to disk.
    pub wiki_pages_written: usize,
    /// Import status polls performed before completion.
    pub import_polls: u32,
}

#[cfg(test)]
mod tests {
    use crate::nforge::FileEntry;

    use super::*;

    #[test]
    fn migrate_options_defaults_match_constants() {
        let options = MigrateOptions::default();
        assert_eq!(
            options.poll_interval,
            Duration::from_secs(DEFAULT_WAIT_TIME_SECS)
        );
        assert_eq!(options.max_poll_attempts, DEFAULT_MAX_POLL_ATTEMPTS);
        assert_eq!(options.fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);
        assert!(options.wiki_dir.is_none());
        assert!(!options.skip_collaborators);
    }

    #[test]
    fn draft_from_detail_applies_the_version_rule() {
        let detail = ReleaseDetail {
            name: "d2coding 1.3.2".to_string(),
            description: "hinting update".to_string(),
            files: vec![FileEntry {
                id: "1".into(),
                name: "D2Coding.zip".into(),
            }],
        };
        let rule: VersionRule = Arc::new(|name| name.rsplit(' ').next().unwrap_or(name).to_string());

        let draft = ReleaseDraft::from_detail(&detail, &rule);
        assert_eq!(draft.tag_name, "1.3.2");
        assert_eq!(draft.target_commitish, "master");
        assert_eq!(draft.name, "d2coding 1.3.2");
        assert_eq!(draft.body, "hinting update");
        assert!(!draft.prerelease);
        assert!(!draft.draft);
    }

    #[test]
    fn draft_serializes_with_the_release_api_field_names() {
        let rule: VersionRule = Arc::new(|name| name.to_string());
        let detail = ReleaseDetail {
            name: "v1".to_string(),
            description: String::new(),
            files: Vec::new(),
        };

        let json = serde_json::to_value(ReleaseDraft::from_detail(&detail, &rule)).unwrap();
        assert_eq!(json["tag_name"], "v1");
        assert_eq!(json["target_commitish"], "master");
        assert_eq!(json["prerelease"], false);
        assert_eq!(json["draft"], false);
    }
}
