//! The migration run.
//!
//! Sequencing matters in exactly one place: releases can only be recreated
//! after the source import reports `complete`, because the target
//! repository's release namespace does not exist in a usable state before
//! that. Everything else (wiki pages, scraping, collaborator grants) is
//! independent of the import and runs before it.

use thiserror::Error;
use tracing::warn;

use crate::credentials::{CredentialError, CredentialProvider};
use crate::github::{GitHubClient, GitHubError, VcsDescriptor};
use crate::nforge::{NforgeClient, NforgeError, SourceProject};
use crate::wiki;

use super::progress::{MigrateProgress, ProgressCallback, emit};
use super::scrape::scrape_releases;
use super::types::{MigrateOptions, MigrationReport, ReleaseBundle, VersionRule};

/// Errors that abort a migration run.
///
/// Collaborator grant failures and wiki export failures are deliberately
/// absent: they are absorbed, logged, and reported in the
/// [`MigrationReport`].
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The source forge failed.
    #[error(transparent)]
    Source(#[from] NforgeError),

    /// The target host failed outside the release pipeline.
    #[error(transparent)]
    Target(#[from] GitHubError),

    /// Credentials for the import request could not be obtained.
    #[error("could not obtain import credentials: {0}")]
    Credentials(#[from] CredentialError),

    /// The release pipeline failed partway; everything already created
    /// stays on the target (there is no rollback).
    #[error("release pipeline failed after {created} of {total} releases: {source}")]
    ReleasePipeline {
        created: usize,
        total: usize,
        #[source]
        source: GitHubError,
    },

    #[error("{0}")]
    Internal(String),
}

/// Run a full migration: wiki pages, scrape, collaborators, import,
/// releases.
///
/// Returns a [`MigrationReport`] summarizing what was done. The run is not
/// atomic: a fatal error leaves whatever was already created in place, and
/// the error says how far the release pipeline got.
pub async fn migrate_project(
    source: &NforgeClient,
    target: &GitHubClient,
    project: &SourceProject,
    credentials: &dyn CredentialProvider,
    version_rule: &VersionRule,
    options: &MigrateOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<MigrationReport, MigrateError> {
    let mut report = MigrationReport::default();

    // Wiki pages go to disk up front; nothing downstream depends on them
    // and a failure must not stop the migration.
    if let Some(wiki_dir) = &options.wiki_dir
        && !project.wiki_pages.is_empty()
    {
        match wiki::write_pages(wiki_dir, target.repo(), &project.wiki_pages) {
            Ok(_) => {
                report.wiki_pages_written = project.wiki_pages.len();
                emit(
                    on_progress,
                    MigrateProgress::WikiPagesWritten {
                        count: report.wiki_pages_written,
                    },
                );
            }
            Err(e) => {
                warn!(error = %e, "wiki export failed");
                emit(
                    on_progress,
                    MigrateProgress::Warning {
                        message: format!("wiki export failed: {e}"),
                    },
                );
            }
        }
    }

    let scraped = scrape_releases(
        source,
        project,
        version_rule,
        options.fetch_concurrency,
        on_progress,
    )
    .await?;
    report.blank_skipped = scraped.skipped;

    if !options.skip_collaborators {
        add_collaborators(target, &project.developers, &mut report, on_progress).await;
    }

    let descriptor = VcsDescriptor::for_project(project, credentials)?;
    let initial_status = target.start_import(&descriptor).await?;
    emit(
        on_progress,
        MigrateProgress::ImportStarted {
            status: initial_status.clone(),
        },
    );

    report.import_polls = target
        .await_import(
            &initial_status,
            options.poll_interval,
            options.max_poll_attempts,
            on_progress,
        )
        .await?;
    emit(
        on_progress,
        MigrateProgress::ImportComplete {
            attempts: report.import_polls,
        },
    );

    publish_releases(target, &scraped.bundles, &mut report, on_progress).await?;

    Ok(report)
}

/// Grant repository access to each source developer.
///
/// Grants are isolated: a failed username (unknown account, naming
/// mismatch) is recorded and the rest proceed.
async fn add_collaborators(
    target: &GitHubClient,
    usernames: &[String],
    report: &mut MigrationReport,
    on_progress: Option<&ProgressCallback>,
) {
    if usernames.is_empty() {
        return;
    }
    emit(
        on_progress,
        MigrateProgress::AddingCollaborators {
            count: usernames.len(),
        },
    );

    for username in usernames {
        match target.add_collaborator(username).await {
            Ok(()) => {
                report.collaborators_added += 1;
                emit(
                    on_progress,
                    MigrateProgress::CollaboratorAdded {
                        username: username.clone(),
                    },
                );
            }
            Err(e) => {
                warn!(username = %username, error = %e, "collaborator grant failed");
                report.collaborator_errors.push(format!("{username}: {e}"));
                emit(
                    on_progress,
                    MigrateProgress::CollaboratorError {
                        username: username.clone(),
                        error: e.to_string(),
                    },
                );
            }
        }
    }
}

/// Recreate each release on the target, strictly in scrape order, and
/// upload its assets before moving to the next release.
///
/// A failure aborts the remainder; whatever was already created stays.
async fn publish_releases(
    target: &GitHubClient,
    bundles: &[ReleaseBundle],
    report: &mut MigrationReport,
    on_progress: Option<&ProgressCallback>,
) -> Result<(), MigrateError> {
    let total = bundles.len();
    emit(on_progress, MigrateProgress::PublishingReleases { count: total });

    for bundle in bundles {
        let created = target
            .create_release(&bundle.draft)
            .await
            .map_err(|source| MigrateError::ReleasePipeline {
                created: report.releases_created,
                total,
                source,
            })?;
        emit(
            on_progress,
            MigrateProgress::ReleaseCreated {
                tag: bundle.draft.tag_name.clone(),
                name: bundle.draft.name.clone(),
            },
        );

        for asset in &bundle.assets {
            target
                .upload_asset(&created, asset)
                .await
                .map_err(|source| MigrateError::ReleasePipeline {
                    created: report.releases_created,
                    total,
                    source,
                })?;
            report.assets_uploaded += 1;
            emit(
                on_progress,
                MigrateProgress::AssetUploaded {
                    release_tag: bundle.draft.tag_name.clone(),
                    name: asset.name.clone(),
                },
            );
        }

        report.releases_created += 1;
    }

    emit(
        on_progress,
        MigrateProgress::PublishComplete {
            releases: report.releases_created,
            assets: report.assets_uploaded,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use url::Url;

    use crate::credentials::StaticCredentials;
    use crate::nforge::VcsKind;
    use crate::transport::Method;
    use crate::transport::canned::CannedTransport;

    use super::super::types::VersionRule;
    use super::*;

    const FORGE: &str = "https://forge.example.com";
    const API: &str = "https://api.github.com";
    const IMPORT_URL: &str = "https://api.github.com/repos/octo/migrated/import";
    const RELEASES_URL: &str = "https://api.github.com/repos/octo/migrated/releases";

    struct Fixture {
        transport: CannedTransport,
        source: NforgeClient,
        target: GitHubClient,
        project: SourceProject,
    }

    fn fixture() -> Fixture {
        let transport = CannedTransport::new();
        let shared: Arc<dyn crate::transport::HttpTransport> = Arc::new(transport.clone());
        Fixture {
            source: NforgeClient::with_transport(Arc::clone(&shared)),
            target: GitHubClient::with_transport(API, "octo", "migrated", "t0ken", shared),
            project: SourceProject::new("proj", Url::parse(FORGE).unwrap(), VcsKind::Git),
            transport,
        }
    }

    fn rule() -> VersionRule {
        Arc::new(|name: &str| name.rsplit(' ').next().unwrap_or(name).to_string())
    }

    fn options() -> MigrateOptions {
        MigrateOptions {
            poll_interval: std::time::Duration::from_millis(1),
            ..MigrateOptions::default()
        }
    }

    fn mount_listing(transport: &CannedTransport, ids: &[&str]) {
        let body: String = ids
            .iter()
            .map(|id| format!("<release_id>{id}</release_id>"))
            .collect();
        transport.reply(
            Method::Get,
            format!("{FORGE}/proj/download.xml"),
            200,
            format!("<downloads>{body}</downloads>").as_bytes(),
        );
    }

    fn mount_detail(transport: &CannedTransport, id: &str, name: &str) {
        transport.reply(
            Method::Get,
            format!("{FORGE}/proj/download/{id}.xml"),
            200,
            format!("<release><name>{name}</name><description>notes</description></release>")
                .as_bytes(),
        );
    }

    fn mount_import(transport: &CannedTransport, poll_statuses: &[&str]) {
        transport.reply_json(Method::Put, IMPORT_URL, 201, json!({"status": "importing"}));
        for status in poll_statuses {
            transport.reply_json(Method::Get, IMPORT_URL, 200, json!({"status": status}));
        }
    }

    fn mount_release(transport: &CannedTransport, id: u64) {
        transport.reply_json(
            Method::Post,
            RELEASES_URL,
            201,
            json!({
                "id": id,
                "upload_url": format!("https://uploads.example.com/releases/{id}/assets{{?name,label}}"),
            }),
        );
    }

    #[tokio::test(start_paused = true)]
    async fn releases_are_published_only_after_the_import_completes() {
        let f = fixture();
        mount_listing(&f.transport, &["1", "2"]);
        mount_detail(&f.transport, "1", "proj 1.0");
        mount_detail(&f.transport, "2", "proj 2.0");
        mount_import(&f.transport, &["importing", "complete"]);
        mount_release(&f.transport, 1);
        mount_release(&f.transport, 2);

        let credentials = StaticCredentials::new("alice", "hunter2");
        let report = migrate_project(
            &f.source,
            &f.target,
            &f.project,
            &credentials,
            &rule(),
            &options(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.releases_created, 2);
        assert_eq!(report.import_polls, 2);

        // Every release request must come after the last import poll.
        let lines = f.transport.seen_lines();
        let last_poll = lines
            .iter()
            .rposition(|l| l == &format!("GET {IMPORT_URL}"))
            .expect("polls happened");
        let first_release = lines
            .iter()
            .position(|l| l == &format!("POST {RELEASES_URL}"))
            .expect("releases created");
        assert!(last_poll < first_release);
    }

    #[tokio::test(start_paused = true)]
    async fn release_order_matches_listing_order() {
        let f = fixture();
        mount_listing(&f.transport, &["5", "3"]);
        mount_detail(&f.transport, "5", "proj 5.0");
        mount_detail(&f.transport, "3", "proj 3.0");
        mount_import(&f.transport, &["complete"]);
        mount_release(&f.transport, 1);
        mount_release(&f.transport, 2);

        let credentials = StaticCredentials::new("alice", "hunter2");
        migrate_project(
            &f.source,
            &f.target,
            &f.project,
            &credentials,
            &rule(),
            &options(),
            None,
        )
        .await
        .unwrap();

        let tags: Vec<String> = f
            .transport
            .seen()
            .into_iter()
            .filter(|r| r.url == RELEASES_URL)
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["tag_name"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(tags, vec!["5.0", "3.0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn a_rejected_import_prevents_any_release_creation() {
        let f = fixture();
        mount_listing(&f.transport, &["1"]);
        mount_detail(&f.transport, "1", "proj 1.0");
        f.transport
            .reply(Method::Put, IMPORT_URL, 422, br#"{"message":"nope"}"#);

        let credentials = StaticCredentials::new("alice", "hunter2");
        let err = migrate_project(
            &f.source,
            &f.target,
            &f.project,
            &credentials,
            &rule(),
            &options(),
            None,
        )
        .await
        .expect_err("422 must abort the run");

        assert!(matches!(
            err,
            MigrateError::Target(GitHubError::ImportRejected { status: 422, .. })
        ));
        assert!(
            !f.transport
                .seen_lines()
                .iter()
                .any(|l| l == &format!("POST {RELEASES_URL}")),
            "no release may be created after a rejected import"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_failed_collaborator_grant_does_not_stop_the_rest() {
        let f = fixture();
        mount_listing(&f.transport, &[]);
        mount_import(&f.transport, &["complete"]);
        f.transport.reply(
            Method::Put,
            format!("{API}/repos/octo/migrated/collaborators/ghost"),
            404,
            b"Not Found",
        );
        f.transport.reply(
            Method::Put,
            format!("{API}/repos/octo/migrated/collaborators/alice"),
            204,
            b"",
        );

        let mut project = f.project.clone();
        project.developers = vec!["ghost".to_string(), "alice".to_string()];

        let credentials = StaticCredentials::new("alice", "hunter2");
        let report = migrate_project(
            &f.source,
            &f.target,
            &project,
            &credentials,
            &rule(),
            &options(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.collaborators_added, 1);
        assert_eq!(report.collaborator_errors.len(), 1);
        assert!(report.collaborator_errors[0].starts_with("ghost:"));
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_release_reports_how_far_the_pipeline_got() {
        let f = fixture();
        mount_listing(&f.transport, &["1", "2"]);
        mount_detail(&f.transport, "1", "proj 1.0");
        mount_detail(&f.transport, "2", "proj 2.0");
        mount_import(&f.transport, &["complete"]);
        mount_release(&f.transport, 1);
        f.transport.reply(
            Method::Post,
            RELEASES_URL,
            422,
            br#"{"message":"already_exists"}"#,
        );

        let credentials = StaticCredentials::new("alice", "hunter2");
        let err = migrate_project(
            &f.source,
            &f.target,
            &f.project,
            &credentials,
            &rule(),
            &options(),
            None,
        )
        .await
        .expect_err("second release fails");

        match err {
            MigrateError::ReleasePipeline { created, total, .. } => {
                assert_eq!(created, 1);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn skip_collaborators_suppresses_grant_requests() {
        let f = fixture();
        mount_listing(&f.transport, &[]);
        mount_import(&f.transport, &["complete"]);

        let mut project = f.project.clone();
        project.developers = vec!["alice".to_string()];

        let options = MigrateOptions {
            skip_collaborators: true,
            ..options()
        };
        let credentials = StaticCredentials::new("alice", "hunter2");
        let report = migrate_project(
            &f.source,
            &f.target,
            &project,
            &credentials,
            &rule(),
            &options,
            None,
        )
        .await
        .unwrap();

        assert_eq!(report.collaborators_added, 0);
        assert!(
            !f.transport
                .seen_lines()
                .iter()
                .any(|l| l.contains("/collaborators/"))
        );
    }
}
