//! Release metadata and asset scraping.
//!
//! Produces the ordered release bundles the reconstruction pipeline will
//! replay onto the target. Detail and file fetches for distinct releases
//! are independent read-only requests, so they run concurrently under a
//! bounded semaphore; results are collected back in listing order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::nforge::{NforgeClient, ReleaseDetail, SourceProject};

use super::engine::MigrateError;
use super::progress::{MigrateProgress, ProgressCallback, emit};
use super::types::{FileAsset, ReleaseBundle, ReleaseDraft, ScrapeResult, VersionRule};

/// Scrape the project's download board into ordered release bundles.
///
/// Identifiers whose detail document comes back blank are skipped entirely
/// — no draft, no asset slot — so the bundle list only ever contains
/// materialized releases. Every other failure propagates.
pub async fn scrape_releases(
    client: &NforgeClient,
    project: &SourceProject,
    version_rule: &VersionRule,
    concurrency: usize,
    on_progress: Option<&ProgressCallback>,
) -> Result<ScrapeResult, MigrateError> {
    emit(
        on_progress,
        MigrateProgress::FetchingReleases {
            project: project.name.clone(),
        },
    );

    let ids = client.release_ids(project).await.map_err(MigrateError::Source)?;
    emit(on_progress, MigrateProgress::ReleasesListed { count: ids.len() });

    let concurrency = concurrency.clamp(1, ids.len().max(1));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let mut handles = Vec::with_capacity(ids.len());
    for release_id in ids {
        let client = client.clone();
        let project = project.clone();
        let semaphore = Arc::clone(&semaphore);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| MigrateError::Internal("semaphore closed unexpectedly".to_string()))?;

            let Some(detail) = client
                .release_detail(&project, &release_id)
                .await
                .map_err(MigrateError::Source)?
            else {
                return Ok((release_id, None));
            };

            let assets = fetch_assets(&client, &project, &detail).await?;
            Ok::<_, MigrateError>((release_id, Some((detail, assets))))
        }));
    }

    // Await in spawn order so bundles keep the listing order regardless of
    // which fetches finish first.
    let mut result = ScrapeResult::default();
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|e| MigrateError::Internal(e.to_string()))??;

        match outcome {
            (release_id, None) => {
                debug!(release_id = %release_id, "blank release document, skipping");
                emit(on_progress, MigrateProgress::BlankDetail { release_id });
                result.skipped += 1;
            }
            (release_id, Some((detail, assets))) => {
                emit(
                    on_progress,
                    MigrateProgress::ReleaseFetched {
                        release_id,
                        name: detail.name.clone(),
                        assets: assets.len(),
                    },
                );
                result.bundles.push(ReleaseBundle {
                    draft: ReleaseDraft::from_detail(&detail, version_rule),
                    assets,
                });
            }
        }
    }

    emit(
        on_progress,
        MigrateProgress::ScrapeComplete {
            releases: result.bundles.len(),
            skipped: result.skipped,
        },
    );
    Ok(result)
}

async fn fetch_assets(
    client: &NforgeClient,
    project: &SourceProject,
    detail: &ReleaseDetail,
) -> Result<Vec<FileAsset>, MigrateError> {
    let mut assets = Vec::with_capacity(detail.files.len());
    for entry in &detail.files {
        let data = client
            .download_file(project, entry)
            .await
            .map_err(MigrateError::Source)?;
        assets.push(FileAsset {
            id: entry.id.clone(),
            name: entry.name.clone(),
            extension: entry.extension().to_string(),
            data,
        });
    }
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::nforge::VcsKind;
    use crate::transport::Method;
    use crate::transport::canned::CannedTransport;

    use super::*;

    const BASE: &str = "https://dev.example.com";

    fn project() -> SourceProject {
        SourceProject::new("proj", Url::parse(BASE).unwrap(), VcsKind::Git)
    }

    fn rule() -> VersionRule {
        Arc::new(|name: &str| name.rsplit(' ').next().unwrap_or(name).to_string())
    }

    fn listing(transport: &CannedTransport, ids: &[&str]) {
        let body: String = ids
            .iter()
            .map(|id| format!("<release_id>{id}</release_id>"))
            .collect();
        transport.reply(
            Method::Get,
            format!("{BASE}/proj/download.xml"),
            200,
            format!("<downloads>{body}</downloads>").as_bytes(),
        );
    }

    fn detail(transport: &CannedTransport, id: &str, name: &str, files: &[(&str, &str)]) {
        let files_xml: String = files
            .iter()
            .map(|(fid, fname)| format!("<file><id>{fid}</id><name>{fname}</name></file>"))
            .collect();
        let body = if files.is_empty() {
            format!("<release><name>{name}</name><description>notes</description></release>")
        } else {
            format!(
                "<release><name>{name}</name><description>notes</description><files>{files_xml}</files></release>"
            )
        };
        transport.reply(
            Method::Get,
            format!("{BASE}/proj/download/{id}.xml"),
            200,
            body.as_bytes(),
        );
    }

    #[tokio::test]
    async fn blank_details_are_skipped_without_leaving_a_slot() {
        let transport = CannedTransport::new();
        listing(&transport, &["1", "2", "3"]);
        detail(&transport, "1", "proj 1.0", &[]);
        transport.reply(Method::Get, format!("{BASE}/proj/download/2.xml"), 200, b"");
        detail(&transport, "3", "proj 3.0", &[]);

        let client = NforgeClient::with_transport(Arc::new(transport));
        let result = scrape_releases(&client, &project(), &rule(), 2, None)
            .await
            .unwrap();

        assert_eq!(result.bundles.len(), 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.bundles[0].draft.name, "proj 1.0");
        assert_eq!(result.bundles[1].draft.name, "proj 3.0");
    }

    #[tokio::test]
    async fn bundles_keep_listing_order_even_with_concurrency() {
        let transport = CannedTransport::new();
        listing(&transport, &["9", "4", "7"]);
        detail(&transport, "9", "proj 9.0", &[]);
        detail(&transport, "4", "proj 4.0", &[]);
        detail(&transport, "7", "proj 7.0", &[]);

        let client = NforgeClient::with_transport(Arc::new(transport));
        let result = scrape_releases(&client, &project(), &rule(), 3, None)
            .await
            .unwrap();

        let tags: Vec<_> = result
            .bundles
            .iter()
            .map(|b| b.draft.tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["9.0", "4.0", "7.0"]);
    }

    #[tokio::test]
    async fn assets_are_downloaded_into_their_bundle() {
        let transport = CannedTransport::new();
        listing(&transport, &["1"]);
        detail(
            &transport,
            "1",
            "proj 1.0",
            &[("10", "a.zip"), ("11", "b.tar.gz")],
        );
        transport.reply(
            Method::Get,
            format!("{BASE}/frs/download.php/10/a.zip"),
            200,
            b"aa",
        );
        transport.reply(
            Method::Get,
            format!("{BASE}/frs/download.php/11/b.tar.gz"),
            200,
            b"bb",
        );

        let client = NforgeClient::with_transport(Arc::new(transport));
        let result = scrape_releases(&client, &project(), &rule(), 1, None)
            .await
            .unwrap();

        let bundle = &result.bundles[0];
        assert_eq!(bundle.assets.len(), 2);
        assert_eq!(bundle.assets[0].name, "a.zip");
        assert_eq!(bundle.assets[0].extension, "zip");
        assert_eq!(bundle.assets[0].data, b"aa".to_vec());
        assert_eq!(bundle.assets[1].extension, "gz");
    }

    #[tokio::test]
    async fn release_without_files_yields_an_empty_asset_list() {
        let transport = CannedTransport::new();
        listing(&transport, &["1"]);
        detail(&transport, "1", "proj 1.0", &[]);

        let client = NforgeClient::with_transport(Arc::new(transport));
        let result = scrape_releases(&client, &project(), &rule(), 1, None)
            .await
            .unwrap();

        assert_eq!(result.bundles.len(), 1);
        assert!(result.bundles[0].assets.is_empty());
    }

    #[tokio::test]
    async fn detail_fetch_failures_propagate() {
        let transport = CannedTransport::new();
        listing(&transport, &["1"]);
        transport.reply(
            Method::Get,
            format!("{BASE}/proj/download/1.xml"),
            502,
            b"bad gateway",
        );

        let client = NforgeClient::with_transport(Arc::new(transport));
        let err = scrape_releases(&client, &project(), &rule(), 1, None)
            .await
            .expect_err("502 must propagate");
        assert!(matches!(err, MigrateError::Source(_)));
    }

    #[tokio::test]
    async fn progress_events_count_blank_and_fetched_releases() {
        use std::sync::Mutex;

        let transport = CannedTransport::new();
        listing(&transport, &["1", "2"]);
        detail(&transport, "1", "proj 1.0", &[]);
        transport.reply(Method::Get, format!("{BASE}/proj/download/2.xml"), 200, b"");

        let events: Arc<Mutex<Vec<MigrateProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| sink.lock().unwrap().push(event));

        let client = NforgeClient::with_transport(Arc::new(transport));
        scrape_releases(&client, &project(), &rule(), 1, Some(&callback))
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, MigrateProgress::BlankDetail { release_id } if release_id == "2")));
        assert!(events
            .iter()
            .any(|e| matches!(e, MigrateProgress::ScrapeComplete { releases: 1, skipped: 1 })));
    }
}
