//! Progress events emitted during a migration run.
//!
//! The library reports progress through a callback so the CLI can render
//! either progress bars or log lines without the pipeline knowing which.

/// Progress events emitted during a migration run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MigrateProgress {
    /// Starting to fetch the release listing.
    FetchingReleases {
        /// Source project name.
        project: String,
    },

    /// The listing was fetched. The count reflects one listing page — the
    /// forge never returns more — so it may undercount the full history.
    ReleasesListed { count: usize },

    /// A listed release's document came back blank and was skipped.
    BlankDetail { release_id: String },

    /// A release document and its attachments were fetched.
    ReleaseFetched {
        release_id: String,
        name: String,
        /// Attachments downloaded for this release.
        assets: usize,
    },

    /// Scraping finished.
    ScrapeComplete { releases: usize, skipped: usize },

    /// Wiki pages were written to disk.
    WikiPagesWritten { count: usize },

    /// Starting collaborator grants.
    AddingCollaborators { count: usize },

    /// One collaborator was granted access.
    CollaboratorAdded { username: String },

    /// One collaborator grant failed (non-fatal).
    CollaboratorError { username: String, error: String },

    /// The import request was accepted; `status` is the initial state.
    ImportStarted { status: String },

    /// One import status poll was performed.
    ImportPolled { status: String, attempt: u32 },

    /// The import reported `complete` after `attempts` polls.
    ImportComplete { attempts: u32 },

    /// Starting to recreate releases on the target.
    PublishingReleases { count: usize },

    /// One release was created.
    ReleaseCreated { tag: String, name: String },

    /// One asset was uploaded.
    AssetUploaded { release_tag: String, name: String },

    /// All releases and assets were recreated.
    PublishComplete { releases: usize, assets: usize },

    /// Non-fatal warning.
    Warning { message: String },
}

/// Callback for progress updates during a migration run.
pub type ProgressCallback = Box<dyn Fn(MigrateProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: MigrateProgress) {
    if let Some(callback) = on_progress {
        callback(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn emit_invokes_the_callback() {
        let events: Arc<Mutex<Vec<MigrateProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            sink.lock().unwrap().push(event);
        });

        emit(
            Some(&callback),
            MigrateProgress::ReleasesListed { count: 3 },
        );
        emit(
            Some(&callback),
            MigrateProgress::BlankDetail {
                release_id: "42".to_string(),
            },
        );

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            MigrateProgress::ReleasesListed { count: 3 }
        ));
        assert!(matches!(events[1], MigrateProgress::BlankDetail { .. }));
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(None, MigrateProgress::ImportComplete { attempts: 2 });
    }

    #[test]
    fn events_carry_their_fields_in_debug_output() {
        let event = MigrateProgress::ReleaseCreated {
            tag: "1.3.2".to_string(),
            name: "d2coding 1.3.2".to_string(),
        };
        let debug = format!("{event:?}");
        assert!(debug.contains("ReleaseCreated"));
        assert!(debug.contains("1.3.2"));
    }
}
