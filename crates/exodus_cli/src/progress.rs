//! Progress reporting for migration runs.
//!
//! Two modes:
//! - Interactive mode (TTY): animated progress bars using indicatif
//! - Logging mode (non-TTY): structured logging using tracing
//!
//! Bars are organized as one per pipeline phase: scraping the download
//! board, waiting on the import, and publishing releases.

use std::sync::{Arc, Mutex};

use console::Term;
use exodus::migrate::{MigrateProgress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter)
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: MigrateProgress) {
        match self {
            Self::Interactive(reporter) => reporter.handle(event),
            Self::Logging(reporter) => reporter.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(reporter) = self {
            reporter.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Bars {
    scrape: Option<ProgressBar>,
    import: Option<ProgressBar>,
    publish: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    bars: Mutex<Bars>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(Bars::default()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:>10} [{bar:30}] {pos}/{len} {msg}")
            .expect("static template")
            .progress_chars("=> ")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:>10} {spinner} {msg}").expect("static template")
    }

    fn handle(&self, event: MigrateProgress) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        match event {
            MigrateProgress::ReleasesListed { count } => {
                let bar = self.multi.add(ProgressBar::new(count as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix("scrape");
                bars.scrape = Some(bar);
            }
            MigrateProgress::ReleaseFetched { name, .. } => {
                if let Some(bar) = &bars.scrape {
                    bar.set_message(name);
                    bar.inc(1);
                }
            }
            MigrateProgress::BlankDetail { release_id } => {
                if let Some(bar) = &bars.scrape {
                    bar.set_message(format!("skipped blank {release_id}"));
                    bar.inc(1);
                }
            }
            MigrateProgress::ScrapeComplete { releases, skipped } => {
                if let Some(bar) = bars.scrape.take() {
                    bar.finish_with_message(format!("{releases} releases, {skipped} blank"));
                }
            }
            MigrateProgress::ImportStarted { status } => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.set_prefix("import");
                bar.set_message(status);
                bar.enable_steady_tick(std::time::Duration::from_millis(120));
                bars.import = Some(bar);
            }
            MigrateProgress::ImportPolled { status, attempt } => {
                if let Some(bar) = &bars.import {
                    bar.set_message(format!("{status} (poll {attempt})"));
                }
            }
            MigrateProgress::ImportComplete { attempts } => {
                if let Some(bar) = bars.import.take() {
                    bar.finish_with_message(format!("complete after {attempts} polls"));
                }
            }
            MigrateProgress::PublishingReleases { count } => {
                let bar = self.multi.add(ProgressBar::new(count as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix("publish");
                bars.publish = Some(bar);
            }
            MigrateProgress::ReleaseCreated { tag, .. } => {
                if let Some(bar) = &bars.publish {
                    bar.set_message(tag);
                    bar.inc(1);
                }
            }
            MigrateProgress::AssetUploaded { name, .. } => {
                if let Some(bar) = &bars.publish {
                    bar.set_message(name);
                }
            }
            MigrateProgress::PublishComplete { releases, assets } => {
                if let Some(bar) = bars.publish.take() {
                    bar.finish_with_message(format!("{releases} releases, {assets} assets"));
                }
            }
            MigrateProgress::CollaboratorError { username, error } => {
                self.multi.suspend(|| {
                    eprintln!(
                        "{} could not add collaborator {username}: {error}",
                        console::style("warning:").yellow().bold()
                    );
                });
            }
            MigrateProgress::Warning { message } => {
                self.multi.suspend(|| {
                    eprintln!("{} {message}", console::style("warning:").yellow().bold());
                });
            }
            _ => {}
        }
    }

    fn finish(&self) {
        let mut bars = self.bars.lock().unwrap_or_else(|e| e.into_inner());
        for bar in [bars.scrape.take(), bars.import.take(), bars.publish.take()]
            .into_iter()
            .flatten()
        {
            bar.finish_and_clear();
        }
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging reporter for non-TTY environments.
pub struct LoggingReporter;

impl LoggingReporter {
    fn handle(&self, event: MigrateProgress) {
        match event {
            MigrateProgress::FetchingReleases { project } => {
                tracing::info!(project = %project, "fetching release listing");
            }
            MigrateProgress::ReleasesListed { count } => {
                tracing::info!(count, "release listing fetched");
            }
            MigrateProgress::BlankDetail { release_id } => {
                tracing::info!(release_id = %release_id, "blank release document skipped");
            }
            MigrateProgress::ReleaseFetched {
                release_id,
                name,
                assets,
            } => {
                tracing::info!(release_id = %release_id, name = %name, assets, "release fetched");
            }
            MigrateProgress::ScrapeComplete { releases, skipped } => {
                tracing::info!(releases, skipped, "scrape complete");
            }
            MigrateProgress::WikiPagesWritten { count } => {
                tracing::info!(count, "wiki pages written");
            }
            MigrateProgress::AddingCollaborators { count } => {
                tracing::info!(count, "adding collaborators");
            }
            MigrateProgress::CollaboratorAdded { username } => {
                tracing::info!(username = %username, "collaborator added");
            }
            MigrateProgress::CollaboratorError { username, error } => {
                tracing::warn!(username = %username, error = %error, "collaborator grant failed");
            }
            MigrateProgress::ImportStarted { status } => {
                tracing::info!(status = %status, "import started");
            }
            MigrateProgress::ImportPolled { status, attempt } => {
                tracing::info!(status = %status, attempt, "import status poll");
            }
            MigrateProgress::ImportComplete { attempts } => {
                tracing::info!(attempts, "import complete");
            }
            MigrateProgress::PublishingReleases { count } => {
                tracing::info!(count, "publishing releases");
            }
            MigrateProgress::ReleaseCreated { tag, name } => {
                tracing::info!(tag = %tag, name = %name, "release created");
            }
            MigrateProgress::AssetUploaded { release_tag, name } => {
                tracing::info!(release_tag = %release_tag, name = %name, "asset uploaded");
            }
            MigrateProgress::PublishComplete { releases, assets } => {
                tracing::info!(releases, assets, "publish complete");
            }
            MigrateProgress::Warning { message } => {
                tracing::warn!("{message}");
            }
            _ => {}
        }
    }
}
