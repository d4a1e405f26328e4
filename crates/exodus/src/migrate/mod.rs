//! The migration pipeline.
//!
//! # Module Structure
//!
//! - [`types`] - Core types: `ReleaseBundle`, `MigrateOptions`,
//!   `MigrationReport`, constants
//! - [`progress`] - Progress reporting: `MigrateProgress`,
//!   `ProgressCallback`, `emit()`
//! - [`scrape`] - Release metadata and asset scraping
//! - [`engine`] - The run itself: `migrate_project()`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use exodus::credentials::EnvCredentials;
//! use exodus::migrate::{migrate_project, MigrateOptions, VersionRule};
//!
//! let rule: VersionRule = Arc::new(|name| name.to_string());
//! let report = migrate_project(
//!     &source, &target, &project,
//!     &EnvCredentials::default(), &rule,
//!     &MigrateOptions::default(), None,
//! ).await?;
//! println!("recreated {} releases", report.releases_created);
//! ```

pub mod engine;
mod progress;
mod scrape;
mod types;

pub use engine::{MigrateError, migrate_project};
pub use progress::{MigrateProgress, ProgressCallback, emit};
pub use scrape::scrape_releases;
pub use types::{
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_WAIT_TIME_SECS, FileAsset,
    MigrateOptions, MigrationReport, ReleaseBundle, ReleaseDraft, ScrapeResult, VersionRule,
};
