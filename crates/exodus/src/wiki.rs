//! Wiki export: write exported pages to disk and push them to the
//! target's wiki repository.
//!
//! Both halves are best-effort from the pipeline's point of view: a
//! project migrates fine without its wiki, so callers absorb failures
//! here rather than aborting the run.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Subdirectory reserved for wiki attachments.
const ATTACHMENT_DIR: &str = "attachFile";

#[derive(Debug, Error)]
pub enum WikiError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("`git {args}` exited with {status}")]
    Git {
        args: String,
        status: std::process::ExitStatus,
    },
}

/// Write wiki pages as markdown files under `{wiki_dir}/{repo}`.
///
/// Returns the directory the pages were written to. An attachment
/// subdirectory is created alongside the pages.
pub fn write_pages(
    wiki_dir: &Path,
    repo: &str,
    pages: &BTreeMap<String, String>,
) -> io::Result<PathBuf> {
    let dir = wiki_dir.join(repo);
    std::fs::create_dir_all(dir.join(ATTACHMENT_DIR))?;

    for (title, content) in pages {
        // Page titles can contain path separators; flatten them.
        let file_name = format!("{}.md", title.replace('/', "-"));
        std::fs::write(dir.join(file_name), content)?;
    }

    Ok(dir)
}

/// Push an exported wiki directory to `{owner}/{repo}.wiki.git`.
///
/// The wiki repository only materializes on the target once the
/// repository has at least one wiki page, so the initial pull is allowed
/// to fail; every other git step must succeed.
pub async fn push_wiki(dir: &Path, owner: &str, repo: &str) -> Result<(), WikiError> {
    let remote = format!("https://github.com/{owner}/{repo}.wiki.git");

    git(dir, &["init"]).await?;
    git(dir, &["remote", "add", "origin", &remote]).await?;
    if let Err(e) = git(dir, &["pull", "origin", "master"]).await {
        debug!(error = %e, "wiki pull skipped, remote has no history yet");
    }
    git(dir, &["add", "--all"]).await?;
    git(dir, &["commit", "-m", "import wiki pages"]).await?;
    git(dir, &["push", "origin", "master"]).await?;

    Ok(())
}

async fn git(dir: &Path, args: &[&str]) -> Result<(), WikiError> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .await?;

    if !status.success() {
        return Err(WikiError::Git {
            args: args.join(" "),
            status,
        });
    }
    Ok(())
}
