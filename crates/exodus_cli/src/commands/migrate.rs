use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use console::style;

use exodus::credentials::{CredentialProvider, EnvCredentials};
use exodus::github::{DEFAULT_API_URL, GitHubClient};
use exodus::migrate::{MigrateOptions, migrate_project};
use exodus::wiki;

use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::prompt::PromptCredentials;
use crate::{RunArgs, SourceArgs, TargetArgs};

pub(crate) async fn run(
    source_args: SourceArgs,
    target_args: TargetArgs,
    run_args: RunArgs,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let token = target_args
        .token
        .or_else(|| config.github_token())
        .ok_or("a GitHub token is required (--token, EXODUS_GITHUB_TOKEN, or config)")?;

    let project =
        super::source_project(&source_args, config)?.with_developers(run_args.developers.clone());

    let source = super::source_client()?;
    let target = GitHubClient::new(DEFAULT_API_URL, &target_args.owner, &target_args.repo, token)?;

    let wiki_dir = run_args
        .wiki_dir
        .clone()
        .or_else(|| config.migrate.wiki_dir.as_deref().map(Into::into));
    let options = MigrateOptions {
        poll_interval: Duration::from_secs(
            run_args.wait_time.unwrap_or(config.migrate.wait_time_secs),
        ),
        max_poll_attempts: run_args
            .max_poll_attempts
            .unwrap_or(config.migrate.max_poll_attempts),
        fetch_concurrency: run_args
            .concurrency
            .unwrap_or(config.migrate.fetch_concurrency),
        wiki_dir: wiki_dir.clone(),
        skip_collaborators: run_args.skip_collaborators,
    };

    // Credentials come from the environment when configured, otherwise from
    // an interactive prompt. Either way they are fixed before the run
    // starts, never mid-pipeline.
    let env_credentials = EnvCredentials::default();
    let credentials: Box<dyn CredentialProvider> = if env_credentials.is_configured() {
        Box::new(env_credentials)
    } else {
        Box::new(PromptCredentials::new(project.host().to_string()))
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let result = migrate_project(
        &source,
        &target,
        &project,
        credentials.as_ref(),
        &super::default_version_rule(),
        &options,
        Some(&callback),
    )
    .await;
    reporter.finish();

    let report = result?;

    println!(
        "{} {}/{}",
        style("migrated").green().bold(),
        target_args.owner,
        target_args.repo
    );
    println!(
        "  releases: {} created, {} blank skipped",
        report.releases_created, report.blank_skipped
    );
    println!("  assets:   {} uploaded", report.assets_uploaded);
    if !run_args.skip_collaborators {
        println!(
            "  collaborators: {} added, {} failed",
            report.collaborators_added,
            report.collaborator_errors.len()
        );
        for error in &report.collaborator_errors {
            println!("    {} {error}", style("!").yellow());
        }
    }

    // The wiki export directory may have been filled by this run or by a
    // separate wiki exporter; push whatever is there. Best-effort either way.
    if run_args.push_wiki {
        let exported = wiki_dir.as_ref().map(|dir| dir.join(&target_args.repo));
        match exported {
            Some(dir) if dir.is_dir() => {
                match wiki::push_wiki(&dir, &target_args.owner, &target_args.repo).await {
                    Ok(()) => println!(
                        "  wiki: pushed to {}/{}.wiki",
                        target_args.owner, target_args.repo
                    ),
                    Err(e) => eprintln!(
                        "{} wiki push failed: {e}",
                        style("warning:").yellow().bold()
                    ),
                }
            }
            _ => eprintln!(
                "{} --push-wiki given but there is no exported wiki directory",
                style("warning:").yellow().bold()
            ),
        }
    }

    Ok(())
}
