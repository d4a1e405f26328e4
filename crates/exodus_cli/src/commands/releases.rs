use std::error::Error;

use console::style;

use exodus::migrate::scrape_releases;

use crate::SourceArgs;
use crate::config::Config;

/// Scrape the download board and print what a migration would recreate.
pub(crate) async fn run(
    source_args: SourceArgs,
    concurrency: Option<usize>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let project = super::source_project(&source_args, config)?;
    let client = super::source_client()?;
    let concurrency = concurrency.unwrap_or(config.migrate.fetch_concurrency);

    let result = scrape_releases(
        &client,
        &project,
        &super::default_version_rule(),
        concurrency,
        None,
    )
    .await?;

    println!(
        "{} releases on the download board ({} blank, skipped)",
        result.bundles.len(),
        result.skipped
    );
    for bundle in &result.bundles {
        println!(
            "  {} {}",
            style(&bundle.draft.tag_name).green(),
            bundle.draft.name
        );
        for asset in &bundle.assets {
            println!("      {} ({} bytes)", asset.name, asset.data.len());
        }
    }

    Ok(())
}
