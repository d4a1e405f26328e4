//! Exodus CLI - migrate a project off a legacy forge onto GitHub.

mod commands;
mod config;
mod progress;
mod prompt;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exodus")]
#[command(version)]
#[command(about = "Migrate a project from a legacy nFORGE-style forge to GitHub")]
#[command(
    long_about = "Exodus moves a project off a legacy nFORGE-derived forge: it imports the \
source repository into an existing GitHub repository, recreates the forge's \
download board as GitHub releases with their binary assets, re-adds the \
project's developers as collaborators, and can export the project wiki."
)]
#[command(after_long_help = r#"EXAMPLES
    Migrate a git project into an existing GitHub repository:
        $ exodus migrate --project d2coding --owner me --repo d2coding

    Migrate a subversion project and push its exported wiki:
        $ exodus migrate --project oldproj --vcs svn --owner me --repo oldproj \
              --wiki-dir ./wiki_repos --push-wiki

    See what the download board would migrate, without touching GitHub:
        $ exodus releases --project d2coding

    Generate shell completions:
        $ exodus completions bash > ~/.local/share/bash-completion/completions/exodus

CONFIGURATION
    Exodus reads configuration from:
      1. ~/.config/exodus/config.toml (or $XDG_CONFIG_HOME/exodus/config.toml)
      2. ./exodus.toml in the current directory
      3. Environment variables (EXODUS_* prefix)

ENVIRONMENT VARIABLES
    EXODUS_GITHUB_TOKEN       GitHub personal access token
    EXODUS_SOURCE_URL         Base URL of the source forge
    EXODUS_SOURCE_COOKIE      Session cookie for boards behind a login
    EXODUS_VCS_USERNAME       Forge username for the import request
    EXODUS_VCS_PASSWORD       Forge password for the import request

The import credentials are prompted for interactively when the environment
variables are not set.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full migration: import, collaborators, releases, assets
    Migrate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Scrape the source download board and print what would migrate
    Releases {
        #[command(flatten)]
        source: SourceArgs,

        /// Concurrent downloads from the source forge
        #[arg(short = 'c', long)]
        concurrency: Option<usize>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Where to migrate from.
#[derive(Debug, Clone, clap::Args)]
struct SourceArgs {
    /// Source project name on the forge
    #[arg(long)]
    project: String,

    /// Base URL of the source forge API (default from config)
    #[arg(long)]
    api_url: Option<String>,

    /// Session cookie for boards that require a login
    #[arg(long)]
    session_cookie: Option<String>,

    /// Version control system of the source project (git, svn)
    #[arg(long, default_value = "git")]
    vcs: String,
}

/// Where to migrate to.
#[derive(Debug, Clone, clap::Args)]
struct TargetArgs {
    /// Target repository owner
    #[arg(long)]
    owner: String,

    /// Target repository name
    #[arg(long)]
    repo: String,

    /// GitHub token (default from config or EXODUS_GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

/// Run tunables.
#[derive(Debug, Clone, clap::Args)]
struct RunArgs {
    /// Source developer to re-add as a collaborator (repeatable)
    #[arg(long = "developer")]
    developers: Vec<String>,

    /// Seconds between import status polls
    #[arg(long)]
    wait_time: Option<u64>,

    /// Give up after this many status polls
    #[arg(long)]
    max_poll_attempts: Option<u32>,

    /// Concurrent downloads from the source forge
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Directory to write exported wiki pages into
    #[arg(long)]
    wiki_dir: Option<PathBuf>,

    /// Push the exported wiki to the target's wiki repository
    #[arg(long)]
    push_wiki: bool,

    /// Don't replicate collaborators
    #[arg(long)]
    skip_collaborators: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::load();

    let result = match cli.command {
        Commands::Migrate {
            source,
            target,
            run,
        } => commands::migrate::run(source, target, run, &config).await,
        Commands::Releases {
            source,
            concurrency,
        } => commands::releases::run(source, concurrency, &config).await,
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e}", console::style("error:").red().bold());
        std::process::exit(1);
    }
}
