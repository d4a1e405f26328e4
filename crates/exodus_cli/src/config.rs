//! Configuration file support for exodus.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `EXODUS_`, e.g., `EXODUS_GITHUB_TOKEN`)
//! 3. Config file (~/.config/exodus/config.toml or ./exodus.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use EXODUS_GITHUB_TOKEN env var
//!
//! [source]
//! url = "https://dev.naver.com"      # or use EXODUS_SOURCE_URL env var
//! cookie = "JSESSIONID=..."          # only for boards behind a login
//!
//! [migrate]
//! wait_time_secs = 5
//! fetch_concurrency = 4
//! max_poll_attempts = 360
//! wiki_dir = "wiki_repos"
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Source forge configuration.
    pub source: SourceConfig,
    /// Migration run defaults.
    pub migrate: MigrateConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via the EXODUS_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
}

/// Source forge configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the forge API.
    /// Can also be set via the EXODUS_SOURCE_URL environment variable.
    pub url: Option<String>,
    /// Session cookie for boards that require a login.
    /// Can also be set via the EXODUS_SOURCE_COOKIE environment variable.
    pub cookie: Option<String>,
}

/// Migration run defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Seconds between import status polls.
    pub wait_time_secs: u64,
    /// Concurrent downloads from the source forge.
    pub fetch_concurrency: usize,
    /// Give up after this many status polls.
    pub max_poll_attempts: u32,
    /// Directory exported wiki pages are written into.
    pub wiki_dir: Option<String>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            wait_time_secs: exodus::migrate::DEFAULT_WAIT_TIME_SECS,
            fetch_concurrency: exodus::migrate::DEFAULT_FETCH_CONCURRENCY,
            max_poll_attempts: exodus::migrate::DEFAULT_MAX_POLL_ATTEMPTS,
            wiki_dir: None,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/exodus/config.toml)
    /// 3. Local config file (./exodus.toml)
    /// 4. Environment variables with EXODUS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "exodus") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("exodus.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./exodus.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("EXODUS")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the GitHub token.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    /// Get the source forge base URL.
    pub fn source_url(&self) -> Option<String> {
        self.source.url.clone()
    }

    /// Get the source forge session cookie.
    pub fn source_cookie(&self) -> Option<String> {
        self.source.cookie.clone()
    }
}
