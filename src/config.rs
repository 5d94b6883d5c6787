use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::engine::batch::BATCH_CONCURRENCY;
use crate::engine::EngineOptions;
use crate::url_parser::{MAX_REDIRECT_DEPTH, MAX_URL_LENGTH};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "linksan.toml";

/// Prefix for environment overrides, e.g. `LINKSAN_MAX_REDIRECT_DEPTH=3`.
pub const ENV_PREFIX: &str = "LINKSAN";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rule document to load instead of the bundled one
    pub rules_path: Option<PathBuf>,

    /// How many nested redirectors may be unwrapped
    pub max_redirect_depth: usize,

    /// Longest URL accepted, in bytes
    pub max_url_length: usize,

    /// URLs sanitized concurrently in batch mode
    pub batch_concurrency: usize,

    /// Directory for log files (logs go to stderr when unset)
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            max_redirect_depth: MAX_REDIRECT_DEPTH,
            max_url_length: MAX_URL_LENGTH,
            batch_concurrency: BATCH_CONCURRENCY,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the config file (optional unless given
    /// explicitly), then `LINKSAN_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The engine-level slice of the configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            max_redirect_depth: self.max_redirect_depth,
            max_url_length: self.max_url_length,
        }
    }
}
