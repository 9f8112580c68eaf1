//! Command-line interface parsing for Grok SDR
//!
//! Handles backend selection, request timeout, cache persistence and the view
//! the dashboard opens on.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::{CacheManager, StorageError};
use crate::data::DEFAULT_API_URL;
use crate::views::Screen;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified view name is not recognized
    #[error("Invalid view: '{0}'. Valid views: dashboard, leads, evaluation, messaging, settings")]
    InvalidView(String),

    /// The backend URL is not an http(s) URL
    #[error("Invalid API URL: '{0}'. Expected http:// or https://")]
    InvalidApiUrl(String),

    /// No platform cache directory for `--clear-cache`
    #[error("Could not determine the cache directory")]
    NoCacheDir,

    /// Removing cached responses failed
    #[error("Failed to clear cache: {0}")]
    ClearCache(#[from] StorageError),
}

/// Grok SDR - Manage sales leads and AI-drafted outreach from the terminal
#[derive(Parser, Debug)]
#[command(name = "grok-sdr")]
#[command(about = "Terminal dashboard for sales leads, AI messaging and model evaluation")]
#[command(version)]
pub struct Cli {
    /// Base URL of the Grok SDR backend
    #[arg(long, env = "GROK_SDR_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// View to open on startup
    ///
    /// Valid views: dashboard, leads, evaluation, messaging, settings
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Request timeout in seconds (evaluation runs get ten times this)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Keep cached responses on disk between runs
    #[arg(long)]
    pub persist_cache: bool,

    /// Clear the on-disk response cache and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Write logs to this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub api_url: String,
    pub initial_view: Screen,
    pub timeout: Duration,
    pub persist_cache: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            initial_view: Screen::Dashboard,
            timeout: Duration::from_secs(30),
            persist_cache: false,
            log_file: None,
        }
    }
}

/// Parses a `--view` argument into a top-level screen
pub fn parse_view_arg(s: &str) -> Result<Screen, CliError> {
    match s.to_lowercase().as_str() {
        "dashboard" | "home" => Ok(Screen::Dashboard),
        "leads" => Ok(Screen::Leads),
        "evaluation" | "eval" => Ok(Screen::Evaluation),
        "messaging" | "messages" => Ok(Screen::Messaging),
        "settings" => Ok(Screen::Settings),
        _ => Err(CliError::InvalidView(s.to_string())),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_url = cli.api_url.trim().trim_end_matches('/');
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(CliError::InvalidApiUrl(cli.api_url.clone()));
        }

        let initial_view = match &cli.view {
            Some(view) => parse_view_arg(view)?,
            None => Screen::Dashboard,
        };

        Ok(StartupConfig {
            api_url: api_url.to_string(),
            initial_view,
            timeout: Duration::from_secs(cli.timeout_secs),
            persist_cache: cli.persist_cache,
            log_file: cli.log_file.clone(),
        })
    }
}

/// Removes every cached response from `cache`, for `--clear-cache`
pub fn clear_cache(cache: &CacheManager) -> Result<(), CliError> {
    cache.clear(None)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_arg_accepts_aliases() {
        assert_eq!(parse_view_arg("dashboard").unwrap(), Screen::Dashboard);
        assert_eq!(parse_view_arg("Leads").unwrap(), Screen::Leads);
        assert_eq!(parse_view_arg("eval").unwrap(), Screen::Evaluation);
        assert_eq!(parse_view_arg("messages").unwrap(), Screen::Messaging);
        assert_eq!(parse_view_arg("settings").unwrap(), Screen::Settings);
    }

    #[test]
    fn test_parse_view_arg_invalid() {
        let err = parse_view_arg("lead-detail").unwrap_err();
        assert!(err.to_string().contains("Invalid view"));
        assert!(err.to_string().contains("lead-detail"));
    }

    #[test]
    fn test_cli_parse_no_args_uses_defaults() {
        let cli = Cli::parse_from(["grok-sdr"]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.initial_view, Screen::Dashboard);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.persist_cache);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from([
            "grok-sdr",
            "--api-url",
            "https://sdr.example.com/",
            "--view",
            "leads",
            "--timeout-secs",
            "5",
            "--persist-cache",
            "--log-file",
            "/tmp/sdr.log",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.api_url, "https://sdr.example.com");
        assert_eq!(config.initial_view, Screen::Leads);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.persist_cache);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/sdr.log")));
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        let result = Cli::try_parse_from(["grok-sdr", "--timeout-secs", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_rejects_non_http_url() {
        let cli = Cli::parse_from(["grok-sdr", "--api-url", "localhost:8000"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::InvalidApiUrl(_))));
    }

    #[test]
    fn test_startup_config_from_cli_invalid_view() {
        let cli = Cli::parse_from(["grok-sdr", "--view", "invalid"]);
        assert!(StartupConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_clear_cache_removes_entries() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        cache.set("dashboard_data", &1).unwrap();

        clear_cache(&cache).unwrap();

        assert!(cache.get::<i32>("dashboard_data", 60).is_none());
    }

    #[test]
    fn test_clear_cache_failure_is_an_error() {
        let not_a_dir = tempfile::NamedTempFile::new().unwrap();
        let cache = CacheManager::with_dir(not_a_dir.path().to_path_buf());

        let err = clear_cache(&cache).unwrap_err();

        assert!(matches!(err, CliError::ClearCache(StorageError::Io(_))));
        assert!(err.to_string().starts_with("Failed to clear cache"));
    }
}
