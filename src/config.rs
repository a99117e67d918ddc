//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.riskboard.toml` files.

use crate::analysis::{RankingLimits, DEFAULT_TOP_ACCOUNTS, DEFAULT_TOP_POSTS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".riskboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Risk API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard aggregation settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Standard output when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Risk scoring API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the risk API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the dashboard endpoint.
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,

    /// Path of the health endpoint.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dashboard_path: default_dashboard_path(),
            health_path: default_health_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_dashboard_path() -> String {
    "/api/dashboard".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

fn default_timeout() -> u64 {
    25
}

/// Ranked table sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Number of posts in the top-risk table.
    #[serde(default = "default_top_posts")]
    pub top_posts: usize,

    /// Number of accounts in the top-risk table.
    #[serde(default = "default_top_accounts")]
    pub top_accounts: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_posts: default_top_posts(),
            top_accounts: default_top_accounts(),
        }
    }
}

fn default_top_posts() -> usize {
    DEFAULT_TOP_POSTS
}

fn default_top_accounts() -> usize {
    DEFAULT_TOP_ACCOUNTS
}

impl From<&DashboardConfig> for RankingLimits {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_posts: config.top_posts,
            top_accounts: config.top_accounts,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.riskboard.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or via env) override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(top_posts) = args.top_posts {
            self.dashboard.top_posts = top_posts;
        }
        if let Some(top_accounts) = args.top_accounts {
            self.dashboard.top_accounts = top_accounts;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check the merged settings.
    ///
    /// Applies the same rules as `Args::validate`, so a value from the
    /// config file cannot get past what the command line would reject.
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("[api] base_url must start with 'http://' or 'https://'");
        }
        if self.api.timeout_seconds == 0 {
            bail!("[api] timeout_seconds must be at least 1");
        }
        if self.dashboard.top_posts == 0 {
            bail!("[dashboard] top_posts must be at least 1");
        }
        if self.dashboard.top_accounts == 0 {
            bail!("[dashboard] top_accounts must be at least 1");
        }

        Ok(())
    }

    /// Log level from the merged verbosity settings. Quiet wins over verbose.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.dashboard_path, "/api/dashboard");
        assert_eq!(config.api.timeout_seconds, 25);
        assert_eq!(config.dashboard.top_posts, 5);
        assert_eq!(config.dashboard.top_accounts, 10);
        assert!(config.general.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "dashboard.json"
verbose = true

[api]
base_url = "https://risk.internal:9000"
timeout_seconds = 10

[dashboard]
top_posts = 3
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("dashboard.json"));
        assert!(config.general.verbose);
        assert_eq!(config.api.base_url, "https://risk.internal:9000");
        assert_eq!(config.api.dashboard_path, "/api/dashboard");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.dashboard.top_posts, 3);
        assert_eq!(config.dashboard.top_accounts, 10);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[dashboard]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.api.timeout_seconds, 25);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[dashboard]\ntop_accounts = 20\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.dashboard.top_accounts, 20);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[dashboard\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.api.timeout_seconds = 60;

        let mut args = make_args();
        args.api_url = Some("http://scoring:8000".to_string());
        args.top_posts = Some(8);
        config.merge_with_args(&args);

        assert_eq!(config.api.base_url, "http://scoring:8000");
        assert_eq!(config.api.timeout_seconds, 60);
        assert_eq!(config.dashboard.top_posts, 8);
        assert_eq!(config.dashboard.top_accounts, 10);

        let limits = RankingLimits::from(&config.dashboard);
        assert_eq!(limits.top_posts, 8);
    }

    #[test]
    fn test_validate_rejects_zero_values_from_file() {
        let config: Config = toml::from_str("[api]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[dashboard]\ntop_posts = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[dashboard]\ntop_accounts = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[api]\nbase_url = \"localhost:8000\"\n").unwrap();
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_cli_value_repairs_invalid_file_value() {
        let mut config: Config = toml::from_str("[dashboard]\ntop_posts = 0\n").unwrap();
        let mut args = make_args();
        args.top_posts = Some(3);
        config.merge_with_args(&args);

        assert!(config.validate().is_ok());
        assert_eq!(RankingLimits::from(&config.dashboard).top_posts, 3);
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        assert_eq!(config.log_level(false), tracing::Level::INFO);
        assert_eq!(config.log_level(true), tracing::Level::ERROR);

        config.general.verbose = true;
        assert_eq!(config.log_level(false), tracing::Level::DEBUG);
        assert_eq!(config.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_verbose_from_file_sets_debug_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        config.merge_with_args(&make_args());
        assert_eq!(config.log_level(false), tracing::Level::DEBUG);

        let mut config = Config::default();
        let mut args = make_args();
        args.verbose = true;
        config.merge_with_args(&args);
        assert_eq!(config.log_level(args.quiet), tracing::Level::DEBUG);
    }
}
