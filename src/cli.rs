//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Riskboard - moderation risk dashboard aggregator
///
/// Fetches scored posts and account rollups from a behavioral risk API
/// and produces headline counts, risk distributions and top-risk rankings.
///
/// Examples:
///   riskboard
///   riskboard --api-url http://scoring:8000 --output dashboard.json
///   riskboard --input saved_payload.json --format text
///   riskboard --check-health
///   riskboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the risk API
    ///
    /// Overrides the [api] base_url setting in .riskboard.toml.
    #[arg(long, value_name = "URL", env = "RISKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Read the payload from a JSON file instead of the API
    ///
    /// Takes precedence over --api-url.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file path. Writes to standard output when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .riskboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of posts in the top-risk table (default 5)
    #[arg(long, value_name = "COUNT")]
    pub top_posts: Option<usize>,

    /// Number of accounts in the top-risk table (default 10)
    #[arg(long, value_name = "COUNT")]
    pub top_accounts: Option<usize>,

    /// Check the API health endpoint before fetching
    #[arg(long)]
    pub check_health: bool,

    /// Generate a default .riskboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full JSON document (default)
    #[default]
    Json,
    /// Plain-text summary
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.top_posts == Some(0) {
            return Err("Top posts must be at least 1".to_string());
        }

        if self.top_accounts == Some(0) {
            return Err("Top accounts must be at least 1".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if self.check_health {
                return Err("--check-health needs the API; it cannot be used with --input".to_string());
            }
        }

        Ok(())
    }
}
