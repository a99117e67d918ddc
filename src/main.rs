//! Riskboard - moderation risk dashboard aggregator
//!
//! A CLI tool that fetches scored posts and account rollups from a
//! behavioral risk API and produces a presentation-ready dashboard:
//! headline counts, risk distributions and top-risk rankings.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (API unavailable, malformed payload, config, IO)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod source;

use analysis::RankingLimits;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use report::{DashboardReport, ReportMetadata};
use source::{ApiClient, PayloadSource};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so that [general] verbose applies
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(config.log_level(args.quiet))?;

    info!("Riskboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    match run_dashboard(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .riskboard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your risk API and adjust table sizes.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr so that stdout carries only the dashboard.
fn init_logging(level: tracing::Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Fetch, aggregate and write the dashboard.
async fn run_dashboard(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();
    let limits = RankingLimits::from(&config.dashboard);

    // Step 1: Pick the payload source
    let source = match args.input {
        Some(ref path) => PayloadSource::File(path.clone()),
        None => {
            let client = ApiClient::new(&config.api)?;
            if args.check_health {
                client.health().await?;
                info!("Risk API at {} is healthy", config.api.base_url);
            }
            PayloadSource::Api(client)
        }
    };
    let origin = source.describe();

    // Step 2: Load the payload; any failure ends the run here
    let spinner = fetch_spinner(&args, &origin);
    let loaded = source.load().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let payload = loaded.with_context(|| format!("Could not load payload from {}", origin))?;

    // Step 3: Aggregate
    let dashboard = analysis::build_dashboard(&payload, &limits)
        .context("Failed to serialize dashboard collections")?;
    let view = &dashboard.view;

    info!(
        "Aggregated {} posts: {} auto actions, {} queued for review, average risk {:.2}",
        view.total_posts, view.auto_action_count, view.queue_review_count, view.average_risk
    );

    // Step 4: Render the requested output
    let output = match args.format {
        OutputFormat::Json => {
            let report = DashboardReport {
                metadata: ReportMetadata {
                    source: origin,
                    generated_at: Utc::now(),
                    duration_seconds: start_time.elapsed().as_secs_f64(),
                },
                dashboard,
            };
            report::generate_json_report(&report)?
        }
        OutputFormat::Text => report::generate_text_summary(&dashboard.view),
    };

    // Step 5: Write it out
    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write dashboard to {}", path))?;
            info!("Dashboard saved to: {}", path);
        }
        None => println!("{}", output),
    }

    debug!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Spinner shown while the payload loads, unless running quiet.
fn fetch_spinner(args: &Args, origin: &str) -> Option<ProgressBar> {
    if args.quiet {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Loading payload from {}", origin));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => match Config::load_default() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                if !args.quiet {
                    eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
                }
                Config::default()
            }
        },
    };

    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
