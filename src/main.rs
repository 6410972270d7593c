//! FitStats - statistics over molecular field-fit results
//!
//! A CLI tool that loads fieldfit JSON files, groups the fitted
//! charges, polarizabilities and RMSD values by compound site and by
//! fit key, and prints descriptive statistics for each group.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, unreadable or malformed input, empty samples

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::ReportMetadata;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    init_logging(&args);

    debug!("FitStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .fitstats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries the report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load, aggregate and report.
fn run(args: Args) -> Result<()> {
    let mut config = Config::resolve(args.config.as_deref(), Path::new(CONFIG_FILE_NAME))?;
    config.merge_with_args(&args);

    if config.stats.winsorize && !(0.0..0.5).contains(&config.stats.winsor_limit) {
        anyhow::bail!(
            "Winsor limit must be in [0, 0.5), got {}",
            config.stats.winsor_limit
        );
    }

    // Step 1: Load
    let datasets = loader::load_datasets(&args.files)?;
    info!("Loaded {} fieldfit files", datasets.len());

    // Step 2: Aggregate
    let aggregation = analysis::collect(&datasets)?;
    debug!(
        "Aggregated {} compounds, {} fit keys",
        aggregation.per_compound.len(),
        aggregation.per_key.len()
    );

    // Step 3: Report
    let options = config.report_options(args.fit_class.clone());
    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        input_files: args.files.iter().map(|p| p.display().to_string()).collect(),
        fit_class: args.fit_class.clone(),
        winsorized: config.stats.winsorize,
        winsor_limit: config.stats.winsor_limit,
    };
    let report = report::build_report(&aggregation, &options, metadata)?;

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Text => report::generate_text_report(&report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write report to stdout")?;
        }
    }

    Ok(())
}
