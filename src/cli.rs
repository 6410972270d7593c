//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// FitStats - summary statistics over field-fit result files
///
/// Aggregates charges, polarizabilities and RMSD values from one or more
/// fieldfit JSON files and prints mean, median and standard deviation per
/// compound site, per fit key and per compound.
///
/// Examples:
///   fitstats run1.json run2.json
///   fitstats results/*.json --fit_class charge
///   fitstats results/*.json --winsorize --format json -o stats.json
///   fitstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Fieldfit JSON files to aggregate
    #[arg(
        value_name = "FILES",
        num_args = 1..,
        required_unless_present = "init_config"
    )]
    pub files: Vec<PathBuf>,

    /// Only report this fit class (e.g. charge, alpha)
    #[arg(long = "fit_class", visible_alias = "fit-class", value_name = "NAME")]
    pub fit_class: Option<String>,

    /// Winsorize distributions before computing statistics
    #[arg(long)]
    pub winsorize: bool,

    /// Fraction clipped from each tail when winsorizing
    ///
    /// Must lie in [0, 0.5). Default: from config or 0.05.
    #[arg(long, value_name = "FRACTION")]
    pub winsor_limit: Option<f64>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fitstats.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "FITSTATS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fitstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Space-separated text rows (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.files.is_empty() {
            return Err("At least one fieldfit file is required".to_string());
        }

        if let Some(limit) = self.winsor_limit {
            if !(0.0..0.5).contains(&limit) {
                return Err(format!("Winsor limit must be in [0, 0.5), got {}", limit));
            }
        }

        if let Some(ref fit_class) = self.fit_class {
            if fit_class.trim().is_empty() {
                return Err("Fit class must not be empty".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            files: vec![PathBuf::from("fit.json")],
            fit_class: None,
            winsorize: false,
            winsor_limit: None,
            format: None,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_underscore_fit_class_flag() {
        let args = Args::parse_from([
            "fitstats",
            "a.json",
            "b.json",
            "--fit_class",
            "charge",
            "--winsorize",
        ]);
        assert_eq!(
            args.files,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
        assert_eq!(args.fit_class.as_deref(), Some("charge"));
        assert!(args.winsorize);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_fit_class_alias() {
        let args = Args::parse_from(["fitstats", "a.json", "--fit-class", "alpha"]);
        assert_eq!(args.fit_class.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_files_required() {
        assert!(Args::try_parse_from(["fitstats"]).is_err());
        assert!(Args::try_parse_from(["fitstats", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_winsor_limit() {
        let mut args = make_args();
        args.winsor_limit = Some(0.5);
        assert!(args.validate().is_err());

        args.winsor_limit = Some(0.1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
