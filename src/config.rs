//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fitstats.toml` files.

use crate::analysis::stats::DEFAULT_WINSOR_LIMIT;
use crate::cli::OutputFormat;
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".fitstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Statistics settings.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Winsorize distributions by default.
    #[serde(default)]
    pub winsorize: bool,

    /// Fraction clipped from each tail when winsorizing.
    #[serde(default = "default_winsor_limit")]
    pub winsor_limit: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            winsorize: false,
            winsor_limit: default_winsor_limit(),
        }
    }
}

fn default_winsor_limit() -> f64 {
    DEFAULT_WINSOR_LIMIT
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Fit class summed into `total_charges`.
    #[serde(default = "default_charge_class")]
    pub charge_class: String,

    /// Fit class summed into `total_polarizabilities`.
    #[serde(default = "default_polarizability_class")]
    pub polarizability_class: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            charge_class: default_charge_class(),
            polarizability_class: default_polarizability_class(),
        }
    }
}

fn default_charge_class() -> String {
    "charge".to_string()
}

fn default_polarizability_class() -> String {
    "alpha".to_string()
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

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `fallback` is used when it
    /// exists, and built-in defaults when it doesn't. A file that exists
    /// but can't be parsed is always an error.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        match explicit {
            Some(path) => {
                info!("Loading config from: {}", path.display());
                Self::load(path)
            }
            None if fallback.exists() => {
                info!("Loading config from: {}", fallback.display());
                Self::load(fallback)
            }
            None => {
                debug!("No {} found, using defaults", fallback.display());
                Ok(Self::default())
            }
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.winsorize {
            self.stats.winsorize = true;
        }
        if let Some(limit) = args.winsor_limit {
            self.stats.winsor_limit = limit;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Reporter options for a run with the given fit class filter.
    pub fn report_options(&self, fit_class: Option<String>) -> ReportOptions {
        ReportOptions {
            fit_class,
            winsor_limit: self.stats.winsorize.then_some(self.stats.winsor_limit),
            charge_class: self.report.charge_class.clone(),
            polarizability_class: self.report.polarizability_class.clone(),
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
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.stats.winsorize);
        assert_eq!(config.stats.winsor_limit, 0.05);
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.report.charge_class, "charge");
        assert_eq!(config.report.polarizability_class, "alpha");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[stats]
winsorize = true
winsor_limit = 0.1

[report]
format = "json"
polarizability_class = "pol"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.stats.winsorize);
        assert_eq!(config.stats.winsor_limit, 0.1);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.charge_class, "charge");
        assert_eq!(config.report.polarizability_class, "pol");
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::parse_from([
            "fitstats",
            "a.json",
            "--winsorize",
            "--winsor-limit",
            "0.2",
            "--format",
            "json",
        ]);

        let mut config = Config::default();
        config.merge_with_args(&args);
        assert!(config.stats.winsorize);
        assert_eq!(config.stats.winsor_limit, 0.2);
        assert_eq!(config.report.format, OutputFormat::Json);

        let options = config.report_options(Some("charge".to_string()));
        assert_eq!(options.winsor_limit, Some(0.2));
        assert_eq!(options.fit_class.as_deref(), Some("charge"));
    }

    #[test]
    fn test_report_options_without_winsorize() {
        let options = Config::default().report_options(None);
        assert_eq!(options.winsor_limit, None);
        assert!(options.fit_class.is_none());
    }

    #[test]
    fn test_resolve_missing_fallback_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::resolve(None, &dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.stats.winsor_limit, 0.05);
    }

    #[test]
    fn test_resolve_reads_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let fallback = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&fallback, "[stats]\nwinsorize = true\n").unwrap();

        let config = Config::resolve(None, &fallback).unwrap();
        assert!(config.stats.winsorize);
    }

    #[test]
    fn test_resolve_malformed_fallback_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let fallback = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&fallback, "[stats\nwinsorize = ").unwrap();

        let err = Config::resolve(None, &fallback).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_missing_explicit_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let fallback = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&fallback, "[stats]\nwinsorize = true\n").unwrap();

        let explicit = dir.path().join("absent.toml");
        assert!(Config::resolve(Some(&explicit), &fallback).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[stats]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("winsor_limit"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.report.charge_class, "charge");
    }
}
