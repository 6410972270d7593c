//! Data models for the field-fit statistics tool.
//!
//! This module contains the serde model of the fieldfit JSON input and
//! the row types that make up a statistics report.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed fieldfit file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldFitDocument {
    /// Fit results keyed by system (compound) name, in document order.
    pub fits: IndexMap<String, SystemFit>,
}

/// Fit results of a single system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemFit {
    /// RMSD samples of the fit.
    pub rmsd: Vec<f64>,
    /// Fitted sites keyed by site name.
    pub sites: IndexMap<String, FitSite>,
}

/// A structural location within a system for which parameters were fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSite {
    /// Keys constraining the site's solution. Only the first is used.
    pub fit_keys: Vec<String>,
    /// Samples per fit class (e.g. "charge", "alpha").
    pub fit_result: IndexMap<String, Vec<f64>>,
}

impl FitSite {
    /// Returns the canonical key of the site: the first entry of `fit_keys`.
    pub fn canonical_key(&self) -> Option<&str> {
        self.fit_keys.first().map(String::as_str)
    }
}

/// Loaded datasets keyed by collection name, in first-seen order.
pub type Datasets = IndexMap<String, FitDataset>;

/// A loaded input file together with its derived collection name.
#[derive(Debug, Clone)]
pub struct FitDataset {
    /// File base name with the extension stripped.
    pub name: String,
    /// Path the dataset was read from.
    pub path: std::path::PathBuf,
    /// Parsed content.
    pub document: FieldFitDocument,
}

/// Mean, median and population standard deviation of a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub stdev: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {:.6} {:.6}", self.mean, self.median, self.stdev)
    }
}

/// Statistics of one (compound, site, fit class) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundRow {
    pub compound: String,
    pub site: String,
    /// Canonical fit key of the site.
    pub key: String,
    pub fit_class: String,
    #[serde(flatten)]
    pub summary: Summary,
}

impl fmt::Display for CompoundRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.compound, self.site, self.key, self.fit_class, self.summary
        )
    }
}

/// Which running total a [`CompoundTotal`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalKind {
    /// Sum of per-site mean charges.
    Charge,
    /// Sum of per-site mean polarizabilities.
    Polarizability,
}

impl fmt::Display for TotalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalKind::Charge => write!(f, "total_charges"),
            TotalKind::Polarizability => write!(f, "total_polarizabilities"),
        }
    }
}

/// Per-compound total of a special-cased fit class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundTotal {
    pub kind: TotalKind,
    pub compound: String,
    pub value: f64,
}

impl fmt::Display for CompoundTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:.6}", self.kind, self.compound, self.value)
    }
}

/// Statistics of one (canonical key, fit class) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRow {
    pub key: String,
    pub fit_class: String,
    /// Number of raw samples.
    pub count: usize,
    #[serde(flatten)]
    pub summary: Summary,
}

impl fmt::Display for KeyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key, self.fit_class, self.count, self.summary
        )
    }
}

/// Aggregate RMSD of one compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RmsdRow {
    pub compound: String,
    pub rmsd: f64,
}

impl fmt::Display for RmsdRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6}", self.compound, self.rmsd)
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Input files in command-line order.
    pub input_files: Vec<String>,
    /// Fit class filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_class: Option<String>,
    /// Whether statistics were computed over winsorized samples.
    pub winsorized: bool,
    /// Fraction clipped from each tail when winsorizing.
    pub winsor_limit: f64,
}

/// The complete statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub per_compound: Vec<CompoundRow>,
    pub totals: Vec<CompoundTotal>,
    pub per_key: Vec<KeyRow>,
    pub rmsd: Vec<RmsdRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "fits": {
                "A": {
                    "rmsd": [1.0, 2.0],
                    "sites": {
                        "s1": {
                            "fit_keys": ["k1", "k2"],
                            "fit_result": {"charge": [0.5], "alpha": [1.25]},
                            "extra": "ignored"
                        }
                    }
                }
            }
        }"#;

        let doc: FieldFitDocument = serde_json::from_str(json).unwrap();
        let system = &doc.fits["A"];
        assert_eq!(system.rmsd, vec![1.0, 2.0]);
        let site = &system.sites["s1"];
        assert_eq!(site.canonical_key(), Some("k1"));
        assert_eq!(site.fit_result["alpha"], vec![1.25]);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let json = r#"{"fits": {
            "Z": {"rmsd": [], "sites": {
                "s9": {"fit_keys": ["k"], "fit_result": {"q": [1.0], "charge": [0.1]}},
                "s1": {"fit_keys": ["k"], "fit_result": {}}
            }},
            "A": {"rmsd": [], "sites": {}}
        }}"#;

        let doc: FieldFitDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.fits.keys().collect::<Vec<_>>(), vec!["Z", "A"]);
        let sites = &doc.fits["Z"].sites;
        assert_eq!(sites.keys().collect::<Vec<_>>(), vec!["s9", "s1"]);
        assert_eq!(
            sites["s9"].fit_result.keys().collect::<Vec<_>>(),
            vec!["q", "charge"]
        );
    }

    #[test]
    fn test_missing_rmsd_is_an_error() {
        let json = r#"{"fits": {"A": {"sites": {}}}}"#;
        let err = serde_json::from_str::<FieldFitDocument>(json).unwrap_err();
        assert!(err.to_string().contains("rmsd"));
    }

    #[test]
    fn test_missing_fits_is_an_error() {
        let err = serde_json::from_str::<FieldFitDocument>("{}").unwrap_err();
        assert!(err.to_string().contains("fits"));
    }

    #[test]
    fn test_canonical_key_empty() {
        let site = FitSite {
            fit_keys: vec![],
            fit_result: IndexMap::new(),
        };
        assert_eq!(site.canonical_key(), None);
    }

    #[test]
    fn test_row_display() {
        let row = CompoundRow {
            compound: "A".to_string(),
            site: "s1".to_string(),
            key: "k1".to_string(),
            fit_class: "charge".to_string(),
            summary: Summary {
                mean: 1.5,
                median: 1.5,
                stdev: 0.5,
            },
        };
        assert_eq!(row.to_string(), "A s1 k1 charge 1.500000 1.500000 0.500000");

        let total = CompoundTotal {
            kind: TotalKind::Polarizability,
            compound: "A".to_string(),
            value: 2.0,
        };
        assert_eq!(total.to_string(), "total_polarizabilities A 2.000000");

        let key_row = KeyRow {
            key: "k1".to_string(),
            fit_class: "alpha".to_string(),
            count: 3,
            summary: Summary {
                mean: 1.0,
                median: 1.0,
                stdev: 0.0,
            },
        };
        assert_eq!(key_row.to_string(), "k1 alpha 3 1.000000 1.000000 0.000000");
    }
}
