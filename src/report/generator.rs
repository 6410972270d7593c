//! Statistics report generation.
//!
//! This module computes the per-compound, per-key and RMSD report rows
//! from an [`Aggregation`] and renders them as plain text or JSON.

use crate::analysis::stats::{root_mean_square, Result as StatsResult};
use crate::analysis::{
    lookup_key, Aggregation, PerCompoundGroup, PerCompoundRmsd, PerKeyGroup, SiteToKey,
};
use crate::models::{
    CompoundRow, CompoundTotal, KeyRow, Report, ReportMetadata, RmsdRow, Summary, TotalKind,
};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Options shared by the reporters.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Only report this fit class when set.
    pub fit_class: Option<String>,
    /// Winsorize samples with this limit before computing statistics.
    pub winsor_limit: Option<f64>,
    /// Fit class whose means are summed into the total charge.
    pub charge_class: String,
    /// Fit class whose means are summed into the total polarizability.
    pub polarizability_class: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            fit_class: None,
            winsor_limit: None,
            charge_class: "charge".to_string(),
            polarizability_class: "alpha".to_string(),
        }
    }
}

impl ReportOptions {
    fn selects(&self, fit_class: &str) -> bool {
        self.fit_class.as_deref().map_or(true, |target| target == fit_class)
    }

    fn total_kind(&self, fit_class: &str) -> Option<TotalKind> {
        if fit_class == self.charge_class {
            Some(TotalKind::Charge)
        } else if fit_class == self.polarizability_class {
            Some(TotalKind::Polarizability)
        } else {
            None
        }
    }
}

/// Rows of the per-compound section.
#[derive(Debug, Clone, Default)]
pub struct CompoundStats {
    pub rows: Vec<CompoundRow>,
    /// Charge totals first, then polarizability totals, each in the order
    /// compounds were first seen.
    pub totals: Vec<CompoundTotal>,
}

/// Statistics per (compound, site, fit class) plus per-compound totals.
pub fn per_compound_stats(
    group: &PerCompoundGroup,
    site_to_key: &SiteToKey,
    options: &ReportOptions,
) -> Result<CompoundStats> {
    let mut stats = CompoundStats::default();
    let mut charges: IndexMap<String, f64> = IndexMap::new();
    let mut polarizabilities: IndexMap<String, f64> = IndexMap::new();

    for (compound, sites) in group {
        for (site, classes) in sites {
            let key = lookup_key(site_to_key, compound, site)?;

            for (fit_class, samples) in classes {
                if !options.selects(fit_class) {
                    continue;
                }

                let summary = summarize(samples, options).with_context(|| {
                    format!("Statistics of {} {} {}", compound, site, fit_class)
                })?;

                let totals = match options.total_kind(fit_class) {
                    Some(TotalKind::Charge) => Some(&mut charges),
                    Some(TotalKind::Polarizability) => Some(&mut polarizabilities),
                    None => None,
                };
                if let Some(totals) = totals {
                    *totals.entry(compound.clone()).or_insert(0.0) += summary.mean;
                }

                stats.rows.push(CompoundRow {
                    compound: compound.clone(),
                    site: site.clone(),
                    key: key.to_string(),
                    fit_class: fit_class.clone(),
                    summary,
                });
            }
        }
    }

    let tagged = |kind: TotalKind, totals: IndexMap<String, f64>| {
        totals
            .into_iter()
            .map(move |(compound, value)| CompoundTotal {
                kind,
                compound,
                value,
            })
    };
    stats.totals = tagged(TotalKind::Charge, charges)
        .chain(tagged(TotalKind::Polarizability, polarizabilities))
        .collect();

    Ok(stats)
}

/// Statistics per (canonical key, fit class), with the raw sample count.
pub fn per_key_stats(group: &PerKeyGroup, options: &ReportOptions) -> Result<Vec<KeyRow>> {
    let mut rows = Vec::new();

    for (key, classes) in group {
        for (fit_class, samples) in classes {
            if !options.selects(fit_class) {
                continue;
            }

            let summary = summarize(samples, options)
                .with_context(|| format!("Statistics of key {} {}", key, fit_class))?;

            rows.push(KeyRow {
                key: key.clone(),
                fit_class: fit_class.clone(),
                count: samples.len(),
                summary,
            });
        }
    }

    Ok(rows)
}

/// Root-mean-square of every compound's concatenated RMSD samples.
pub fn per_compound_rmsd(group: &PerCompoundRmsd) -> Result<Vec<RmsdRow>> {
    group
        .iter()
        .map(|(compound, samples)| -> Result<RmsdRow> {
            let rmsd = root_mean_square(samples)
                .with_context(|| format!("RMSD of {}", compound))?;
            Ok(RmsdRow {
                compound: compound.clone(),
                rmsd,
            })
        })
        .collect()
}

fn summarize(samples: &[f64], options: &ReportOptions) -> StatsResult<Summary> {
    Summary::compute_with(samples, options.winsor_limit)
}

/// Run all three reporters over an aggregation.
pub fn build_report(
    aggregation: &Aggregation,
    options: &ReportOptions,
    metadata: ReportMetadata,
) -> Result<Report> {
    let compound =
        per_compound_stats(&aggregation.per_compound, &aggregation.site_to_key, options)?;
    let per_key = per_key_stats(&aggregation.per_key, options)?;
    let rmsd = per_compound_rmsd(&aggregation.per_compound_rmsd)?;

    Ok(Report {
        metadata,
        per_compound: compound.rows,
        totals: compound.totals,
        per_key,
        rmsd,
    })
}

/// Render the report as space-separated text lines, one blank line
/// between sections.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    for row in &report.per_compound {
        output.push_str(&format!("{}\n", row));
    }
    for total in &report.totals {
        output.push_str(&format!("{}\n", total));
    }
    output.push('\n');

    for row in &report.per_key {
        output.push_str(&format!("{}\n", row));
    }
    output.push('\n');

    for row in &report.rmsd {
        output.push_str(&format!("{}\n", row));
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
