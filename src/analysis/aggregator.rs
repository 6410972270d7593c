//! Sample aggregation across fieldfit files.
//!
//! This module walks every loaded dataset and concatenates samples into
//! per-compound, per-key and per-compound RMSD groupings. Every grouping
//! keeps first-seen order: file order, then document order.

use crate::models::Datasets;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

/// compound -> site -> fit class -> samples
pub type PerCompoundGroup = IndexMap<String, IndexMap<String, IndexMap<String, Vec<f64>>>>;

/// canonical key -> fit class -> samples
pub type PerKeyGroup = IndexMap<String, IndexMap<String, Vec<f64>>>;

/// "compound::site" -> canonical key
pub type SiteToKey = IndexMap<String, String>;

/// compound -> RMSD samples
pub type PerCompoundRmsd = IndexMap<String, Vec<f64>>;

/// Errors raised while aggregating datasets.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("site '{site}' of system '{system}' in '{dataset}' has no fit keys")]
    NoFitKeys {
        dataset: String,
        system: String,
        site: String,
    },

    #[error("no fit key recorded for site '{0}'")]
    UnknownSite(String),
}

/// Builds the lookup index used by [`SiteToKey`].
pub fn site_index(compound: &str, site: &str) -> String {
    format!("{}::{}", compound, site)
}

/// Looks up the canonical key of a compound's site.
pub fn lookup_key<'a>(
    site_to_key: &'a SiteToKey,
    compound: &str,
    site: &str,
) -> Result<&'a str, AnalysisError> {
    let index = site_index(compound, site);
    site_to_key
        .get(&index)
        .map(String::as_str)
        .ok_or(AnalysisError::UnknownSite(index))
}

/// All groupings derived from a set of datasets.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub per_compound: PerCompoundGroup,
    pub per_key: PerKeyGroup,
    /// A later file overrides an earlier one.
    pub site_to_key: SiteToKey,
    pub per_compound_rmsd: PerCompoundRmsd,
}

/// Concatenate the samples of all datasets into the report groupings.
///
/// Samples of the same (compound, site, fit class) or (key, fit class) from
/// different files are appended, never overwritten.
pub fn collect(datasets: &Datasets) -> Result<Aggregation, AnalysisError> {
    let mut agg = Aggregation::default();

    for dataset in datasets.values() {
        debug!(
            "Aggregating {} from {} ({} systems)",
            dataset.name,
            dataset.path.display(),
            dataset.document.fits.len()
        );

        for (system, system_fit) in &dataset.document.fits {
            agg.per_compound_rmsd
                .entry(system.clone())
                .or_default()
                .extend_from_slice(&system_fit.rmsd);

            let compound_group = agg.per_compound.entry(system.clone()).or_default();

            for (site, fit_site) in &system_fit.sites {
                let first_key = fit_site
                    .canonical_key()
                    .ok_or_else(|| AnalysisError::NoFitKeys {
                        dataset: dataset.name.clone(),
                        system: system.clone(),
                        site: site.clone(),
                    })?
                    .to_string();

                agg.site_to_key
                    .insert(site_index(system, site), first_key.clone());

                let site_group = compound_group.entry(site.clone()).or_default();
                let key_group = agg.per_key.entry(first_key).or_default();

                for (fit_class, samples) in &fit_site.fit_result {
                    site_group
                        .entry(fit_class.clone())
                        .or_default()
                        .extend_from_slice(samples);
                    key_group
                        .entry(fit_class.clone())
                        .or_default()
                        .extend_from_slice(samples);
                }
            }
        }
    }

    Ok(agg)
}
