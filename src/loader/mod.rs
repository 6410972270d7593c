//! Fieldfit file loading.
//!
//! Reads JSON fieldfit files named on the command line into typed
//! datasets, keyed by their extension-stripped base name.

use crate::models::{Datasets, FieldFitDocument, FitDataset};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Derive the collection name of a file: its base name without extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a fieldfit document from a JSON string.
pub fn parse_document(content: &str) -> serde_json::Result<FieldFitDocument> {
    serde_json::from_str(content)
}

/// Read and parse one fieldfit file.
pub fn load_dataset(path: &Path) -> Result<FitDataset> {
    let name = base_name(path);
    info!("Loading collection {} from {}", name, path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fieldfit file: {}", path.display()))?;

    let document = parse_document(&content)
        .with_context(|| format!("Failed to parse fieldfit file: {}", path.display()))?;

    Ok(FitDataset {
        name,
        path: path.to_path_buf(),
        document,
    })
}

/// Load every file in order, keyed by collection name.
///
/// A later file with an already seen name replaces the earlier dataset and
/// keeps its position. The first failure aborts loading.
pub fn load_datasets(paths: &[PathBuf]) -> Result<Datasets> {
    let mut datasets = Datasets::with_capacity(paths.len());

    for path in paths {
        let dataset = load_dataset(path)?;
        if let Some(previous) = datasets.insert(dataset.name.clone(), dataset) {
            warn!(
                "Collection '{}' from {} replaced by {}",
                previous.name,
                previous.path.display(),
                path.display()
            );
        }
    }

    Ok(datasets)
}
