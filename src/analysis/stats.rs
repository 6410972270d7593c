//! Descriptive statistics over sample sequences.
//!
//! Mean, median, population standard deviation, winsorizing and
//! root-mean-square. Every function rejects an empty sequence.

use crate::models::Summary;
use thiserror::Error;

/// Default fraction clipped from each tail when winsorizing.
pub const DEFAULT_WINSOR_LIMIT: f64 = 0.05;

/// Errors raised by the statistics functions.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("cannot compute statistics over an empty sample sequence")]
    EmptySample,

    #[error("winsor limit must lie in [0, 0.5), got {0}")]
    InvalidLimit(f64),
}

pub type Result<T> = std::result::Result<T, StatsError>;

fn ensure_non_empty(samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        Err(StatsError::EmptySample)
    } else {
        Ok(())
    }
}

/// Arithmetic mean.
pub fn mean(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Median; the average of the two middle values for even counts.
pub fn median(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples)?;

    let sorted = sorted(samples);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Population standard deviation (divides by N).
pub fn population_stdev(samples: &[f64]) -> Result<f64> {
    let avg = mean(samples)?;
    let variance =
        samples.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / samples.len() as f64;
    Ok(variance.sqrt())
}

/// Square root of the mean of the squared samples.
pub fn root_mean_square(samples: &[f64]) -> Result<f64> {
    ensure_non_empty(samples)?;
    let mean_square = samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64;
    Ok(mean_square.sqrt())
}

/// Clip `limit` of the distribution at each tail.
///
/// With `n` samples, the `floor(limit * n)` smallest values are raised to
/// the next remaining value and the same number of largest values lowered
/// to the largest remaining one. Sample order is preserved.
pub fn winsorize(samples: &[f64], limit: f64) -> Result<Vec<f64>> {
    if !(0.0..0.5).contains(&limit) {
        return Err(StatsError::InvalidLimit(limit));
    }
    ensure_non_empty(samples)?;

    let n = samples.len();
    let clipped = (limit * n as f64).floor() as usize;
    if clipped == 0 {
        return Ok(samples.to_vec());
    }

    let sorted = sorted(samples);
    let low = sorted[clipped];
    let high = sorted[n - clipped - 1];

    Ok(samples.iter().map(|&x| x.clamp(low, high)).collect())
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

impl Summary {
    /// Computes mean, median and population stdev of `samples`.
    pub fn compute(samples: &[f64]) -> Result<Self> {
        Ok(Self {
            mean: mean(samples)?,
            median: median(samples)?,
            stdev: population_stdev(samples)?,
        })
    }

    /// Computes the summary after winsorizing `samples` when `winsor_limit`
    /// is set, over the raw samples otherwise.
    pub fn compute_with(samples: &[f64], winsor_limit: Option<f64>) -> Result<Self> {
        match winsor_limit {
            Some(limit) => Self::compute(&winsorize(samples, limit)?),
            None => Self::compute(samples),
        }
    }
}
