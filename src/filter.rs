/*!
 * Selecting the rows of a [Dataset] to analyze.
 *
 * There are two kinds of filters, a threshold on the value of a column and a cutoff at a
 * percentile of a column. When both are used the value filter always goes first, so the
 * percentile is computed over what survived it.
 */

use crate::{dataset::Dataset, FireSpotsError, FireSpotsResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How a [ValueFilter] compares a column to its cutoff.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Keep rows where the column is equal to the cutoff.
    Equal,
    /// Keep rows where the column is strictly less than the cutoff.
    Below,
    /// Keep rows where the column is strictly greater than the cutoff.
    Above,
}

impl FilterMode {
    fn keep(self, value: f64, cutoff: f64) -> bool {
        use FilterMode::*;

        match self {
            Equal => value == cutoff,
            Below => value < cutoff,
            Above => value > cutoff,
        }
    }

    fn symbol(self) -> &'static str {
        use FilterMode::*;

        match self {
            Equal => "==",
            Below => "<",
            Above => ">",
        }
    }
}

/// Keep rows by comparing a column to a fixed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    pub mode: FilterMode,
    pub column: String,
    pub cutoff: f64,
}

impl ValueFilter {
    pub fn new(mode: FilterMode, column: &str, cutoff: f64) -> Self {
        ValueFilter {
            mode,
            column: column.to_owned(),
            cutoff,
        }
    }

    pub fn apply(&self, dataset: Dataset) -> FireSpotsResult<Dataset> {
        let column = dataset.column(&self.column)?;
        let values = dataset.column_values(&column)?;

        let keep: Vec<bool> = values
            .iter()
            .map(|&v| self.mode.keep(v, self.cutoff))
            .collect();

        let before = dataset.len();
        let dataset = dataset.select(&keep);
        debug!(
            "{} {} {}: kept {} of {} rows",
            self.column,
            self.mode.symbol(),
            self.cutoff,
            dataset.len(),
            before
        );

        Ok(dataset)
    }
}

impl std::fmt::Display for ValueFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{} {} {}", self.column, self.mode.symbol(), self.cutoff)
    }
}

/// Keep rows whose column value is strictly above a percentile of that column.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileFilter {
    pub column: String,
    pub percentile: f64,
}

impl PercentileFilter {
    pub fn new(column: &str, percentile: f64) -> FireSpotsResult<Self> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(FireSpotsError::Config(format!(
                "percentile must be between 0 and 100, not {}",
                percentile
            )));
        }

        Ok(PercentileFilter {
            column: column.to_owned(),
            percentile,
        })
    }

    pub fn apply(&self, dataset: Dataset) -> FireSpotsResult<Dataset> {
        let column = dataset.column(&self.column)?;
        let values = dataset.column_values(&column)?;

        let cutoff = match percentile(&values, self.percentile) {
            Some(cutoff) => cutoff,
            None => {
                warn!(
                    "no {} values to compute a percentile from, nothing to filter",
                    self.column
                );
                return Ok(dataset);
            }
        };

        let keep: Vec<bool> = values.iter().map(|&v| v > cutoff).collect();

        let before = dataset.len();
        let dataset = dataset.select(&keep);
        debug!(
            "{} > {} (percentile {}): kept {} of {} rows",
            self.column,
            cutoff,
            self.percentile,
            dataset.len(),
            before
        );

        Ok(dataset)
    }
}

/**
 * The `p`-th percentile of `values`, interpolating linearly between the two closest ranks.
 *
 * NaN values are ignored. Returns `None` if there are no values left.
 */
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
