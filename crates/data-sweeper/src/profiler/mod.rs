//! Table profiling.
//!
//! Produces a read-only [`TableProfile`]: shape, per-column null and
//! distinct counts, sample values, a content-based type hint and the
//! duplicate-row count. Profiling never modifies the table and can be
//! repeated after every transformation.

mod type_inference;

use crate::cleaner::count_duplicates;
use crate::error::Result;
use crate::types::{ColumnProfile, ColumnType, TableProfile};
use crate::utils::cell_text;
use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

/// Sample values kept per column.
const MAX_SAMPLE_VALUES: usize = 10;

/// Fixed seed so repeated profiles of one table are identical.
const SAMPLE_SEED: u64 = 42;

/// Profile `df`. Equivalent to [`DataProfiler::profile_table`].
pub fn profile_table(df: &DataFrame) -> Result<TableProfile> {
    DataProfiler::profile_table(df)
}

/// Data profiler for analyzing table structure and quality.
pub struct DataProfiler;

impl DataProfiler {
    pub fn profile_table(df: &DataFrame) -> Result<TableProfile> {
        let mut column_profiles = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            column_profiles.push(Self::profile_column(
                column.as_materialized_series(),
                df.height(),
            )?);
        }

        let duplicate_count = count_duplicates(df)?;
        let duplicate_percentage = percentage(duplicate_count, df.height());

        debug!(
            "Profiled {} columns, {} duplicate rows",
            column_profiles.len(),
            duplicate_count
        );

        Ok(TableProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            duplicate_count,
            duplicate_percentage,
            estimated_size_bytes: df.estimated_size(),
        })
    }

    fn profile_column(series: &Series, height: usize) -> Result<ColumnProfile> {
        let null_count = series.null_count();
        let non_null = series.drop_nulls();
        let unique_count = if non_null.is_empty() {
            0
        } else {
            non_null.n_unique()?
        };

        Ok(ColumnProfile {
            name: series.name().to_string(),
            declared_type: ColumnType::from_dtype(series.dtype()),
            dtype: format!("{:?}", series.dtype()),
            null_count,
            non_null_count: height - null_count,
            unique_count,
            null_percentage: percentage(null_count, height),
            sample_values: sample_values(&non_null),
            inferred_type: type_inference::infer_column_type(series)?,
        })
    }
}

/// Up to [`MAX_SAMPLE_VALUES`] values picked with a seeded RNG, in table order.
fn sample_values(non_null: &Series) -> Vec<String> {
    if non_null.is_empty() {
        return Vec::new();
    }

    let sample_size = std::cmp::min(MAX_SAMPLE_VALUES, non_null.len());
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let indices: Vec<usize> = (0..non_null.len()).collect();
    let mut sampled: Vec<usize> = indices
        .choose_multiple(&mut rng, sample_size)
        .copied()
        .collect();
    sampled.sort_unstable();

    sampled
        .into_iter()
        .filter_map(|idx| non_null.get(idx).ok())
        .map(|val| cell_text(&val))
        .collect()
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}
