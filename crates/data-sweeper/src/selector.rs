//! Column projection and previews.

use crate::error::{Result, SweeperError};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Numeric columns charted by default.
pub const DEFAULT_PREVIEW_COLUMNS: usize = 2;

/// Project `df` onto `columns`, in the requested order.
///
/// Fails with `UnknownColumn` naming the first absent column. An empty
/// selection returns the table unchanged. Repeated names keep only their
/// first position.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(df.clone());
    }

    let mut seen = HashSet::with_capacity(columns.len());
    let mut selected: Vec<PlSmallStr> = Vec::with_capacity(columns.len());

    for name in columns {
        if df.get_column_index(name).is_none() {
            return Err(SweeperError::UnknownColumn(name.clone()));
        }
        if seen.insert(name.as_str()) {
            selected.push(name.as_str().into());
        }
    }

    debug!("Selecting {} of {} columns", selected.len(), df.width());
    Ok(df.select(selected)?)
}

/// The first `max_columns` numeric columns of `df`, in table order.
pub fn extract_numeric_preview(df: &DataFrame, max_columns: usize) -> DataFrame {
    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .take(max_columns)
        .cloned()
        .collect();

    DataFrame::new(columns).unwrap_or_else(|_| DataFrame::empty())
}

/// The first `n` rows of `df`.
pub fn head(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}
