//! Missing-value fill with a sentinel string.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Replace every null in `series` with `sentinel`.
///
/// The column becomes a string column; existing values keep their text
/// form. Returns the filled series and the number of cells filled.
pub(crate) fn fill_series(series: &Series, sentinel: &str) -> Result<(Series, usize)> {
    let filled_count = series.null_count();
    let as_text = series.cast(&DataType::String)?;

    let values: Vec<String> = as_text
        .str()?
        .into_iter()
        .map(|opt| opt.unwrap_or(sentinel).to_string())
        .collect();

    debug!(
        "Filled {} missing values in '{}'",
        filled_count,
        series.name()
    );
    Ok((Series::new(series.name().clone(), values), filled_count))
}

/// Fill every column that has nulls, except `keep_nulls`. Columns without
/// nulls are left alone.
///
/// Returns `(column, cells_filled)` for each column that changed.
pub(crate) fn fill_missing(
    df: &mut DataFrame,
    sentinel: &str,
    keep_nulls: Option<&str>,
) -> Result<Vec<(String, usize)>> {
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() > 0 && Some(col.name().as_str()) != keep_nulls)
        .map(|col| col.name().to_string())
        .collect();

    let mut filled = Vec::with_capacity(targets.len());
    for name in targets {
        let series = df.column(&name)?.as_materialized_series().clone();
        let (new_series, count) = fill_series(&series, sentinel)?;
        df.replace(&name, new_series)?;
        filled.push((name, count));
    }

    Ok(filled)
}
