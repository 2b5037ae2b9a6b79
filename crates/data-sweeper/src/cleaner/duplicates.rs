//! Full-row duplicate detection.
//!
//! Two rows are duplicates when every column holds the same value; two nulls
//! compare equal.

use crate::error::Result;
use polars::prelude::*;

/// The first occurrence of every distinct row, in original order.
fn first_occurrences(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Number of rows that repeat an earlier row. Independent of row order.
pub(crate) fn count_duplicates(df: &DataFrame) -> Result<usize> {
    if df.width() == 0 || df.height() < 2 {
        return Ok(0);
    }
    Ok(df.height() - first_occurrences(df)?.height())
}

/// Drop repeated rows, keeping the first occurrence in original order.
pub(crate) fn remove_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
    if df.width() == 0 || df.height() < 2 {
        return Ok((df, 0));
    }

    let unique = first_occurrences(&df)?;
    let removed = df.height() - unique.height();
    if removed == 0 {
        return Ok((df, 0));
    }
    Ok((unique, removed))
}
