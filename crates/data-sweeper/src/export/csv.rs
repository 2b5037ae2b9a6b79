//! CSV encoding via the polars CSV writer.

use crate::error::{Result, SweeperError};
use polars::prelude::*;

/// Encode `df` as comma-separated text with a header row.
///
/// Nulls become empty fields; values are quoted only when they contain the
/// delimiter, a quote or a line break.
pub(crate) fn write_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut df = df.clone();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .map_err(|e| SweeperError::ExportFailed(e.to_string()))?;

    Ok(buffer)
}
