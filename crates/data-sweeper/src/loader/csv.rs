//! CSV reading via the polars CSV reader.

use crate::error::{Result, SweeperError};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Read comma-delimited bytes with a mandatory header row.
///
/// Dates are left as strings; date handling is an explicit cleaning step.
pub(crate) fn read_csv(file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SweeperError::parse(file_name, "file is empty"));
    }

    let cursor = Cursor::new(bytes.to_vec());

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_try_parse_dates(false),
        )
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|e| SweeperError::parse(file_name, e))
}
