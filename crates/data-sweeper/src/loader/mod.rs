//! Table loading from uploaded bytes.
//!
//! The format is chosen from the file name extension: `.csv` goes through the
//! polars CSV reader, `.xlsx` through calamine. Anything else is rejected with
//! [`SweeperError::UnsupportedFormat`](crate::error::SweeperError) before the
//! bytes are looked at.

mod csv;
mod xlsx;

use crate::error::Result;
use crate::types::InputFormat;
use polars::prelude::*;
use tracing::{debug, info};

/// Parse `bytes` into a table, using `file_name` to pick the format.
pub fn load_table(file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let format = InputFormat::from_file_name(file_name)?;
    debug!("Loading '{}' as {:?} ({} bytes)", file_name, format, bytes.len());

    let df = match format {
        InputFormat::Csv => csv::read_csv(file_name, bytes)?,
        InputFormat::Xlsx => xlsx::read_xlsx(file_name, bytes)?,
    };

    info!("Loaded '{}': {:?}", file_name, df.shape());
    Ok(df)
}
