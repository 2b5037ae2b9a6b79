//! Table serialization for download.
//!
//! Output is fully buffered in memory: CSV through the polars writer,
//! spreadsheets through rust_xlsxwriter.

mod csv;
mod xlsx;

pub use xlsx::{MAX_COLUMNS as SPREADSHEET_MAX_COLUMNS, MAX_ROWS as SPREADSHEET_MAX_ROWS};

use crate::error::Result;
use crate::types::{ConversionRequest, ExportFormat, ExportedFile};
use polars::prelude::*;
use tracing::info;

/// Encode `df` in the requested format.
///
/// The suggested file name is the original name with the new extension
/// appended (`report.csv` becomes `report.csv.xlsx`).
pub fn export_table(df: &DataFrame, request: &ConversionRequest) -> Result<ExportedFile> {
    let bytes = match request.format {
        ExportFormat::Csv => csv::write_csv(df)?,
        ExportFormat::Spreadsheet => xlsx::write_xlsx(df)?,
    };

    let file_name = request.output_file_name();
    info!(
        "Exported '{}' as {} ({} bytes)",
        file_name,
        request.format.display_name(),
        bytes.len()
    );

    Ok(ExportedFile {
        bytes,
        mime_type: request.format.mime_type(),
        file_name,
    })
}
