//! Spreadsheet encoding via rust_xlsxwriter.

use crate::error::{Result, SweeperError};
use crate::utils::{cell_text, is_numeric_dtype};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

/// Rows per worksheet, header included.
pub const MAX_ROWS: usize = 1_048_576;
pub const MAX_COLUMNS: usize = 16_384;

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Fail with `ExportTooLarge` when `df` does not fit on one worksheet.
pub(crate) fn check_limits(df: &DataFrame) -> Result<()> {
    let rows = df.height() + 1;
    let columns = df.width();
    if rows > MAX_ROWS || columns > MAX_COLUMNS {
        return Err(SweeperError::ExportTooLarge {
            rows,
            columns,
            max_rows: MAX_ROWS,
            max_columns: MAX_COLUMNS,
        });
    }
    Ok(())
}

/// Encode `df` as a workbook with a single `Sheet1` worksheet.
pub(crate) fn write_xlsx(df: &DataFrame) -> Result<Vec<u8>> {
    check_limits(df)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1")?;

    let header_format = Format::new().set_bold();
    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string_with_format(0, col, column.name().as_str(), &header_format)?;
        write_column(worksheet, col, column.as_materialized_series())?;
    }

    debug!("Encoded {} x {} worksheet", df.height(), df.width());
    Ok(workbook.save_to_buffer()?)
}

fn write_column(worksheet: &mut Worksheet, col: u16, series: &Series) -> Result<()> {
    let dtype = series.dtype().clone();

    match dtype {
        DataType::Boolean => {
            for (idx, value) in series.bool()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet.write_boolean(data_row(idx), col, v)?;
                }
            }
        }
        DataType::Date => {
            let date_format = Format::new().set_num_format(DATE_FORMAT);
            for (idx, value) in series.date()?.as_date_iter().enumerate() {
                if let Some(date) = value {
                    worksheet.write_datetime_with_format(data_row(idx), col, &date, &date_format)?;
                }
            }
        }
        DataType::Datetime(_, _) => {
            let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
            for (idx, value) in series.datetime()?.as_datetime_iter().enumerate() {
                if let Some(datetime) = value {
                    worksheet.write_datetime_with_format(
                        data_row(idx),
                        col,
                        &datetime,
                        &datetime_format,
                    )?;
                }
            }
        }
        ref numeric if is_numeric_dtype(numeric) => {
            let as_float = series.cast(&DataType::Float64)?;
            for (idx, value) in as_float.f64()?.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => {
                        worksheet.write_number(data_row(idx), col, v)?;
                    }
                    Some(v) => {
                        worksheet.write_string(data_row(idx), col, v.to_string())?;
                    }
                    None => {}
                }
            }
        }
        _ => write_text_column(worksheet, col, series)?,
    }

    Ok(())
}

fn write_text_column(worksheet: &mut Worksheet, col: u16, series: &Series) -> Result<()> {
    match series.cast(&DataType::String) {
        Ok(as_text) => {
            for (idx, value) in as_text.str()?.into_iter().enumerate() {
                if let Some(text) = value {
                    worksheet.write_string(data_row(idx), col, text)?;
                }
            }
        }
        Err(_) => {
            for idx in 0..series.len() {
                let value = series.get(idx)?;
                if !value.is_null() {
                    worksheet.write_string(data_row(idx), col, cell_text(&value))?;
                }
            }
        }
    }
    Ok(())
}

/// Worksheet row of the `idx`-th record; row 0 is the header.
fn data_row(idx: usize) -> u32 {
    idx as u32 + 1
}
