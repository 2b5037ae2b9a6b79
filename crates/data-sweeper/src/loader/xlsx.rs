//! XLSX reading via calamine.
//!
//! Only the first worksheet is read and its first row is the header.

use crate::cleaner::parse_naive_datetime;
use crate::error::{Result, SweeperError};
use calamine::{Data, DataType as CellExt, Reader, Xlsx};
use chrono::{NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

/// Column type picked from the cells of one worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellColumnType {
    Int64,
    Float64,
    Boolean,
    Utf8,
    Date,
    Datetime,
}

pub(crate) fn read_xlsx(file_name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(|e| SweeperError::parse(file_name, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweeperError::parse(file_name, "workbook has no worksheets"))?
        .map_err(|e| SweeperError::parse(file_name, e))?;

    let rows: Vec<&[Data]> = range.rows().collect();
    let Some((header_row, data_rows)) = rows.split_first() else {
        debug!("'{}' has an empty first worksheet", file_name);
        return Ok(DataFrame::empty());
    };

    let headers = header_names(file_name, header_row)?;
    let mut columns = Vec::with_capacity(headers.len());

    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = data_rows.iter().map(|row| row.get(col_idx)).collect();
        let col_type = infer_column_type(&cells);
        debug!("Worksheet column '{}' read as {:?}", header, col_type);
        let series = cells_to_series(header, &cells, col_type)?;
        columns.push(series.into_column());
    }

    DataFrame::new(columns).map_err(|e| SweeperError::parse(file_name, e))
}

/// Header cells become column names; blanks are named `column_<n>`.
fn header_names(file_name: &str, header_row: &[Data]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(header_row.len());

    for (idx, cell) in header_row.iter().enumerate() {
        let text = cell_to_text(cell).unwrap_or_default();
        let name = if text.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            text.trim().to_string()
        };

        if !seen.insert(name.clone()) {
            return Err(SweeperError::parse(
                file_name,
                format!("duplicate column name '{}' in header row", name),
            ));
        }
        names.push(name);
    }

    Ok(names)
}

fn infer_column_type(cells: &[Option<&Data>]) -> CellColumnType {
    let mut has_string = false;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    let mut has_datetime = false;

    for cell in cells.iter().flatten() {
        match cell {
            Data::String(_) | Data::DurationIso(_) => has_string = true,
            Data::Float(_) => has_float = true,
            Data::Int(_) => has_int = true,
            Data::Bool(_) => has_bool = true,
            Data::DateTime(_) | Data::DateTimeIso(_) => has_datetime = true,
            Data::Error(_) | Data::Empty => {}
        }
    }

    let numeric = has_int || has_float;
    let kinds = [has_string, numeric, has_bool, has_datetime]
        .iter()
        .filter(|present| **present)
        .count();

    if has_string || kinds > 1 {
        CellColumnType::Utf8
    } else if has_datetime {
        if all_midnight(cells) {
            CellColumnType::Date
        } else {
            CellColumnType::Datetime
        }
    } else if has_bool {
        CellColumnType::Boolean
    } else if has_float {
        let all_whole = cells
            .iter()
            .flatten()
            .filter_map(|cell| cell.as_f64())
            .all(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64);
        if all_whole {
            CellColumnType::Int64
        } else {
            CellColumnType::Float64
        }
    } else if has_int {
        CellColumnType::Int64
    } else {
        CellColumnType::Utf8
    }
}

/// True if every cell that holds a datetime has time 00:00:00.
fn all_midnight(cells: &[Option<&Data>]) -> bool {
    cells
        .iter()
        .flatten()
        .filter_map(|cell| cell_to_naive_datetime(cell))
        .all(|dt| dt.time() == NaiveTime::MIN)
}

fn cell_to_naive_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(_) => cell.as_datetime(),
        Data::DateTimeIso(text) => parse_naive_datetime(text),
        _ => None,
    }
}

/// Cell rendered as text; empty and error cells have no value.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => Some(other.to_string()),
    }
}

fn cells_to_series(name: &str, cells: &[Option<&Data>], col_type: CellColumnType) -> Result<Series> {
    let series = match col_type {
        CellColumnType::Int64 => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| cell.and_then(|c| c.as_i64()))
                .collect();
            Series::new(name.into(), values)
        }
        CellColumnType::Float64 => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| cell.and_then(|c| c.as_f64()))
                .collect();
            Series::new(name.into(), values)
        }
        CellColumnType::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| cell.and_then(|c| c.get_bool()))
                .collect();
            Series::new(name.into(), values)
        }
        CellColumnType::Utf8 => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| cell.and_then(cell_to_text))
                .collect();
            Series::new(name.into(), values)
        }
        CellColumnType::Date => {
            let values = cells
                .iter()
                .map(|cell| cell.and_then(cell_to_naive_datetime).map(|dt| dt.date()));
            DateChunked::from_naive_date_options(name.into(), values).into_series()
        }
        CellColumnType::Datetime => {
            let values = cells
                .iter()
                .map(|cell| cell.and_then(cell_to_naive_datetime));
            DatetimeChunked::from_naive_datetime_options(
                name.into(),
                values,
                TimeUnit::Microseconds,
            )
            .into_series()
        }
    };
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_whole_floats_as_integers() {
        let a = Data::Float(1.0);
        let b = Data::Float(2.0);
        let cells = vec![Some(&a), None, Some(&b)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Int64);
    }

    #[test]
    fn test_infer_fractional_floats() {
        let a = Data::Float(1.5);
        let b = Data::Int(2);
        let cells = vec![Some(&a), Some(&b)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Float64);
    }

    #[test]
    fn test_infer_any_string_makes_text() {
        let a = Data::Int(1);
        let b = Data::String("two".to_string());
        let cells = vec![Some(&a), Some(&b)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Utf8);
    }

    #[test]
    fn test_infer_mixed_bool_and_number_is_text() {
        let a = Data::Bool(true);
        let b = Data::Int(1);
        let cells = vec![Some(&a), Some(&b)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Utf8);
    }

    #[test]
    fn test_infer_iso_dates() {
        let a = Data::DateTimeIso("2024-01-05".to_string());
        let b = Data::Empty;
        let cells = vec![Some(&a), Some(&b)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Date);

        let c = Data::DateTimeIso("2024-01-05T10:30:00".to_string());
        let cells = vec![Some(&a), Some(&c)];
        assert_eq!(infer_column_type(&cells), CellColumnType::Datetime);
    }

    #[test]
    fn test_header_names_fill_blanks() {
        let header = vec![
            Data::String("id".to_string()),
            Data::Empty,
            Data::String(" name ".to_string()),
        ];
        let names = header_names("t.xlsx", &header).unwrap();
        assert_eq!(names, vec!["id", "column_2", "name"]);
    }

    #[test]
    fn test_header_names_reject_duplicates() {
        let header = vec![Data::String("id".to_string()), Data::String("id".to_string())];
        let err = header_names("t.xlsx", &header).unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_cells_to_series_text_and_nulls() {
        let a = Data::String("x".to_string());
        let b = Data::Int(3);
        let c = Data::Empty;
        let cells = vec![Some(&a), Some(&b), Some(&c)];
        let series = cells_to_series("mixed", &cells, CellColumnType::Utf8).unwrap();
        let values: Vec<Option<&str>> = series.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("x"), Some("3"), None]);
    }
}
