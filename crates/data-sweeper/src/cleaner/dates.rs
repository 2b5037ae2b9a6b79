//! Best-effort date parsing.
//!
//! Values that cannot be read as a date become null; nothing here fails on
//! bad input.

use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Full datetime layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, tried in order. Slash dates are read month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%B-%Y",
];

/// Parse a string as a date and time. Date-only input resolves to midnight.
pub(crate) fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    parse_date_only(value).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a string as a calendar date, discarding any time of day.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_naive_datetime(value).map(|dt| dt.date())
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }
    parse_compact_date(value)
}

/// `YYYYMMDD` with exactly eight digits.
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse every value of `series` as a date.
///
/// Returns the parsed values and the number of non-null inputs that failed
/// to parse.
fn parse_series(series: &Series) -> Result<(Vec<Option<NaiveDate>>, usize)> {
    let as_text = series.cast(&DataType::String)?;
    let str_series = as_text.str()?;

    let mut parsed = Vec::with_capacity(str_series.len());
    let mut failures = 0;

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => {
                let date = parse_date(val);
                if date.is_none() {
                    failures += 1;
                }
                parsed.push(date);
            }
            None => parsed.push(None),
        }
    }

    Ok((parsed, failures))
}

/// Re-render a column as `YYYY-MM-DD` strings, nulling unparsable values.
pub(crate) fn normalize_date_series(series: &Series) -> Result<(Series, usize)> {
    let (parsed, failures) = parse_series(series)?;
    let rendered: Vec<Option<String>> = parsed
        .into_iter()
        .map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()))
        .collect();
    Ok((Series::new(series.name().clone(), rendered), failures))
}

/// Convert a column into a native date column, nulling unparsable values.
pub(crate) fn parse_date_series(series: &Series) -> Result<(Series, usize)> {
    if series.dtype() == &DataType::Date {
        return Ok((series.clone(), 0));
    }

    let (parsed, failures) = parse_series(series)?;
    let dates = DateChunked::from_naive_date_options(series.name().clone(), parsed);
    Ok((dates.into_series(), failures))
}
