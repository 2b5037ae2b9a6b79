//! Content-based type hints for profiled columns.

use crate::types::InferredType;
use crate::utils::{
    is_missing_marker, is_numeric_dtype, is_temporal_dtype, looks_boolean, looks_numeric,
};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// Values inspected per column.
const MAX_CHECKED_VALUES: usize = 100;

/// Share of checked values that must match for a hint to apply.
const BOOLEAN_THRESHOLD: f64 = 0.9;
const DATE_THRESHOLD: f64 = 0.7;
const NUMERIC_THRESHOLD: f64 = 0.7;

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("Invalid regex: DD.MM.YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}").expect("Invalid regex: ISO"),
        Regex::new(r"^(?i)[a-z]{3,9}\.?\s+\d{1,2},?\s+\d{4}$").expect("Invalid regex: Month D, YYYY"),
        Regex::new(r"^(?i)\d{1,2}[\s-][a-z]{3,9}[\s-]\d{4}$").expect("Invalid regex: D Month YYYY"),
    ]
});

/// Guess what a column holds from its dtype and, for text columns, its values.
pub(crate) fn infer_column_type(series: &Series) -> PolarsResult<InferredType> {
    if series.null_count() == series.len() {
        return Ok(InferredType::Empty);
    }

    let dtype = series.dtype();
    if dtype == &DataType::Boolean {
        return Ok(InferredType::Boolean);
    }
    if is_numeric_dtype(dtype) {
        return Ok(InferredType::Numeric);
    }
    if is_temporal_dtype(dtype) {
        return Ok(InferredType::Date);
    }
    if dtype != &DataType::String {
        return Ok(InferredType::String);
    }

    let values = checked_values(series)?;
    if values.is_empty() {
        return Ok(InferredType::Empty);
    }

    if share(&values, looks_boolean) >= BOOLEAN_THRESHOLD {
        Ok(InferredType::Boolean)
    } else if share(&values, looks_like_date) >= DATE_THRESHOLD {
        Ok(InferredType::Date)
    } else if share(&values, looks_numeric) >= NUMERIC_THRESHOLD {
        Ok(InferredType::Numeric)
    } else {
        Ok(InferredType::String)
    }
}

/// The first non-blank values of a text column, skipping error markers.
fn checked_values(series: &Series) -> PolarsResult<Vec<String>> {
    Ok(series
        .str()?
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_missing_marker(v))
        .take(MAX_CHECKED_VALUES)
        .map(str::to_string)
        .collect())
}

fn share(values: &[String], predicate: impl Fn(&str) -> bool) -> f64 {
    let matching = values.iter().filter(|v| predicate(v.as_str())).count();
    matching as f64 / values.len() as f64
}

/// True for values that read as a date rather than as a plain number.
fn looks_like_date(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
        return false;
    }
    DATE_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed))
}
