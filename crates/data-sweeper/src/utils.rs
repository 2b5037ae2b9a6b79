//! Small helpers shared by the profiler, selector and exporters.

use polars::prelude::*;

/// Placeholders that mean "no value" even though the cell is not null.
const MISSING_MARKERS: [&str; 8] = [
    "error", "unknown", "n/a", "na", "null", "missing", "none", "#n/a",
];

/// Spellings accepted as booleans by the type hints.
const BOOLEAN_WORDS: [&str; 10] = [
    "true", "false", "yes", "no", "t", "f", "y", "n", "on", "off",
];

/// Formatting stripped before a value is tried as a number.
const NUMBER_DECORATIONS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Integer or floating point dtype.
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// `Date` or `Datetime`.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

/// Owned copy of the column names, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Render a cell as plain text.
///
/// Strings come back without the quotes `AnyValue`'s `Display` adds and null
/// renders as an empty string.
pub fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// True for placeholders such as `N/A` or `missing`, ignoring case.
pub fn is_missing_marker(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    MISSING_MARKERS.contains(&lower.as_str())
}

/// True when the value reads as a number once currency symbols, percent
/// signs and thousands separators are removed.
pub fn looks_numeric(value: &str) -> bool {
    let stripped: String = value
        .trim()
        .chars()
        .filter(|c| !NUMBER_DECORATIONS.contains(c))
        .collect();
    !stripped.is_empty() && stripped.parse::<f64>().is_ok()
}

pub fn looks_boolean(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    BOOLEAN_WORDS.contains(&lower.as_str())
}
