use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::{Result, SweeperError};

// ============================================================================
// Formats
// ============================================================================

/// Input formats recognized by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    /// Detect the format from a file name extension (case-insensitive).
    ///
    /// Returns `UnsupportedFormat` carrying the extension without its dot,
    /// or an empty string when the name has no extension.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(SweeperError::UnsupportedFormat(extension.to_string())),
        }
    }
}

/// Output formats supported by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    /// File extension appended to the suggested output name.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Spreadsheet => "Excel",
        }
    }
}

/// What to export and under which original name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub format: ExportFormat,
    /// Name of the uploaded file; the export extension is appended to it.
    pub file_name: String,
}

impl ConversionRequest {
    pub fn new(format: ExportFormat, file_name: impl Into<String>) -> Self {
        Self {
            format,
            file_name: file_name.into(),
        }
    }

    /// Suggested download name, e.g. `report.csv` -> `report.csv.xlsx`.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.file_name, self.format.extension())
    }
}

/// A fully buffered export ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}

// ============================================================================
// Profiles
// ============================================================================

/// Declared type of a column, as stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Date,
    Datetime,
    Boolean,
    /// Every value is null and the column carries no other type.
    Null,
    Other,
}

impl ColumnType {
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Self::Integer,
            DataType::Float32 | DataType::Float64 => Self::Float,
            DataType::String | DataType::Categorical(_, _) => Self::String,
            DataType::Date => Self::Date,
            DataType::Datetime(_, _) => Self::Datetime,
            DataType::Boolean => Self::Boolean,
            DataType::Null => Self::Null,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Other => "other",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// Content-based type hint for a column.
///
/// A string column full of dates reports `Date` here while its declared
/// type stays `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Numeric,
    Date,
    Boolean,
    String,
    Empty,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub declared_type: ColumnType,
    /// Polars dtype, for display.
    pub dtype: String,
    pub null_count: usize,
    pub non_null_count: usize,
    pub unique_count: usize,
    pub null_percentage: f64,
    pub sample_values: Vec<String>,
    pub inferred_type: InferredType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    /// Rows that repeat an earlier row across every column.
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
    pub estimated_size_bytes: usize,
}

impl TableProfile {
    pub fn row_count(&self) -> usize {
        self.shape.0
    }

    pub fn column_count(&self) -> usize {
        self.shape.1
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|col| col.name == name)
    }

    /// Null count per column, in table order.
    pub fn null_counts(&self) -> Vec<(&str, usize)> {
        self.column_profiles
            .iter()
            .map(|col| (col.name.as_str(), col.null_count))
            .collect()
    }

    pub fn total_null_count(&self) -> usize {
        self.column_profiles.iter().map(|col| col.null_count).sum()
    }

    /// String columns whose content looks like dates.
    pub fn date_like_columns(&self) -> Vec<String> {
        self.column_profiles
            .iter()
            .filter(|col| {
                col.declared_type == ColumnType::String && col.inferred_type == InferredType::Date
            })
            .map(|col| col.name.clone())
            .collect()
    }

    /// Render a column-by-column summary: entries, non-null counts,
    /// declared types and memory footprint.
    pub fn render_info(&self) -> String {
        let name_width = self
            .column_profiles
            .iter()
            .map(|col| col.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Column".len());

        let mut out = String::new();
        let _ = writeln!(out, "{} entries, {} columns", self.shape.0, self.shape.1);
        let _ = writeln!(
            out,
            " #   {:<name_width$}  {:<16}  Type",
            "Column", "Non-Null Count"
        );
        let _ = writeln!(
            out,
            "---  {:<name_width$}  {:<16}  ----",
            "------", "--------------"
        );
        for (idx, col) in self.column_profiles.iter().enumerate() {
            let _ = writeln!(
                out,
                " {:<3} {:<name_width$}  {:<16}  {}",
                idx,
                col.name,
                format!("{} non-null", col.non_null_count),
                col.declared_type.as_str()
            );
        }
        let _ = writeln!(out, "duplicates: {}", self.duplicate_count);
        let _ = write!(out, "memory usage: {}", format_bytes(self.estimated_size_bytes));
        out
    }
}

fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

// ============================================================================
// Cleaning Summary Types
// ============================================================================

/// A single action taken during cleaning.
///
/// Actions are logged by every cleaning step to give an audit trail of
/// what was done to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name, or "table" for row-level actions.
    pub target: String,
    pub description: String,
}

impl CleaningAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Missing cells were replaced with the sentinel.
    ValuesFilled,
    /// A column was re-rendered as `YYYY-MM-DD` strings.
    DatesNormalized,
    /// A column was converted into a native date column.
    DatesParsed,
    /// A sparse column was removed.
    ColumnRemoved,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// A configured column was absent and the step was skipped.
    ColumnSkipped,
}

impl ActionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ValuesFilled => "Values Filled",
            Self::DatesNormalized => "Dates Normalized",
            Self::DatesParsed => "Dates Parsed",
            Self::ColumnRemoved => "Column Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ColumnSkipped => "Column Skipped",
        }
    }
}

/// Human-readable summary of one `clean_table` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub actions: Vec<CleaningAction>,
}

impl CleaningSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn columns_removed(&self) -> usize {
        self.columns_before.saturating_sub(self.columns_after)
    }

    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &CleaningAction> {
        self.actions
            .iter()
            .filter(move |action| action.action_type == action_type)
    }
}

// ============================================================================
// Tests
// ============================================================================
