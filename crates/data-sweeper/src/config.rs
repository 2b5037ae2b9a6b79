//! Configuration types for the cleaning engine.
//!
//! This module provides the cleaning configuration using the builder pattern
//! for flexible and ergonomic setup. Configurations also deserialize from
//! JSON so a front end or a config file can supply them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentinel written into missing cells when filling is enabled without an
/// explicit value.
pub const DEFAULT_FILL_VALUE: &str = "Not Available";

/// Drop `column` when its null count is strictly greater than `max_nulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseColumnRule {
    pub column: String,
    pub max_nulls: usize,
}

impl SparseColumnRule {
    pub fn new(column: impl Into<String>, max_nulls: usize) -> Self {
        Self {
            column: column.into(),
            max_nulls,
        }
    }
}

/// Configuration for [`clean_table`](crate::cleaner::clean_table).
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_sweeper::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .remove_duplicates(true)
///     .fill_missing()
///     .date_column("hire_date")
///     .drop_if_sparse("notes", 90)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Whether to remove rows that repeat an earlier row.
    /// Default: false
    pub remove_duplicates: bool,

    /// Value written into every missing cell. `None` disables filling.
    /// Default: None
    pub fill_missing_with: Option<String>,

    /// Columns re-parsed as dates and rendered as `YYYY-MM-DD` strings.
    /// Names absent from the table are ignored.
    /// Default: empty
    pub date_columns: Vec<String>,

    /// Column re-parsed into a native date column.
    /// Default: None
    pub hearing_date_column: Option<String>,

    /// Columns dropped when their null count (before filling) exceeds
    /// the rule's threshold.
    /// Default: empty
    pub sparse_column_drops: Vec<SparseColumnRule>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: false,
            fill_missing_with: None,
            date_columns: Vec::new(),
            hearing_date_column: None,
            sparse_column_drops: Vec::new(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: CleaningConfig = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(|e| crate::error::SweeperError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(value) = &self.fill_missing_with
            && value.is_empty()
        {
            return Err(ConfigValidationError::EmptyFillValue);
        }

        if self.date_columns.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyColumnName("date_columns"));
        }

        if let Some(name) = &self.hearing_date_column
            && name.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyColumnName(
                "hearing_date_column",
            ));
        }

        let mut seen = HashSet::new();
        for rule in &self.sparse_column_drops {
            if rule.column.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(
                    "sparse_column_drops",
                ));
            }
            if !seen.insert(rule.column.as_str()) {
                return Err(ConfigValidationError::DuplicateSparseRule(
                    rule.column.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Fill value must not be empty (use no fill instead)")]
    EmptyFillValue,

    #[error("Empty column name in '{0}'")]
    EmptyColumnName(&'static str),

    #[error("Column '{0}' has more than one sparse-drop rule")]
    DuplicateSparseRule(String),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    remove_duplicates: Option<bool>,
    fill_missing_with: Option<String>,
    date_columns: Vec<String>,
    hearing_date_column: Option<String>,
    sparse_column_drops: Vec<SparseColumnRule>,
}

impl CleaningConfigBuilder {
    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Fill missing cells with [`DEFAULT_FILL_VALUE`].
    pub fn fill_missing(self) -> Self {
        self.fill_missing_with(DEFAULT_FILL_VALUE)
    }

    /// Fill missing cells with a custom sentinel.
    pub fn fill_missing_with(mut self, value: impl Into<String>) -> Self {
        self.fill_missing_with = Some(value.into());
        self
    }

    /// Add a column to normalize as `YYYY-MM-DD`.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_columns.push(column.into());
        self
    }

    /// Add several columns to normalize as `YYYY-MM-DD`.
    pub fn date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the column converted into a native date column.
    pub fn hearing_date_column(mut self, column: impl Into<String>) -> Self {
        self.hearing_date_column = Some(column.into());
        self
    }

    /// Drop `column` when it has more than `max_nulls` missing cells.
    pub fn drop_if_sparse(mut self, column: impl Into<String>, max_nulls: usize) -> Self {
        self.sparse_column_drops
            .push(SparseColumnRule::new(column, max_nulls));
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            remove_duplicates: self.remove_duplicates.unwrap_or(false),
            fill_missing_with: self.fill_missing_with,
            date_columns: self.date_columns,
            hearing_date_column: self.hearing_date_column,
            sparse_column_drops: self.sparse_column_drops,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_a_no_op() {
        let config = CleaningConfig::default();
        assert!(!config.remove_duplicates);
        assert!(config.fill_missing_with.is_none());
        assert!(config.date_columns.is_empty());
        assert!(config.hearing_date_column.is_none());
        assert!(config.sparse_column_drops.is_empty());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .fill_missing()
            .date_columns(["hire_date", "start"])
            .hearing_date_column("hearing")
            .drop_if_sparse("notes", 90)
            .build()
            .unwrap();

        assert!(config.remove_duplicates);
        assert_eq!(config.fill_missing_with.as_deref(), Some(DEFAULT_FILL_VALUE));
        assert_eq!(config.date_columns, vec!["hire_date", "start"]);
        assert_eq!(config.hearing_date_column.as_deref(), Some("hearing"));
        assert_eq!(
            config.sparse_column_drops,
            vec![SparseColumnRule::new("notes", 90)]
        );
    }

    #[test]
    fn test_validation_empty_fill_value() {
        let result = CleaningConfig::builder().fill_missing_with("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyFillValue
        ));
    }

    #[test]
    fn test_validation_duplicate_sparse_rule() {
        let result = CleaningConfig::builder()
            .drop_if_sparse("notes", 10)
            .drop_if_sparse("notes", 20)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateSparseRule(name) if name == "notes"
        ));
    }

    #[test]
    fn test_validation_blank_date_column() {
        let result = CleaningConfig::builder().date_column("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyColumnName("date_columns")
        ));
    }

    #[test]
    fn test_config_from_json() {
        // Simulate JSON that might come from a front end or config file
        let json = r#"{
            "remove_duplicates": true,
            "fill_missing_with": "N/A",
            "date_columns": ["hire_date"],
            "sparse_column_drops": [{ "column": "notes", "max_nulls": 90 }]
        }"#;

        let config = CleaningConfig::from_json(json).expect("Should deserialize from JSON");

        assert!(config.remove_duplicates);
        assert_eq!(config.fill_missing_with.as_deref(), Some("N/A"));
        assert_eq!(config.date_columns, vec!["hire_date"]);
        assert!(config.hearing_date_column.is_none());
        assert_eq!(config.sparse_column_drops[0].max_nulls, 90);
    }

    #[test]
    fn test_config_from_json_rejects_invalid() {
        let json = r#"{ "fill_missing_with": "" }"#;
        let error = CleaningConfig::from_json(json).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = CleaningConfig::builder()
            .fill_missing()
            .drop_if_sparse("notes", 3)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CleaningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
