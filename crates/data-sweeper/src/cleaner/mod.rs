//! Cleaning engine.
//!
//! Applies the configured operations in a fixed order:
//! 1. Date normalization (`YYYY-MM-DD` strings)
//! 2. Hearing date conversion (native date column)
//! 3. Missing-value fill, covering dates that failed to parse
//! 4. Sparse column drop, judged on the null counts after date coercion and
//!    before the fill
//! 5. Duplicate row removal
//!
//! Every step is best-effort: unparsable dates become null (or the sentinel
//! when filling) and configured columns that are absent are skipped. The
//! hearing date column keeps its nulls so it stays a date column.
//!
//! A second run with the same configuration finds nothing left to do: the
//! null counts it sees are the ones the first run judged.

mod dates;
mod duplicates;
mod missing;

pub(crate) use dates::parse_naive_datetime;
pub(crate) use duplicates::count_duplicates;

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::types::{ActionType, CleaningAction, CleaningSummary};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Cleaned table plus a record of what was done to it.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: DataFrame,
    pub summary: CleaningSummary,
}

/// Clean `df` according to `config`.
pub fn clean_table(df: DataFrame, config: &CleaningConfig) -> Result<CleaningOutcome> {
    DataCleaner::new(config).clean(df)
}

/// Runs the cleaning steps for one configuration.
pub struct DataCleaner<'a> {
    config: &'a CleaningConfig,
}

impl<'a> DataCleaner<'a> {
    pub fn new(config: &'a CleaningConfig) -> Self {
        Self { config }
    }

    pub fn clean(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let mut df = df;
        let mut summary = CleaningSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        info!(
            "Cleaning table of {} rows x {} columns",
            df.height(),
            df.width()
        );

        for name in &self.config.date_columns {
            self.normalize_dates(&mut df, name, &mut summary)?;
        }

        if let Some(name) = &self.config.hearing_date_column {
            self.parse_hearing_dates(&mut df, name, &mut summary)?;
        }

        let null_counts: HashMap<String, usize> = df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect();

        if let Some(sentinel) = &self.config.fill_missing_with {
            self.fill_missing(&mut df, sentinel, &mut summary)?;
        }

        df = self.drop_sparse_columns(df, &null_counts, &mut summary);

        if self.config.remove_duplicates {
            df = self.remove_duplicates(df, &mut summary)?;
        }

        summary.rows_after = df.height();
        summary.columns_after = df.width();

        info!(
            "Cleaning complete: {} rows x {} columns ({} actions)",
            summary.rows_after,
            summary.columns_after,
            summary.actions.len()
        );

        Ok(CleaningOutcome { table: df, summary })
    }

    fn fill_missing(
        &self,
        df: &mut DataFrame,
        sentinel: &str,
        summary: &mut CleaningSummary,
    ) -> Result<()> {
        let keep_nulls = self.config.hearing_date_column.as_deref();
        let filled = missing::fill_missing(df, sentinel, keep_nulls)?;
        if filled.is_empty() {
            debug!("No missing values to fill");
        }
        for (column, count) in filled {
            summary.add_action(CleaningAction::new(
                ActionType::ValuesFilled,
                column,
                format!("Filled {} missing values with '{}'", count, sentinel),
            ));
        }
        Ok(())
    }

    fn normalize_dates(
        &self,
        df: &mut DataFrame,
        name: &str,
        summary: &mut CleaningSummary,
    ) -> Result<()> {
        let Ok(column) = df.column(name) else {
            warn!("Date column '{}' not found, skipping", name);
            summary.add_action(CleaningAction::new(
                ActionType::ColumnSkipped,
                name,
                "Date column not found in table",
            ));
            return Ok(());
        };

        let (normalized, failures) = dates::normalize_date_series(column.as_materialized_series())?;
        df.replace(name, normalized)?;

        debug!("Normalized dates in '{}' ({} unparsable)", name, failures);
        summary.add_action(CleaningAction::new(
            ActionType::DatesNormalized,
            name,
            format!(
                "Rendered dates as YYYY-MM-DD; {} values could not be parsed",
                failures
            ),
        ));
        Ok(())
    }

    fn parse_hearing_dates(
        &self,
        df: &mut DataFrame,
        name: &str,
        summary: &mut CleaningSummary,
    ) -> Result<()> {
        let Ok(column) = df.column(name) else {
            warn!("Hearing date column '{}' not found, skipping", name);
            summary.add_action(CleaningAction::new(
                ActionType::ColumnSkipped,
                name,
                "Hearing date column not found in table",
            ));
            return Ok(());
        };

        let (parsed, failures) = dates::parse_date_series(column.as_materialized_series())?;
        df.replace(name, parsed)?;

        debug!("Parsed hearing dates in '{}' ({} unparsable)", name, failures);
        summary.add_action(CleaningAction::new(
            ActionType::DatesParsed,
            name,
            format!(
                "Converted to a date column; {} values could not be parsed",
                failures
            ),
        ));
        Ok(())
    }

    fn drop_sparse_columns(
        &self,
        df: DataFrame,
        null_counts: &HashMap<String, usize>,
        summary: &mut CleaningSummary,
    ) -> DataFrame {
        let mut to_drop: Vec<PlSmallStr> = Vec::new();

        for rule in &self.config.sparse_column_drops {
            let present = df.get_column_index(&rule.column).is_some();
            let Some(&nulls) = null_counts.get(&rule.column).filter(|_| present) else {
                debug!("Sparse rule column '{}' not found, skipping", rule.column);
                summary.add_action(CleaningAction::new(
                    ActionType::ColumnSkipped,
                    rule.column.as_str(),
                    "Sparse-drop column not found in table",
                ));
                continue;
            };

            if nulls > rule.max_nulls {
                debug!(
                    "Dropping '{}': {} nulls > {}",
                    rule.column, nulls, rule.max_nulls
                );
                summary.add_action(CleaningAction::new(
                    ActionType::ColumnRemoved,
                    rule.column.as_str(),
                    format!(
                        "Removed column with {} missing values (limit {})",
                        nulls, rule.max_nulls
                    ),
                ));
                to_drop.push(rule.column.as_str().into());
            }
        }

        if to_drop.is_empty() {
            df
        } else {
            df.drop_many(to_drop)
        }
    }

    fn remove_duplicates(&self, df: DataFrame, summary: &mut CleaningSummary) -> Result<DataFrame> {
        let before = df.height();
        let (df, removed) = duplicates::remove_duplicates(df)?;

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            summary.add_action(CleaningAction::new(
                ActionType::DuplicatesRemoved,
                "table",
                format!("Removed {} duplicate rows ({:.1}%)", removed, pct),
            ));
            debug!("Removed {} duplicate rows", removed);
        } else {
            debug!("No duplicate rows found");
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FILL_VALUE;
    use pretty_assertions::assert_eq;

    fn employees() -> DataFrame {
        df!(
            "id" => &[1i64, 2, 3, 4, 3],
            "name" => &["Ada", "Grace", "Alan", "Edsger", "Alan"],
            "hire_date" => &["2024-01-05", "01/15/2023", "N/A", "March 3, 2020", "N/A"]
        )
        .unwrap()
    }

    fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_default_config_returns_input() {
        let df = employees();
        let outcome = clean_table(df.clone(), &CleaningConfig::default()).unwrap();
        assert!(outcome.table.equals_missing(&df));
        assert!(outcome.summary.actions.is_empty());
    }

    #[test]
    fn test_duplicates_and_dates() {
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .date_column("hire_date")
            .build()
            .unwrap();

        let outcome = clean_table(employees(), &config).unwrap();

        assert_eq!(outcome.table.height(), 4);
        assert_eq!(
            str_values(&outcome.table, "hire_date"),
            vec![
                Some("2024-01-05".to_string()),
                Some("2023-01-15".to_string()),
                None,
                Some("2020-03-03".to_string()),
            ]
        );
        assert_eq!(outcome.summary.rows_removed(), 1);
        assert_eq!(
            outcome
                .summary
                .actions_of(ActionType::DuplicatesRemoved)
                .count(),
            1
        );
    }

    #[test]
    fn test_fill_covers_unparsable_dates() {
        let df = df!("d" => &[Some("2024-01-05"), None, Some("N/A")]).unwrap();
        let config = CleaningConfig::builder()
            .fill_missing()
            .date_column("d")
            .build()
            .unwrap();

        let outcome = clean_table(df, &config).unwrap();
        assert_eq!(
            str_values(&outcome.table, "d"),
            vec![
                Some("2024-01-05".to_string()),
                Some(DEFAULT_FILL_VALUE.to_string()),
                Some(DEFAULT_FILL_VALUE.to_string()),
            ]
        );
    }

    #[test]
    fn test_fill_leaves_hearing_dates_native() {
        let df = df!(
            "hearing" => &[Some("2024-02-01"), Some("tbd")],
            "party" => &[None, Some("Lee")]
        )
        .unwrap();
        let config = CleaningConfig::builder()
            .fill_missing()
            .hearing_date_column("hearing")
            .build()
            .unwrap();

        let outcome = clean_table(df, &config).unwrap();
        let hearing = outcome.table.column("hearing").unwrap();
        assert_eq!(hearing.dtype(), &DataType::Date);
        assert_eq!(hearing.null_count(), 1);
        assert_eq!(
            str_values(&outcome.table, "party"),
            vec![Some(DEFAULT_FILL_VALUE.to_string()), Some("Lee".to_string())]
        );
    }

    #[test]
    fn test_fill_missing_uses_sentinel() {
        let df = df!(
            "id" => &[1i64, 2],
            "city" => &[None, Some("Oslo")]
        )
        .unwrap();
        let config = CleaningConfig::builder().fill_missing().build().unwrap();

        let outcome = clean_table(df, &config).unwrap();
        assert_eq!(
            str_values(&outcome.table, "city"),
            vec![Some(DEFAULT_FILL_VALUE.to_string()), Some("Oslo".to_string())]
        );
        assert_eq!(outcome.table.column("id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_missing_date_column_is_skipped() {
        let config = CleaningConfig::builder()
            .date_column("not_there")
            .build()
            .unwrap();

        let outcome = clean_table(employees(), &config).unwrap();
        assert!(outcome.table.equals_missing(&employees()));
        assert_eq!(
            outcome.summary.actions_of(ActionType::ColumnSkipped).count(),
            1
        );
    }

    #[test]
    fn test_hearing_date_becomes_date_column() {
        let df = df!("hearing" => &[Some("2024-02-01"), Some("tbd"), None]).unwrap();
        let config = CleaningConfig::builder()
            .hearing_date_column("hearing")
            .build()
            .unwrap();

        let outcome = clean_table(df, &config).unwrap();
        let hearing = outcome.table.column("hearing").unwrap();
        assert_eq!(hearing.dtype(), &DataType::Date);
        assert_eq!(hearing.null_count(), 2);
    }

    #[test]
    fn test_sparse_drop_counts_nulls_before_fill() {
        // Two nulls before fill, zero after
        let df = df!(
            "id" => &[1i64, 2, 3],
            "notes" => &[None, None, Some("x")]
        )
        .unwrap();
        let config = CleaningConfig::builder()
            .fill_missing()
            .drop_if_sparse("notes", 1)
            .build()
            .unwrap();

        let outcome = clean_table(df, &config).unwrap();
        assert_eq!(crate::utils::column_names(&outcome.table), vec!["id".to_string()]);
        assert_eq!(outcome.summary.columns_removed(), 1);
    }

    #[test]
    fn test_sparse_drop_counts_failed_dates() {
        let df = df!(
            "id" => &[1i64, 2, 3],
            "d" => &["2024-01-01", "bad", "2024-01-02"]
        )
        .unwrap();
        let config = CleaningConfig::builder()
            .date_column("d")
            .drop_if_sparse("d", 0)
            .build()
            .unwrap();

        let once = clean_table(df, &config).unwrap().table;
        let twice = clean_table(once.clone(), &config).unwrap().table;

        assert_eq!(once.width(), 1);
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_sparse_drop_threshold_is_strict() {
        let df = df!("notes" => &[None, None, Some("x")], "id" => &[1i64, 2, 3]).unwrap();
        let config = CleaningConfig::builder()
            .drop_if_sparse("notes", 2)
            .build()
            .unwrap();

        let outcome = clean_table(df, &config).unwrap();
        assert_eq!(outcome.table.width(), 2);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .fill_missing()
            .date_column("hire_date")
            .build()
            .unwrap();

        let once = clean_table(employees(), &config).unwrap().table;
        let twice = clean_table(once.clone(), &config).unwrap().table;
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_cleaning_with_every_step_is_idempotent() {
        let df = df!(
            "id" => &[Some(1i64), Some(2), None, Some(2)],
            "d" => &[Some("2024-01-01"), Some("bad"), None, Some("bad")],
            "hearing" => &["2024-02-01", "2024-03-01", "soon", "2024-03-01"],
            "notes" => &[None, Some("x"), None, Some("x")]
        )
        .unwrap();
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .fill_missing()
            .date_column("d")
            .hearing_date_column("hearing")
            .drop_if_sparse("d", 2)
            .drop_if_sparse("hearing", 2)
            .drop_if_sparse("notes", 2)
            .build()
            .unwrap();

        let once = clean_table(df, &config).unwrap().table;
        let twice = clean_table(once.clone(), &config).unwrap();

        assert_eq!(
            crate::utils::column_names(&once),
            vec!["id".to_string(), "hearing".to_string(), "notes".to_string()]
        );
        assert!(once.equals_missing(&twice.table));
        assert_eq!(twice.summary.rows_removed(), 0);
        assert_eq!(twice.summary.columns_removed(), 0);
    }
}
