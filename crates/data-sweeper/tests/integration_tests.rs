//! Integration tests for the cleaning and conversion pipeline.
//!
//! These tests drive the public API end to end using the CSV fixtures.

use data_sweeper::{
    ActionType, Batch, BatchOptions, CleaningConfig, DEFAULT_FILL_VALUE, ExportFormat,
    FileSession, InputFile, PipelineStage, SessionStage, SweeperError, clean_table, load_table,
    profile_table, select_columns,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> InputFile {
    InputFile::from_path(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn load_fixture(filename: &str) -> DataFrame {
    let file = fixture(filename);
    load_table(&file.name, &file.bytes).expect("Failed to load fixture")
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn text_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    let series = df
        .column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::String)
        .unwrap();
    series
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn employee_config() -> CleaningConfig {
    CleaningConfig::builder()
        .remove_duplicates(true)
        .date_column("hire_date")
        .build()
        .unwrap()
}

// ============================================================================
// Cleaning Scenarios
// ============================================================================

#[test]
fn test_employee_scenario() {
    let df = load_fixture("employees.csv");
    let profile = profile_table(&df).unwrap();
    assert_eq!(profile.shape, (5, 3));
    assert_eq!(profile.duplicate_count, 1);

    let outcome = clean_table(df, &employee_config()).unwrap();

    assert_eq!(outcome.table.shape(), (4, 3));
    assert_eq!(
        text_values(&outcome.table, "hire_date"),
        vec![
            Some("2024-01-05".to_string()),
            Some("2023-12-31".to_string()),
            None,
            Some("2022-03-15".to_string()),
        ]
    );
    assert_eq!(outcome.summary.rows_removed(), 1);
    assert_eq!(outcome.summary.columns_removed(), 0);
}

#[test]
fn test_employee_scenario_with_fill() {
    let config = CleaningConfig::builder()
        .remove_duplicates(true)
        .date_column("hire_date")
        .fill_missing()
        .build()
        .unwrap();

    let outcome = clean_table(load_fixture("employees.csv"), &config).unwrap();

    assert_eq!(outcome.table.height(), 4);
    assert_eq!(
        text_values(&outcome.table, "hire_date"),
        vec![
            Some("2024-01-05".to_string()),
            Some("2023-12-31".to_string()),
            Some(DEFAULT_FILL_VALUE.to_string()),
            Some("2022-03-15".to_string()),
        ]
    );
}

#[test]
fn test_hearing_scenario() {
    let df = load_fixture("hearings.csv");
    let config = CleaningConfig::builder()
        .remove_duplicates(true)
        .hearing_date_column("hearing_date")
        .drop_if_sparse("notes", 3)
        .build()
        .unwrap();

    let outcome = clean_table(df, &config).unwrap();

    assert_eq!(
        names(&outcome.table),
        vec!["case_id", "party", "hearing_date"]
    );
    assert_eq!(outcome.table.height(), 4);
    assert_eq!(
        outcome.table.column("hearing_date").unwrap().dtype(),
        &DataType::Date
    );
    assert_eq!(
        text_values(&outcome.table, "hearing_date"),
        vec![
            Some("2024-02-01".to_string()),
            Some("2024-02-15".to_string()),
            None,
            None,
        ]
    );
    assert_eq!(
        outcome
            .summary
            .actions_of(ActionType::ColumnRemoved)
            .count(),
        1
    );
}

#[test]
fn test_cleaning_is_idempotent() {
    let config = CleaningConfig::builder()
        .remove_duplicates(true)
        .date_column("hire_date")
        .fill_missing()
        .build()
        .unwrap();

    let once = clean_table(load_fixture("employees.csv"), &config).unwrap();
    let twice = clean_table(once.table.clone(), &config).unwrap();

    assert!(once.table.equals_missing(&twice.table));
    assert_eq!(twice.summary.rows_removed(), 0);
}

#[test]
fn test_duplicate_count_ignores_row_order() {
    let df = load_fixture("hearings.csv");
    let reversed = df.reverse();

    assert_eq!(
        profile_table(&df).unwrap().duplicate_count,
        profile_table(&reversed).unwrap().duplicate_count
    );
}

#[test]
fn test_sparse_threshold_is_strict() {
    let rows = 100;
    let column = |nulls: usize| -> Vec<Option<&str>> {
        (0..rows)
            .map(|i| if i < rows - nulls { Some("kept") } else { None })
            .collect()
    };
    let df = df!(
        "id" => (0..rows as i64).collect::<Vec<_>>(),
        "over" => column(91),
        "at" => column(90)
    )
    .unwrap();

    let config = CleaningConfig::builder()
        .drop_if_sparse("over", 90)
        .drop_if_sparse("at", 90)
        .build()
        .unwrap();
    let outcome = clean_table(df, &config).unwrap();

    assert_eq!(names(&outcome.table), vec!["id", "at"]);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_selection_follows_requested_order() {
    let df = load_fixture("employees.csv");
    let selection = vec!["hire_date".to_string(), "id".to_string()];

    let selected = select_columns(&df, &selection).unwrap();

    assert_eq!(names(&selected), vec!["hire_date", "id"]);
    assert_eq!(selected.height(), df.height());
}

#[test]
fn test_selection_with_unknown_column() {
    let df = load_fixture("employees.csv");
    let err = select_columns(&df, &["salary".to_string()]).unwrap_err();
    assert!(matches!(err, SweeperError::UnknownColumn(ref name) if name == "salary"));
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_csv_round_trip() {
    let file = fixture("employees.csv");
    let mut session = FileSession::load(file.name.clone(), &file.bytes).unwrap();
    session.profile().unwrap();
    session.clean(&employee_config()).unwrap();

    let exported = session.export(ExportFormat::Csv).unwrap();
    assert_eq!(exported.file_name, "employees.csv.csv");

    let back = load_table("employees.csv", &exported.bytes).unwrap();
    assert!(back.equals_missing(session.table()));
}

#[test]
fn test_xlsx_conversion_keeps_shape() {
    let file = fixture("hearings.csv");
    let mut session = FileSession::load(file.name.clone(), &file.bytes).unwrap();
    session.profile().unwrap();
    let config = CleaningConfig::builder()
        .hearing_date_column("hearing_date")
        .build()
        .unwrap();
    session.clean(&config).unwrap();

    let exported = session.export(ExportFormat::Spreadsheet).unwrap();
    assert_eq!(exported.file_name, "hearings.csv.xlsx");
    assert_eq!(session.stage(), SessionStage::Serialized);

    let back = load_table(&exported.file_name, &exported.bytes).unwrap();
    assert_eq!(back.shape(), (5, 4));
    assert_eq!(back.column("hearing_date").unwrap().dtype(), &DataType::Date);
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_batch_skips_unsupported_file() {
    let files = vec![
        InputFile::new("data.txt", b"id,name\n1,Ada\n".to_vec()),
        fixture("employees.csv"),
    ];
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    let outcomes = Batch::new(BatchOptions::new(employee_config()))
        .on_progress(move |update| sink.lock().unwrap().push((update.file_index, update.stage)))
        .run(files);

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0].error(),
        Some(SweeperError::UnsupportedFormat(ext)) if ext == "txt"
    ));
    assert_eq!(outcomes[1].session().unwrap().table().height(), 4);

    let stages = stages.lock().unwrap();
    assert!(stages.contains(&(0, PipelineStage::Failed)));
    assert_eq!(stages.last(), Some(&(1, PipelineStage::Complete)));
}

#[test]
fn test_batch_applies_selection() {
    let options = BatchOptions::new(employee_config())
        .with_selection(vec!["name".to_string(), "id".to_string()]);

    let mut outcomes = Batch::new(options).run(vec![fixture("employees.csv")]);
    let session = outcomes[0].session_mut().unwrap();

    assert_eq!(names(session.table()), vec!["name", "id"]);
    assert_eq!(session.stage(), SessionStage::Projected);

    let exported = session.export(ExportFormat::Csv).unwrap();
    let text = String::from_utf8(exported.bytes).unwrap();
    assert!(text.starts_with("name,id\n"));
}
