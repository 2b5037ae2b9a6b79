//! CLI entry point for the data sweeper.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use data_sweeper::{
    Batch, BatchOptions, CleaningConfig, CleaningSummary, DEFAULT_FILL_VALUE,
    DEFAULT_PREVIEW_COLUMNS, ExportFormat, FileOutcome, FileSession, InputFile, SparseColumnRule,
    TableProfile, profile_table,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Rows shown in the on-screen preview.
const PREVIEW_ROWS: usize = 5;

/// CLI-compatible export format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook
    Xlsx,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(cli: CliExportFormat) -> Self {
        match cli {
            CliExportFormat::Csv => ExportFormat::Csv,
            CliExportFormat::Xlsx => ExportFormat::Spreadsheet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean tabular files and convert them between CSV and Excel",
    long_about = "Profiles, cleans and converts CSV and XLSX files.\n\n\
                  EXAMPLES:\n  \
                  # Profile only\n  \
                  data-sweeper employees.csv --profile-only\n\n  \
                  # Remove duplicates, normalize a date column, export to Excel\n  \
                  data-sweeper employees.csv --remove-duplicates --date-column hire_date --format xlsx\n\n  \
                  # Fill missing values and drop a sparse column\n  \
                  data-sweeper cases.xlsx --fill-missing --drop-sparse notes=90 -o cleaned/"
)]
struct Args {
    /// CSV or XLSX files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory for converted files
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: CliExportFormat,

    /// JSON cleaning configuration; explicit flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remove rows that repeat an earlier row
    #[arg(long)]
    remove_duplicates: bool,

    /// Fill missing cells, with "Not Available" unless a value is given
    #[arg(long, value_name = "VALUE", num_args = 0..=1, default_missing_value = DEFAULT_FILL_VALUE)]
    fill_missing: Option<String>,

    /// Column to normalize as YYYY-MM-DD (repeatable)
    #[arg(long = "date-column", value_name = "NAME")]
    date_columns: Vec<String>,

    /// Column to convert into a native date column
    #[arg(long, value_name = "NAME")]
    hearing_date_column: Option<String>,

    /// Drop NAME when it has more than MAX_NULLS missing cells (repeatable)
    #[arg(long = "drop-sparse", value_name = "NAME=MAX_NULLS", value_parser = parse_sparse_rule)]
    drop_sparse: Vec<SparseColumnRule>,

    /// Column to keep, in output order (repeatable)
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,

    /// Print profiles without cleaning or exporting
    #[arg(long)]
    profile_only: bool,

    /// Print the first numeric columns of each cleaned table
    #[arg(long)]
    chart: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_sparse_rule(value: &str) -> std::result::Result<SparseColumnRule, String> {
    let (name, max) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=MAX_NULLS, got '{}'", value))?;
    if name.trim().is_empty() {
        return Err("column name must not be empty".to_string());
    }
    let max_nulls = max
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid null limit '{}': {}", max, e))?;
    Ok(SparseColumnRule::new(name.trim(), max_nulls))
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merge the config file (if any) with explicit flags.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Reading config file {}", path.display()))?;
            CleaningConfig::from_json(&json)?
        }
        None => CleaningConfig::default(),
    };

    if args.remove_duplicates {
        config.remove_duplicates = true;
    }
    if let Some(value) = &args.fill_missing {
        config.fill_missing_with = Some(value.clone());
    }
    for name in &args.date_columns {
        if !config.date_columns.contains(name) {
            config.date_columns.push(name.clone());
        }
    }
    if let Some(name) = &args.hearing_date_column {
        config.hearing_date_column = Some(name.clone());
    }
    for rule in &args.drop_sparse {
        config.sparse_column_drops.retain(|r| r.column != rule.column);
        config.sparse_column_drops.push(rule.clone());
    }

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Per-file entry of the `--json` output.
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<&'a TableProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleaning: Option<&'a CleaningSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;

    let mut failures = 0;
    let mut files = Vec::with_capacity(args.files.len());
    let mut unreadable = Vec::new();
    for path in &args.files {
        match InputFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                error!("{}", e);
                failures += 1;
                unreadable.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    if args.profile_only {
        failures += run_profile_only(&args, files, &unreadable)?;
    } else {
        failures += run_batch(&args, config, files, &unreadable)?;
    }

    if failures == args.files.len() {
        return Err(anyhow!("All {} files failed", failures));
    }
    Ok(())
}

/// Profile each file without cleaning. Returns the number of failed files.
fn run_profile_only(
    args: &Args,
    files: Vec<InputFile>,
    unreadable: &[(String, String)],
) -> Result<usize> {
    let mut failures = 0;
    let mut profiles = Vec::with_capacity(files.len());

    for file in &files {
        match data_sweeper::load_table(&file.name, &file.bytes).and_then(|df| profile_table(&df)) {
            Ok(profile) => profiles.push((file.name.as_str(), Ok(profile))),
            Err(e) => {
                warn!("Skipping '{}': {}", file.name, e);
                failures += 1;
                profiles.push((file.name.as_str(), Err(e.to_string())));
            }
        }
    }

    if args.json {
        let mut reports = failed_reports(unreadable);
        for (name, result) in &profiles {
            reports.push(match result {
                Ok(profile) => FileReport {
                    file: name,
                    status: "profiled",
                    profile: Some(profile),
                    cleaning: None,
                    output_file: None,
                    error: None,
                },
                Err(e) => failed_report(name, e),
            });
        }
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(failures);
    }

    for (name, result) in &profiles {
        if let Ok(profile) = result {
            print_profile(name, profile);
        }
    }
    Ok(failures)
}

/// Clean, project and export every file. Returns the number of failed files.
fn run_batch(
    args: &Args,
    config: CleaningConfig,
    files: Vec<InputFile>,
    unreadable: &[(String, String)],
) -> Result<usize> {
    let options = BatchOptions::new(config).with_selection(args.select.clone());
    let mut batch = Batch::new(options);
    if !args.quiet && !args.json {
        batch = batch.on_progress(|update| {
            info!(
                "[{:.0}%] {} {}: {}",
                update.progress * 100.0,
                update.file_name,
                update.stage.display_name(),
                update.message
            );
        });
    }

    let mut outcomes = batch.run(files);

    if !outcomes.is_empty() {
        std::fs::create_dir_all(&args.output)
            .with_context(|| format!("Creating output directory {}", args.output.display()))?;
    }

    let format = ExportFormat::from(args.format);
    let mut failures = 0;
    let mut written = Vec::with_capacity(outcomes.len());

    for outcome in &mut outcomes {
        let Some(session) = outcome.session_mut() else {
            failures += 1;
            written.push(None);
            continue;
        };
        match export_session(session, format, &args.output) {
            Ok(path) => written.push(Some(path)),
            Err(e) => {
                error!("Export of '{}' failed: {}", session.file_name(), e);
                failures += 1;
                written.push(None);
            }
        }
    }

    if args.json {
        let mut reports = failed_reports(unreadable);
        for (outcome, output) in outcomes.iter().zip(&written) {
            reports.push(match outcome {
                FileOutcome::Ready {
                    session,
                    projection_error,
                } => FileReport {
                    file: session.file_name(),
                    status: if output.is_some() { "exported" } else { "export_failed" },
                    profile: session.latest_profile(),
                    cleaning: session.cleaning_summary(),
                    output_file: output.as_ref().map(|p| p.display().to_string()),
                    error: projection_error.as_ref().map(|e| e.to_string()),
                },
                FileOutcome::Failed { file_name, error } => {
                    failed_report(file_name, &error.to_string())
                }
            });
        }
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(failures);
    }

    for (outcome, output) in outcomes.iter().zip(&written) {
        match outcome {
            FileOutcome::Ready {
                session,
                projection_error,
            } => {
                print_session(session, output.as_deref(), args.chart)?;
                if let Some(e) = projection_error {
                    println!("Selection not applied: {}", e);
                }
            }
            FileOutcome::Failed { file_name, error } => {
                println!("{}: FAILED ({})", file_name, error);
            }
        }
    }
    Ok(failures)
}

fn export_session(session: &mut FileSession, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    let file = session.export(format)?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes).with_context(|| format!("Writing {}", path.display()))?;
    info!("Wrote {} ({})", path.display(), file.mime_type);
    Ok(path)
}

fn failed_reports(unreadable: &[(String, String)]) -> Vec<FileReport<'_>> {
    unreadable
        .iter()
        .map(|(name, error)| failed_report(name, error))
        .collect()
}

fn failed_report<'a>(file: &'a str, error: &str) -> FileReport<'a> {
    FileReport {
        file,
        status: "failed",
        profile: None,
        cleaning: None,
        output_file: None,
        error: Some(error.to_string()),
    }
}

/// Print a profile.
///
/// This uses `println!` intentionally: it is the primary CLI output and
/// should be visible regardless of log level.
fn print_profile(name: &str, profile: &TableProfile) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", name);
    println!("{}", "=".repeat(80));
    println!("{}", profile.render_info());
    println!();
    println!(
        "{:<24} {:<10} {:<10} {:<10}",
        "Column", "Nulls", "Unique", "Looks like"
    );
    println!("{}", "-".repeat(60));
    for col in &profile.column_profiles {
        println!(
            "{:<24} {:<10} {:<10} {:<10}",
            truncate_str(&col.name, 23),
            col.null_count,
            col.unique_count,
            col.inferred_type.as_str()
        );
    }

    let date_like = profile.date_like_columns();
    if !date_like.is_empty() {
        println!();
        println!("Date-like text columns: {}", date_like.join(", "));
    }
}

fn print_session(session: &FileSession, output: Option<&Path>, chart: bool) -> Result<()> {
    if let Some(profile) = session.latest_profile() {
        print_profile(session.file_name(), profile);
    }

    if let Some(summary) = session.cleaning_summary() {
        println!();
        println!(
            "Rows: {} -> {} ({} removed)",
            summary.rows_before,
            summary.rows_after,
            summary.rows_removed()
        );
        println!(
            "Columns: {} -> {} ({} removed)",
            summary.columns_before,
            summary.columns_after,
            summary.columns_removed()
        );
        if !summary.actions.is_empty() {
            println!("Actions Taken:");
            for action in &summary.actions {
                println!(
                    "  - [{}] {}: {}",
                    action.action_type.display_name(),
                    action.target,
                    action.description
                );
            }
        }
    }

    println!();
    println!("{}", session.preview(PREVIEW_ROWS));

    if chart {
        let preview = session.numeric_preview(DEFAULT_PREVIEW_COLUMNS)?;
        if preview.width() == 0 {
            println!("No numeric columns to chart");
        } else {
            println!("Numeric preview:");
            println!("{}", preview);
        }
    }

    if let Some(path) = output {
        println!("Output: {}", path.display());
    }
    Ok(())
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
