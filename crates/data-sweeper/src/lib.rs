//! Data Sweeper Library
//!
//! Tabular cleaning and format conversion built on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV and XLSX uploads parsed into a `DataFrame`
//! - **Profiling**: shape, null counts, duplicate rows and type hints
//! - **Cleaning**: sentinel fill, date normalization, sparse column drops and
//!   duplicate removal, applied in a fixed order
//! - **Selection**: column projection, numeric chart previews and head previews
//! - **Export**: fully buffered CSV or XLSX downloads
//! - **Sessions and batches**: per-file stage tracking and multi-file runs
//!   with progress reporting
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_sweeper::{CleaningConfig, ExportFormat, FileSession};
//!
//! let bytes = std::fs::read("employees.csv")?;
//! let mut session = FileSession::load("employees.csv", &bytes)?;
//!
//! let profile = session.profile()?;
//! println!("{}", profile.render_info());
//!
//! let config = CleaningConfig::builder()
//!     .remove_duplicates(true)
//!     .date_column("hire_date")
//!     .build()?;
//! session.clean(&config)?;
//!
//! let file = session.export(ExportFormat::Spreadsheet)?;
//! std::fs::write(&file.file_name, &file.bytes)?;
//! ```
//!
//! # Batches
//!
//! ```rust,ignore
//! use data_sweeper::{Batch, BatchOptions, InputFile};
//!
//! let files = vec![InputFile::from_path("a.csv")?, InputFile::from_path("b.xlsx")?];
//! let outcomes = Batch::new(BatchOptions::new(config))
//!     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
//!     .run(files);
//!
//! for outcome in &outcomes {
//!     match outcome.error() {
//!         Some(e) => eprintln!("{}: {}", outcome.file_name(), e),
//!         None => println!("{}: ready", outcome.file_name()),
//!     }
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod selector;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleaningOutcome, DataCleaner, clean_table};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, DEFAULT_FILL_VALUE,
    SparseColumnRule,
};
pub use error::{Result as SweeperResult, ResultExt, SweeperError};
pub use export::export_table;
pub use loader::load_table;
pub use pipeline::{
    Batch, BatchOptions, ClosureProgressReporter, FileOutcome, FileSession, InputFile,
    PipelineStage, ProgressReporter, ProgressUpdate, SessionStage,
};
pub use profiler::{DataProfiler, profile_table};
pub use selector::{DEFAULT_PREVIEW_COLUMNS, extract_numeric_preview, head, select_columns};
pub use types::{
    ActionType, CleaningAction, CleaningSummary, ColumnProfile, ColumnType, ConversionRequest,
    ExportFormat, ExportedFile, InferredType, InputFormat, TableProfile,
};
