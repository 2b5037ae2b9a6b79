//! Per-file session state machine.

use crate::cleaner::clean_table;
use crate::config::CleaningConfig;
use crate::error::{Result, SweeperError};
use crate::export::export_table;
use crate::loader::load_table;
use crate::profiler::profile_table;
use crate::selector::{extract_numeric_preview, head, select_columns};
use crate::types::{CleaningSummary, ConversionRequest, ExportFormat, ExportedFile, TableProfile};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where a session is in `Loaded -> Profiled -> Cleaned -> Projected -> Serialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Loaded,
    Profiled,
    Cleaned,
    Projected,
    Serialized,
}

impl SessionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Profiled => "profiled",
            Self::Cleaned => "cleaned",
            Self::Projected => "projected",
            Self::Serialized => "serialized",
        }
    }
}

/// One uploaded file on its way through the pipeline.
///
/// The session owns its table; every step transforms it by value and the
/// profile is refreshed whenever the table changes.
///
/// # Example
///
/// ```rust,ignore
/// let mut session = FileSession::load("people.csv", &bytes)?;
/// session.profile()?;
/// session.clean(&CleaningConfig::builder().remove_duplicates(true).build()?)?;
/// session.project(&["name".to_string(), "age".to_string()])?;
/// let file = session.export(ExportFormat::Spreadsheet)?;
/// ```
#[derive(Debug)]
pub struct FileSession {
    file_name: String,
    stage: SessionStage,
    table: DataFrame,
    profile: Option<TableProfile>,
    cleaning_summary: Option<CleaningSummary>,
}

static_assertions::assert_impl_all!(FileSession: Send);

impl FileSession {
    /// Parse `bytes` and start a session at [`SessionStage::Loaded`].
    pub fn load(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let file_name = file_name.into();
        let table = load_table(&file_name, bytes)?;
        Ok(Self::from_table(file_name, table))
    }

    /// Start a session from an already loaded table.
    pub fn from_table(file_name: impl Into<String>, table: DataFrame) -> Self {
        Self {
            file_name: file_name.into(),
            stage: SessionStage::Loaded,
            table,
            profile: None,
            cleaning_summary: None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn into_table(self) -> DataFrame {
        self.table
    }

    /// Profile of the current table, if one has been computed.
    pub fn latest_profile(&self) -> Option<&TableProfile> {
        self.profile.as_ref()
    }

    pub fn cleaning_summary(&self) -> Option<&CleaningSummary> {
        self.cleaning_summary.as_ref()
    }

    /// Profile the current table. Allowed at any stage.
    pub fn profile(&mut self) -> Result<&TableProfile> {
        let profile = profile_table(&self.table)?;
        if self.stage < SessionStage::Profiled {
            self.stage = SessionStage::Profiled;
        }
        Ok(self.profile.insert(profile))
    }

    /// Clean the current table. Requires a profile.
    pub fn clean(&mut self, config: &CleaningConfig) -> Result<&CleaningSummary> {
        self.require(SessionStage::Profiled)?;

        let outcome = clean_table(self.table.clone(), config)?;
        self.table = outcome.table;
        self.profile = Some(profile_table(&self.table)?);
        self.stage = SessionStage::Cleaned;

        info!(
            "'{}' cleaned: {} rows removed, {} columns removed",
            self.file_name,
            outcome.summary.rows_removed(),
            outcome.summary.columns_removed()
        );
        Ok(self.cleaning_summary.insert(outcome.summary))
    }

    /// Keep only `columns`, in that order. Requires a cleaned table.
    ///
    /// An empty selection leaves the table as it is.
    pub fn project(&mut self, columns: &[String]) -> Result<&DataFrame> {
        self.require(SessionStage::Cleaned)?;

        if !columns.is_empty() {
            self.table = select_columns(&self.table, columns)?;
            self.profile = Some(profile_table(&self.table)?);
        }
        self.stage = self.stage.max(SessionStage::Projected);
        Ok(&self.table)
    }

    /// First `max_columns` numeric columns, for charting. Requires a cleaned table.
    pub fn numeric_preview(&self, max_columns: usize) -> Result<DataFrame> {
        self.require(SessionStage::Cleaned)?;
        Ok(extract_numeric_preview(&self.table, max_columns))
    }

    /// First `n` rows of the current table. Allowed at any stage.
    pub fn preview(&self, n: usize) -> DataFrame {
        head(&self.table, n)
    }

    /// Serialize the current table. Requires a cleaned table and may be
    /// repeated with different formats.
    pub fn export(&mut self, format: ExportFormat) -> Result<ExportedFile> {
        self.require(SessionStage::Cleaned)?;

        let request = ConversionRequest::new(format, self.file_name.clone());
        let file = export_table(&self.table, &request)?;
        self.stage = SessionStage::Serialized;
        Ok(file)
    }

    fn require(&self, expected: SessionStage) -> Result<()> {
        if self.stage < expected {
            return Err(SweeperError::InvalidStage {
                expected: expected.as_str(),
                actual: self.stage.as_str(),
            });
        }
        Ok(())
    }
}
