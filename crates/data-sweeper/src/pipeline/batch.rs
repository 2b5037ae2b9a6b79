//! Sequential processing of several uploaded files.

use super::progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
use super::session::FileSession;
use crate::config::CleaningConfig;
use crate::error::{Result, SweeperError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Settings applied to every file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub cleaning: CleaningConfig,
    /// Columns to keep, in order. Empty keeps every column.
    pub selected_columns: Vec<String>,
}

impl BatchOptions {
    pub fn new(cleaning: CleaningConfig) -> Self {
        Self {
            cleaning,
            selected_columns: Vec::new(),
        }
    }

    pub fn with_selection(mut self, columns: Vec<String>) -> Self {
        self.selected_columns = columns;
        self
    }
}

/// An uploaded file: its name and raw content.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, named after its final path component.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            SweeperError::Io(e).with_context(format!("Reading '{}'", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Result of one file in a batch.
#[derive(Debug)]
pub enum FileOutcome {
    /// Loaded, profiled and cleaned; ready for export.
    ///
    /// When the selection could not be applied the session stays at
    /// [`SessionStage::Cleaned`](super::SessionStage) with every column and
    /// `projection_error` says why.
    Ready {
        session: FileSession,
        projection_error: Option<SweeperError>,
    },
    Failed {
        file_name: String,
        error: SweeperError,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Ready { session, .. } => session.file_name(),
            Self::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn session(&self) -> Option<&FileSession> {
        match self {
            Self::Ready { session, .. } => Some(session),
            Self::Failed { .. } => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut FileSession> {
        match self {
            Self::Ready { session, .. } => Some(session),
            Self::Failed { .. } => None,
        }
    }

    /// Why the file could not be processed at all.
    pub fn error(&self) -> Option<&SweeperError> {
        match self {
            Self::Ready { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Why the column selection was not applied to a ready file.
    pub fn projection_error(&self) -> Option<&SweeperError> {
        match self {
            Self::Ready {
                projection_error, ..
            } => projection_error.as_ref(),
            Self::Failed { .. } => None,
        }
    }
}

/// Runs every file through load, profile, clean and optional projection.
///
/// A failure only affects its own file; the remaining files are still
/// processed. A selection naming unknown columns only cancels the projection
/// of that file.
pub struct Batch {
    options: BatchOptions,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl Batch {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            progress_reporter: None,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Set a progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure that receives progress updates.
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.with_reporter(Arc::new(ClosureProgressReporter::new(callback)))
    }

    pub fn run(&self, files: Vec<InputFile>) -> Vec<FileOutcome> {
        let file_count = files.len();
        info!("Processing batch of {} files", file_count);

        let outcomes: Vec<FileOutcome> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let InputFile { name, bytes } = file;
                match self.process_file(&name, &bytes, index, file_count) {
                    Ok((session, projection_error)) => {
                        let message = match &projection_error {
                            Some(e) => format!("Ready without selection: {}", e),
                            None => "Ready".to_string(),
                        };
                        self.report(PipelineStage::Complete, &name, index, file_count, message);
                        FileOutcome::Ready {
                            session,
                            projection_error,
                        }
                    }
                    Err(error) => {
                        warn!("Skipping '{}': {}", name, error);
                        self.report(
                            PipelineStage::Failed,
                            &name,
                            index,
                            file_count,
                            error.to_string(),
                        );
                        FileOutcome::Failed {
                            file_name: name,
                            error,
                        }
                    }
                }
            })
            .collect();

        let ready = outcomes.iter().filter(|o| o.is_ready()).count();
        info!("Batch finished: {} ready, {} failed", ready, file_count - ready);
        outcomes
    }

    fn process_file(
        &self,
        name: &str,
        bytes: &[u8],
        index: usize,
        file_count: usize,
    ) -> Result<(FileSession, Option<SweeperError>)> {
        self.report(PipelineStage::Loading, name, index, file_count, "Loading file");
        let mut session = FileSession::load(name, bytes)?;

        self.report(PipelineStage::Profiling, name, index, file_count, "Profiling table");
        session.profile()?;

        self.report(PipelineStage::Cleaning, name, index, file_count, "Cleaning table");
        session.clean(&self.options.cleaning)?;

        if !self.options.selected_columns.is_empty() {
            self.report(
                PipelineStage::Selecting,
                name,
                index,
                file_count,
                format!("Selecting {} columns", self.options.selected_columns.len()),
            );
        }
        let projection_error = match session.project(&self.options.selected_columns) {
            Ok(_) => None,
            Err(e @ SweeperError::UnknownColumn(_)) => {
                warn!("Selection not applied to '{}': {}", name, e);
                Some(e)
            }
            Err(e) => return Err(e),
        };

        Ok((session, projection_error))
    }

    fn report(
        &self,
        stage: PipelineStage,
        name: &str,
        index: usize,
        file_count: usize,
        message: impl Into<String>,
    ) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(ProgressUpdate::new(stage, name, index, file_count, message));
        }
    }
}
