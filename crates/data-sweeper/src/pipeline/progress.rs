//! Progress reporting for batch runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_sweeper::{Batch, BatchOptions};
//!
//! let outcomes = Batch::new(BatchOptions::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .run(files);
//! ```

use serde::{Deserialize, Serialize};

/// Stages a file passes through in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Parsing the uploaded bytes
    Loading,
    /// Computing the table profile
    Profiling,
    /// Applying the cleaning configuration
    Cleaning,
    /// Projecting onto the selected columns
    Selecting,
    /// The file is ready for export
    Complete,
    /// The file was skipped because of an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading File",
            Self::Profiling => "Profiling Table",
            Self::Cleaning => "Cleaning Data",
            Self::Selecting => "Selecting Columns",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of a single file's work finished when this stage starts.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Profiling => 0.35,
            Self::Cleaning => 0.50,
            Self::Selecting => 0.90,
            Self::Complete | Self::Failed => 1.0,
        }
    }
}

/// One progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// File being processed
    pub file_name: String,

    /// Zero-based position of the file in the batch
    pub file_index: usize,

    pub file_count: usize,

    /// Overall batch progress (0.0 - 1.0)
    pub progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(
        stage: PipelineStage,
        file_name: impl Into<String>,
        file_index: usize,
        file_count: usize,
        message: impl Into<String>,
    ) -> Self {
        let progress = if file_count == 0 {
            1.0
        } else {
            (file_index as f32 + stage.base_progress()) / file_count as f32
        };
        Self {
            stage,
            file_name: file_name.into(),
            file_index,
            file_count,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }
}

/// Receives progress updates from a [`Batch`](super::Batch).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
