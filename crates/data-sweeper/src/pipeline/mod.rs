//! Pipeline orchestration.
//!
//! A [`FileSession`] carries one file through load, profile, clean,
//! projection and export. A [`Batch`] runs several files with shared
//! options and reports progress along the way.

mod batch;
pub mod progress;
mod session;

pub use batch::{Batch, BatchOptions, FileOutcome, InputFile};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
pub use session::{FileSession, SessionStage};
