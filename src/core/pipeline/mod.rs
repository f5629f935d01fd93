//! # Pipeline Module
//!
//! Orchestrates a thumbnail run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Enumerate candidate files in the given directories
//! 2. **Generate** - Per file: canonicalize the path, derive the cache key,
//!    write every stale or missing size class
//!
//! ## Parallelism
//! Files are spread over a rayon pool. The size classes of one file run on
//! the same worker, so one image is decoded once and its directories are
//! not created twice at the same moment.

mod executor;
mod report;

pub use executor::{default_output_dir, Pipeline, PipelineBuilder, PipelineConfig};
pub use report::{PathWarningRecord, RunReport, ThumbnailFailure};
