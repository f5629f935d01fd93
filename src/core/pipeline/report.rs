//! Accumulated per-file outcomes of a run.

use crate::core::cache_key::SizeClass;
use serde::Serialize;
use std::path::PathBuf;

/// A thumbnail that could not be produced
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailFailure {
    pub source: PathBuf,
    /// `None` when the source itself could not be read or decoded
    pub size: Option<SizeClass>,
    pub message: String,
    /// The cache directory could not be created
    #[serde(skip)]
    pub directory_failure: bool,
}

/// A path transform warning for one source
#[derive(Debug, Clone, Serialize)]
pub struct PathWarningRecord {
    pub source: PathBuf,
    pub message: String,
}

/// Summary of a finished run
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Files that passed the extension filter
    pub files_scanned: usize,
    /// Files for which at least one cache entry was written
    pub files_processed: usize,
    /// Cache entries written
    pub generated: usize,
    /// Cache entries that were already fresh
    pub up_to_date: usize,
    pub failures: Vec<ThumbnailFailure>,
    pub warnings: Vec<PathWarningRecord>,
    /// Non-fatal enumeration errors
    pub scan_errors: Vec<String>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Nothing failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.scan_errors.is_empty()
    }

    /// Every failure was a cache directory that could not be created and
    /// nothing at all was written
    pub fn cache_root_unwritable(&self) -> bool {
        self.generated == 0
            && !self.failures.is_empty()
            && self.failures.iter().all(|f| f.directory_failure)
    }
}
