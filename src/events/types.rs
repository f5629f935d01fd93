//! Event type definitions for progress reporting.

use crate::core::cache_key::SizeClass;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the thumbnail pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory enumeration
    Scan(ScanEvent),
    /// Per-file thumbnail work
    Thumbnail(ThumbnailEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { paths: Vec<PathBuf> },
    Progress(ScanProgress),
    /// A file passed the extension filter
    FileFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    Completed { total_files: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub directories_scanned: usize,
    pub files_found: usize,
    /// Directory being entered
    pub current_path: PathBuf,
}

/// Events while thumbnails are produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThumbnailEvent {
    Started { total_files: usize },
    /// One source file finished, whatever its outcome
    Progress(ThumbnailProgress),
    /// A cache entry was written
    Generated { source: PathBuf, target: PathBuf },
    /// A cache entry was already fresh
    UpToDate { target: PathBuf },
    /// Path transform produced a warning
    Warning { source: PathBuf, message: String },
    /// A thumbnail could not be produced; processing continues
    Error {
        source: PathBuf,
        size: Option<SizeClass>,
        message: String,
    },
    Completed { generated: usize, up_to_date: usize, failed: usize },
}

/// Progress information while producing thumbnails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailProgress {
    /// Source files finished so far
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Generating,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub files_scanned: usize,
    pub generated: usize,
    pub up_to_date: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Generating => write!(f, "Generating thumbnails"),
        }
    }
}
