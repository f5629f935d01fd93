//! # Scanner Module
//!
//! Enumerates candidate source images in directory trees.
//!
//! Scanning only produces paths and timestamps; the transform-and-write
//! stage runs separately on the result.
//!
//! ## Example
//! ```rust,ignore
//! use thumbgen::core::scanner::{ScanConfig, SourceScanner, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default())?;
//! let result = scanner.scan(&["/home/user/Pictures".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::{ExtensionFilter, DEFAULT_EXTENSION_PATTERN};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A discovered source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path as discovered by the walk
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
}

impl SourceFile {
    /// Stat `path` into a source file
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            path,
        })
    }

    /// Modification time in whole unix seconds
    pub fn modified_unix_secs(&self) -> u64 {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Files whose extension matched
    pub files: Vec<SourceFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for source scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait SourceScanner: Send + Sync {
    /// Scan directories and return discovered files
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn source_file_from_path_reads_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"12345").unwrap();

        let source = SourceFile::from_path(&path).unwrap();
        assert_eq!(source.size, 5);
        assert_eq!(source.path, path);
    }

    #[test]
    fn source_file_from_missing_path_fails() {
        assert!(SourceFile::from_path("/nonexistent/path/12345.jpg").is_err());
    }

    #[test]
    fn modified_seconds_truncate() {
        let source = SourceFile {
            path: PathBuf::from("/a.jpg"),
            size: 0,
            modified: UNIX_EPOCH + Duration::from_millis(1_500),
        };
        assert_eq!(source.modified_unix_secs(), 1);
    }
}
