//! # Error Module
//!
//! Error types for thumbnail generation.
//!
//! ## Design Principles
//! - **Two channels** - configuration problems stop the run before it
//!   starts; everything that goes wrong with a single file is recorded in
//!   the run report and processing continues
//! - **Include context** - paths, size classes, what went wrong
//! - **Never panic** on user data - return errors instead

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ThumbgenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Thumbnail error: {0}")]
    Thumbnail(#[from] ThumbnailError),
}

/// Fatal problems with the run configuration.
///
/// Returned before any file is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Output directory must be an existing directory: {path}")]
    OutputDirMissing { path: PathBuf },

    #[error("Prefix must be an absolute path (starting with /): {prefix}")]
    PrefixNotAbsolute { prefix: String },

    #[error("Prefix must be an existing directory: {prefix}")]
    PrefixMissing { prefix: String },

    #[error("An extension pattern must be provided")]
    EmptyExtensionPattern,

    #[error("Invalid extension pattern {pattern:?}: {reason}")]
    InvalidExtensionPattern { pattern: String, reason: String },

    #[error("At least one thumbnail size must be enabled")]
    NoSizeClasses,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Non-fatal problems with the path transform of a single file.
///
/// Hashing always proceeds with the best-effort transformed path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathWarning {
    #[error("Strip level {strip_count} too big for {path} ({segments} segments)")]
    StripTooDeep {
        path: PathBuf,
        strip_count: usize,
        segments: usize,
    },

    #[error("Non-existing file: {logical_path}")]
    MissingTarget { logical_path: String },

    #[error("Path is not valid UTF-8, hashing its raw bytes: {path}")]
    NonUtf8 { path: PathBuf },
}

/// Errors that occur during directory scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the image codec
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Errors producing a single thumbnail.
///
/// These are collected into the run report, never propagated out of a run.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Failed to write thumbnail {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ThumbnailError {
    /// Whether the cache directory could not be created
    pub fn is_directory_failure(&self) -> bool {
        matches!(self, ThumbnailError::CreateDirectory { .. })
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ThumbgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_includes_path() {
        let error = ConfigError::OutputDirMissing {
            path: PathBuf::from("/cache/thumbnails"),
        };
        assert!(error.to_string().contains("/cache/thumbnails"));
    }

    #[test]
    fn strip_warning_mentions_level() {
        let warning = PathWarning::StripTooDeep {
            path: PathBuf::from("/a/b"),
            strip_count: 5,
            segments: 2,
        };
        let message = warning.to_string();
        assert!(message.contains("Strip level 5 too big"));
        assert!(message.contains("/a/b"));
    }

    #[test]
    fn codec_error_includes_source_path() {
        let error = ThumbnailError::Codec {
            path: PathBuf::from("/photos/broken.jpg"),
            source: CodecError::Decode("invalid JPEG".to_string()),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn directory_failure_is_detected() {
        let error = ThumbnailError::CreateDirectory {
            path: PathBuf::from("/cache/normal"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.is_directory_failure());
    }
}
