//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ExtensionFilter};
use super::{ScanResult, SourceFile, SourceScanner};
use crate::error::{ConfigError, ScanError};
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links to directories
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Case-insensitive regex the file extension must match
    pub extension_pattern: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            extension_pattern: super::DEFAULT_EXTENSION_PATTERN.to_string(),
        }
    }
}

/// Scanner implementation using the walkdir crate
#[derive(Debug)]
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    /// Create a new scanner, compiling the extension pattern
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        let filter =
            ExtensionFilter::new(&config.extension_pattern)?.with_hidden(config.include_hidden);
        Ok(Self { config, filter })
    }

    /// Scan a single directory
    fn scan_directory(
        &self,
        root: &Path,
        events: Option<&EventSender>,
    ) -> Result<(Vec<SourceFile>, Vec<ScanError>), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();
        let mut directories_scanned = 0;

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_dir() {
                        directories_scanned += 1;

                        if let Some(sender) = events {
                            sender.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                                directories_scanned,
                                files_found: files.len(),
                                current_path: path.to_path_buf(),
                            })));
                        }

                        continue;
                    }

                    if !self.filter.should_include(path) {
                        debug!("skipping: {}", path.display());
                        continue;
                    }

                    // Follows file symlinks; dangling links surface as errors
                    match fs::metadata(path) {
                        Ok(metadata) if metadata.is_file() => {
                            let file = SourceFile {
                                path: path.to_path_buf(),
                                size: metadata.len(),
                                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                            };

                            if let Some(sender) = events {
                                sender.send(Event::Scan(ScanEvent::FileFound {
                                    path: file.path.clone(),
                                }));
                            }

                            files.push(file);
                        }
                        Ok(_) => {
                            debug!("skipping non-regular file: {}", path.display());
                        }
                        Err(e) => {
                            let error = ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            };

                            if let Some(sender) = events {
                                sender.send(Event::Scan(ScanEvent::Error {
                                    path: path.to_path_buf(),
                                    message: error.to_string(),
                                }));
                            }

                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    if let Some(sender) = events {
                        sender.send(Event::Scan(ScanEvent::Error {
                            path,
                            message: error.to_string(),
                        }));
                    }

                    errors.push(error);
                }
            }
        }

        Ok((files, errors))
    }
}

impl SourceScanner for WalkDirScanner {
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError> {
        self.scan_with_events(paths, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        let mut all_files = Vec::new();
        let mut all_errors = Vec::new();

        for path in paths {
            match self.scan_directory(path, Some(events)) {
                Ok((files, errors)) => {
                    all_files.extend(files);
                    all_errors.extend(errors);
                }
                Err(e) => {
                    all_errors.push(e);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: all_files.len(),
        }));

        Ok(ScanResult {
            files: all_files,
            errors: all_errors,
        })
    }
}
