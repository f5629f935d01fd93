//! File filtering logic for the scanner.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use std::path::Path;

/// Extensions accepted when no pattern is configured.
///
/// Only formats the decoder can read; XPM is left out for that reason.
pub const DEFAULT_EXTENSION_PATTERN: &str = "bmp|jpe?g|gif|png|tiff?|ico|webp";

/// Filters files by a case-insensitive extension regex
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Pattern anchored at the start of the extension (without its dot)
    pattern: Regex,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Compile `pattern` (e.g. `jpe?g|png`). The pattern must match at the
    /// start of the extension; `tif` also selects `.tiff`.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.trim().is_empty() {
            return Err(ConfigError::EmptyExtensionPattern);
        }

        let anchored = format!("^(?:{})", pattern);
        let pattern = RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidExtensionPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            pattern,
            include_hidden: true,
        })
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.pattern.is_match(ext))
            .unwrap_or(false)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION_PATTERN).expect("default extension pattern is valid")
    }
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
