//! # Staleness Module
//!
//! Decides whether a cache entry has to be (re)generated.
//!
//! Freshness is judged by modification time alone: an entry written after
//! the source last changed is assumed to still depict it. Equal timestamps
//! count as fresh.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// State of a cache entry relative to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    /// No file at the cache path
    Missing,
    /// Older than the source, or rewrite forced
    Stale,
    /// Up to date
    Fresh,
}

impl Freshness {
    pub fn needs_regeneration(&self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

/// Modification-time based staleness check
#[derive(Debug, Clone, Copy, Default)]
pub struct StalenessPolicy {
    force: bool,
}

impl StalenessPolicy {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Classify from already known timestamps
    pub fn classify(&self, source_modified: SystemTime, cached: Option<SystemTime>) -> Freshness {
        match cached {
            None => Freshness::Missing,
            Some(_) if self.force => Freshness::Stale,
            Some(cache_modified) if cache_modified < source_modified => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    /// Stat the cache entry at `target` and classify it
    pub fn evaluate(&self, source_modified: SystemTime, target: &Path) -> io::Result<Freshness> {
        let cached = match fs::metadata(target) {
            Ok(metadata) if metadata.is_file() => Some(metadata.modified()?),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            // A file squatting on the size directory; creating it will fail
            Err(_) if target.parent().is_some_and(|dir| !dir.is_dir()) => None,
            Err(e) => return Err(e),
        };

        Ok(self.classify(source_modified, cached))
    }
}
