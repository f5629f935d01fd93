//! # Cache Key Module
//!
//! Derives thumbnail file names from canonical locations.
//!
//! ## On-disk Layout
//! ```text
//! <cache-root>/normal/<md5(file:///path)>.png     128x128
//! <cache-root>/large/<md5(file:///path)>.png      256x256
//! <cache-root>/x-large/<md5(file:///path)>.png    512x512
//! <cache-root>/xx-large/<md5(file:///path)>.png   1024x1024
//! ```
//!
//! The digest input and directory names are what other thumbnail
//! consumers look up, so neither may change.

use crate::core::location::CanonicalLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File extension of every cache entry
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Lower-case hex MD5 digest of a canonical location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash the location's UTF-8 bytes
    pub fn derive(location: &CanonicalLocation) -> Self {
        Self(format!("{:x}", md5::compute(location.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the entry, e.g. `<key>.png`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, THUMBNAIL_EXTENSION)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Thumbnail size variants with their bounding boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    /// 128x128
    Normal,
    /// 256x256
    Large,
    /// 512x512
    XLarge,
    /// 1024x1024
    XXLarge,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Normal,
        SizeClass::Large,
        SizeClass::XLarge,
        SizeClass::XXLarge,
    ];

    /// Directory name under the cache root
    pub fn name(&self) -> &'static str {
        match self {
            SizeClass::Normal => "normal",
            SizeClass::Large => "large",
            SizeClass::XLarge => "x-large",
            SizeClass::XXLarge => "xx-large",
        }
    }

    /// Bounding box as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        let edge = match self {
            SizeClass::Normal => 128,
            SizeClass::Large => 256,
            SizeClass::XLarge => 512,
            SizeClass::XXLarge => 1024,
        };
        (edge, edge)
    }

    /// Size classes generated by default
    pub fn defaults(skip_large: bool) -> Vec<SizeClass> {
        if skip_large {
            vec![SizeClass::Normal]
        } else {
            vec![SizeClass::Normal, SizeClass::Large]
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path of the cache entry for `key` at `size` under `cache_root`
pub fn cache_path(cache_root: &Path, key: &CacheKey, size: SizeClass) -> PathBuf {
    cache_root.join(size.name()).join(key.file_name())
}
