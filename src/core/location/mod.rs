//! # Location Module
//!
//! Turns an on-disk path into the canonical source location that is hashed
//! into a cache key.
//!
//! ## Path Remapping
//! Thumbnails are often generated on one machine for a tree that another
//! machine mounts elsewhere. Stripping leading segments and prepending a
//! prefix lets the hash match the path the *viewing* host will see:
//!
//! ```text
//! /home/user/photos/a.jpg  --strip 2, prefix /mnt/-->  file:///mnt/photos/a.jpg
//! ```
//!
//! Two different real files can be mapped onto the same logical path this
//! way. That aliasing is not detected.

use crate::error::{ConfigError, PathWarning};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// URI scheme prepended to every canonical location
pub const FILE_SCHEME: &str = "file://";

/// A `file://` location used as the cache key input.
///
/// The hashed form keeps the raw bytes of the path, so names that are not
/// valid UTF-8 still get distinct keys. The text form is lossy for those.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalLocation {
    raw: Vec<u8>,
    text: String,
}

impl CanonicalLocation {
    /// Build a location from an already transformed absolute path
    pub fn from_logical_path(logical_path: &str) -> Self {
        Self::from_logical_bytes(logical_path.as_bytes())
    }

    /// Build a location from the raw bytes of a transformed absolute path
    pub fn from_logical_bytes(logical_path: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(FILE_SCHEME.len() + logical_path.len());
        raw.extend_from_slice(FILE_SCHEME.as_bytes());
        raw.extend_from_slice(logical_path);
        let text = String::from_utf8_lossy(&raw).into_owned();
        Self { raw, text }
    }

    /// Text form, with U+FFFD in place of invalid bytes
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The bytes fed to the digest
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The path part without the scheme
    pub fn logical_path(&self) -> &str {
        self.text.strip_prefix(FILE_SCHEME).unwrap_or(&self.text)
    }
}

impl fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Strip/prefix configuration applied to every discovered path
#[derive(Debug, Clone)]
pub struct PathTransform {
    strip_count: usize,
    prefix: String,
    check_exists: bool,
}

/// Output of [`PathTransform::canonicalize`]
#[derive(Debug, Clone)]
pub struct Canonicalized {
    pub location: CanonicalLocation,
    /// Non-fatal problems found while transforming
    pub warnings: Vec<PathWarning>,
}

impl PathTransform {
    /// Create a transform. The prefix is normalized to end with `/`.
    pub fn new(strip_count: usize, prefix: impl Into<String>, check_exists: bool) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            strip_count,
            prefix,
            check_exists,
        }
    }

    /// Create a transform after checking its prefix with [`check_prefix`]
    pub fn validated(
        strip_count: usize,
        prefix: impl Into<String>,
        check_exists: bool,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        check_prefix(&prefix, check_exists)?;
        Ok(Self::new(strip_count, prefix, check_exists))
    }

    /// The identity transform: no stripping, prefix `/`, no existence check
    pub fn identity() -> Self {
        Self::new(0, "/", false)
    }

    pub fn strip_count(&self) -> usize {
        self.strip_count
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Rewrite `path` into its canonical location
    pub fn canonicalize(&self, path: &Path) -> Canonicalized {
        let mut warnings = Vec::new();
        let absolute = absolutize(path);

        let mut segments: Vec<&OsStr> = absolute
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .collect();

        if segments.iter().any(|segment| segment.to_str().is_none()) {
            warnings.push(PathWarning::NonUtf8 {
                path: absolute.clone(),
            });
        }

        if self.strip_count > segments.len() {
            warnings.push(PathWarning::StripTooDeep {
                path: absolute.clone(),
                strip_count: self.strip_count,
                segments: segments.len(),
            });
            segments.clear();
        } else {
            segments.drain(..self.strip_count);
        }

        let mut logical_path = self.prefix.as_bytes().to_vec();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                logical_path.push(b'/');
            }
            logical_path.extend_from_slice(&os_bytes(segment));
        }

        let location = CanonicalLocation::from_logical_bytes(&logical_path);

        if self.check_exists && !path_from_bytes(&logical_path).is_file() {
            warnings.push(PathWarning::MissingTarget {
                logical_path: location.logical_path().to_string(),
            });
        }

        Canonicalized { location, warnings }
    }
}

/// The prefix must be absolute, and an existing directory when transformed
/// paths are checked
pub fn check_prefix(prefix: &str, check_exists: bool) -> Result<(), ConfigError> {
    if !prefix.starts_with('/') {
        return Err(ConfigError::PrefixNotAbsolute {
            prefix: prefix.to_string(),
        });
    }
    if check_exists && !Path::new(prefix).is_dir() {
        return Err(ConfigError::PrefixMissing {
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

#[cfg(unix)]
fn os_bytes(segment: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(segment.as_bytes())
}

#[cfg(not(unix))]
fn os_bytes(segment: &OsStr) -> Cow<'_, [u8]> {
    Cow::Owned(segment.to_string_lossy().into_owned().into_bytes())
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

impl Default for PathTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Make a path absolute and resolve `.`/`..` lexically, without touching
/// symlinks.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
