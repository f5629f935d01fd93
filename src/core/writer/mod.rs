//! # Writer Module
//!
//! Produces cache entries for one source file.
//!
//! ## Steps per size class
//! 1. Ask the [`StalenessPolicy`]; fresh entries are left alone
//! 2. Create the size directory (racing creators are fine)
//! 3. Decode (at most once per source), shrink, encode
//! 4. Write a temp file next to the target and rename it into place
//!
//! A failed write never leaves a truncated PNG at the target path.

use crate::core::cache_key::{cache_path, CacheKey, SizeClass};
use crate::core::codec::{read_file_bytes, DefaultCodec, ImageCodec, ThumbnailMetadata};
use crate::core::location::CanonicalLocation;
use crate::core::scanner::SourceFile;
use crate::core::staleness::{Freshness, StalenessPolicy};
use crate::error::ThumbnailError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// What happened to one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    /// A new PNG was written
    Generated,
    /// The existing entry was fresh
    UpToDate,
}

/// Result for one size class of one source
#[derive(Debug)]
pub struct SizeResult {
    pub size: SizeClass,
    pub target: PathBuf,
    pub outcome: Result<WriteOutcome, ThumbnailError>,
}

/// Outcome of [`ThumbnailWriter::write_all`]
#[derive(Debug)]
pub enum FileResult {
    /// Every size class was attempted; individual sizes may still have failed
    Sizes(Vec<SizeResult>),
    /// The source could not be read or decoded. Sizes handled before the
    /// first decode (fresh entries) are kept in `completed`.
    SourceFailed {
        error: ThumbnailError,
        completed: Vec<SizeResult>,
    },
}

/// Source image decoded on first use
struct LazySource<'a> {
    source: &'a SourceFile,
    image: Option<DynamicImage>,
    /// Reading or decoding already failed
    failed: bool,
}

impl<'a> LazySource<'a> {
    fn new(source: &'a SourceFile) -> Self {
        Self {
            source,
            image: None,
            failed: false,
        }
    }

    fn get<C: ImageCodec>(&mut self, codec: &C) -> Result<&DynamicImage, ThumbnailError> {
        let image = match self.image.take() {
            Some(image) => image,
            None => match load(self.source, codec) {
                Ok(image) => image,
                Err(e) => {
                    self.failed = true;
                    return Err(e);
                }
            },
        };
        Ok(self.image.insert(image))
    }
}

fn load<C: ImageCodec>(source: &SourceFile, codec: &C) -> Result<DynamicImage, ThumbnailError> {
    let path = &source.path;
    let bytes = read_file_bytes(path).map_err(|e| ThumbnailError::Io {
        path: path.clone(),
        source: e,
    })?;
    codec.decode(&bytes).map_err(|e| ThumbnailError::Codec {
        path: path.clone(),
        source: e,
    })
}

/// Writes cache entries through an [`ImageCodec`]
pub struct ThumbnailWriter<C = DefaultCodec> {
    codec: C,
    policy: StalenessPolicy,
}

impl ThumbnailWriter<DefaultCodec> {
    /// Writer backed by the default codec
    pub fn new(policy: StalenessPolicy) -> Self {
        Self::with_codec(DefaultCodec, policy)
    }
}

impl<C: ImageCodec> ThumbnailWriter<C> {
    pub fn with_codec(codec: C, policy: StalenessPolicy) -> Self {
        Self { codec, policy }
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Produce the entry at `target` for one size class
    pub fn write(
        &self,
        source: &SourceFile,
        target: &Path,
        size: SizeClass,
        location: &CanonicalLocation,
    ) -> Result<WriteOutcome, ThumbnailError> {
        let mut lazy = LazySource::new(source);
        self.write_one(&mut lazy, target, size, location)
    }

    /// Produce entries for every size class, decoding the source once.
    ///
    /// Fresh sizes never trigger a decode, so a fully cached source costs
    /// only the timestamp checks.
    pub fn write_all(
        &self,
        source: &SourceFile,
        location: &CanonicalLocation,
        key: &CacheKey,
        cache_root: &Path,
        sizes: &[SizeClass],
    ) -> FileResult {
        let mut lazy = LazySource::new(source);
        let mut results = Vec::with_capacity(sizes.len());

        for &size in sizes {
            let target = cache_path(cache_root, key, size);
            let outcome = self.write_one(&mut lazy, &target, size, location);

            match outcome {
                // Every later size would fail the same way
                Err(error) if lazy.failed => {
                    return FileResult::SourceFailed {
                        error,
                        completed: results,
                    }
                }
                outcome => results.push(SizeResult {
                    size,
                    target,
                    outcome,
                }),
            }
        }

        FileResult::Sizes(results)
    }

    fn write_one(
        &self,
        lazy: &mut LazySource<'_>,
        target: &Path,
        size: SizeClass,
        location: &CanonicalLocation,
    ) -> Result<WriteOutcome, ThumbnailError> {
        let source = lazy.source;
        let freshness = self
            .policy
            .evaluate(source.modified, target)
            .map_err(|e| ThumbnailError::Io {
                path: target.to_path_buf(),
                source: e,
            })?;

        if freshness == Freshness::Fresh {
            debug!("up to date: {}", target.display());
            return Ok(WriteOutcome::UpToDate);
        }

        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        ensure_directory(parent)?;

        let image = lazy.get(&self.codec)?;
        let (max_width, max_height) = size.dimensions();
        let thumbnail = self
            .codec
            .resize_to_fit(image, max_width, max_height)
            .map_err(|e| ThumbnailError::Codec {
                path: source.path.clone(),
                source: e,
            })?;

        let metadata = ThumbnailMetadata {
            uri: location.as_str().to_string(),
            mtime: source.modified_unix_secs(),
            size: source.size,
            width: image.width(),
            height: image.height(),
        };
        let png = self
            .codec
            .encode_png(&thumbnail, &metadata)
            .map_err(|e| ThumbnailError::Codec {
                path: source.path.clone(),
                source: e,
            })?;

        debug!("creating: {} ({:?})", target.display(), freshness);
        persist_atomically(parent, target, &png).map_err(|e| ThumbnailError::Persist {
            path: target.to_path_buf(),
            source: e,
        })?;

        Ok(WriteOutcome::Generated)
    }
}

/// `create_dir_all`, treating a concurrent creator as success
fn ensure_directory(dir: &Path) -> Result<(), ThumbnailError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(ThumbnailError::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

fn persist_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
