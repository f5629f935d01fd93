//! Pipeline execution implementation.

use super::report::{PathWarningRecord, RunReport, ThumbnailFailure};
use crate::core::cache_key::{CacheKey, SizeClass};
use crate::core::location::{check_prefix, PathTransform};
use crate::core::scanner::{ScanConfig, SourceFile, SourceScanner, WalkDirScanner};
use crate::core::staleness::StalenessPolicy;
use crate::core::writer::{FileResult, SizeResult, ThumbnailWriter, WriteOutcome};
use crate::error::{ConfigError, ThumbgenError, ThumbnailError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
    ThumbnailEvent, ThumbnailProgress,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Configuration for the pipeline.
///
/// Fixed at build time; every component receives what it needs from here.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories to scan
    pub paths: Vec<PathBuf>,
    /// Cache root (`normal/`, `large/` live below it)
    pub output_dir: PathBuf,
    /// Leading path segments removed before hashing
    pub strip_count: usize,
    /// Absolute path prepended after stripping
    pub prefix: String,
    /// Size classes to produce, in order
    pub sizes: Vec<SizeClass>,
    /// Warn when the transformed path does not exist
    pub check_source_exists: bool,
    /// Regenerate even fresh entries
    pub force: bool,
    /// Worker threads (None = rayon's global pool, 1 = sequential)
    pub jobs: Option<usize>,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            output_dir: default_output_dir(),
            strip_count: 0,
            prefix: "/".to_string(),
            sizes: SizeClass::defaults(false),
            check_source_exists: true,
            force: false,
            jobs: None,
            scan_config: ScanConfig::default(),
        }
    }
}

/// `$XDG_CACHE_HOME/thumbnails`, or `~/.thumbnails` without a cache dir
pub fn default_output_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("thumbnails"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".thumbnails")))
        .unwrap_or_else(|| PathBuf::from(".thumbnails"))
}

impl PipelineConfig {
    /// Reject configurations that must not start a run
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_prefix(&self.prefix, self.check_source_exists)?;
        if !self.output_dir.is_dir() {
            return Err(ConfigError::OutputDirMissing {
                path: self.output_dir.clone(),
            });
        }
        if self.scan_config.extension_pattern.trim().is_empty() {
            return Err(ConfigError::EmptyExtensionPattern);
        }
        if self.sizes.is_empty() {
            return Err(ConfigError::NoSizeClasses);
        }
        Ok(())
    }

    fn path_transform(&self) -> PathTransform {
        PathTransform::new(self.strip_count, self.prefix.clone(), self.check_source_exists)
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Directories to scan
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn strip_count(mut self, count: usize) -> Self {
        self.config.strip_count = count;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn extension_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.scan_config.extension_pattern = pattern.into();
        self
    }

    /// Only produce `normal` thumbnails
    pub fn skip_large(mut self, skip: bool) -> Self {
        self.config.sizes = SizeClass::defaults(skip);
        self
    }

    /// Explicit size classes, replacing the defaults
    pub fn sizes(mut self, sizes: Vec<SizeClass>) -> Self {
        self.config.sizes = sizes;
        self
    }

    pub fn check_source_exists(mut self, check: bool) -> Self {
        self.config.check_source_exists = check;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.config.force = force;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Validate and build the pipeline
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        self.config.validate()?;

        let scanner = WalkDirScanner::new(self.config.scan_config.clone())?;

        let pool = match self.config.jobs {
            Some(jobs) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs.max(1))
                    .build()
                    .map_err(|e| ConfigError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Pipeline {
            transform: self.config.path_transform(),
            writer: ThumbnailWriter::new(StalenessPolicy::new(self.config.force)),
            config: self.config,
            scanner,
            pool,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one source file, before merging into the report
#[derive(Default)]
struct FileOutcome {
    generated: usize,
    up_to_date: usize,
    failures: Vec<ThumbnailFailure>,
    warnings: Vec<PathWarningRecord>,
}

/// The thumbnail generation pipeline
pub struct Pipeline {
    config: PipelineConfig,
    scanner: WalkDirScanner,
    transform: PathTransform,
    writer: ThumbnailWriter,
    pool: Option<rayon::ThreadPool>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<RunReport, ThumbgenError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunReport, ThumbgenError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: enumerate
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_result = self.scanner.scan_with_events(&self.config.paths, events)?;
        let mut report = RunReport {
            files_scanned: scan_result.files.len(),
            scan_errors: scan_result.errors.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        };
        for message in &report.scan_errors {
            warn!("{}", message);
        }

        // Phase 2: transform and write
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Generating,
        }));
        events.send(Event::Thumbnail(ThumbnailEvent::Started {
            total_files: scan_result.files.len(),
        }));

        let outcomes = self.process_files(&scan_result.files, events);

        for outcome in outcomes {
            if outcome.generated > 0 {
                report.files_processed += 1;
            }
            report.generated += outcome.generated;
            report.up_to_date += outcome.up_to_date;
            report.failures.extend(outcome.failures);
            report.warnings.extend(outcome.warnings);
        }

        if report.cache_root_unwritable() {
            error!(
                "no thumbnail could be written: cache directories under {} cannot be created",
                self.config.output_dir.display()
            );
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Thumbnail(ThumbnailEvent::Completed {
            generated: report.generated,
            up_to_date: report.up_to_date,
            failed: report.failures.len(),
        }));
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                files_scanned: report.files_scanned,
                generated: report.generated,
                up_to_date: report.up_to_date,
                failed: report.failures.len(),
                duration_ms: report.duration_ms,
            },
        }));

        Ok(report)
    }

    /// Process files across the worker pool; sizes of one file stay on
    /// one worker.
    fn process_files(&self, files: &[SourceFile], events: &EventSender) -> Vec<FileOutcome> {
        let completed = AtomicUsize::new(0);
        let total = files.len();

        let work = || {
            files
                .par_iter()
                .map(|file| {
                    let outcome = self.process_file(file, events);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    events.send(Event::Thumbnail(ThumbnailEvent::Progress(ThumbnailProgress {
                        completed: done,
                        total,
                        current_path: file.path.clone(),
                    })));
                    outcome
                })
                .collect::<Vec<_>>()
        };

        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    fn process_file(&self, file: &SourceFile, events: &EventSender) -> FileOutcome {
        let mut outcome = FileOutcome::default();
        info!("{}", file.path.display());

        let canonical = self.transform.canonicalize(&file.path);
        for warning in canonical.warnings {
            let message = warning.to_string();
            warn!("{}", message);
            events.send(Event::Thumbnail(ThumbnailEvent::Warning {
                source: file.path.clone(),
                message: message.clone(),
            }));
            outcome.warnings.push(PathWarningRecord {
                source: file.path.clone(),
                message,
            });
        }

        debug!("hash source: {}", canonical.location);
        let key = CacheKey::derive(&canonical.location);

        let result = self.writer.write_all(
            file,
            &canonical.location,
            &key,
            &self.config.output_dir,
            &self.config.sizes,
        );

        match result {
            FileResult::SourceFailed { error, completed } => {
                record_sizes(&mut outcome, events, file, completed);
                record_failure(&mut outcome, events, file, None, error);
            }
            FileResult::Sizes(sizes) => record_sizes(&mut outcome, events, file, sizes),
        }

        outcome
    }
}

fn record_sizes(
    outcome: &mut FileOutcome,
    events: &EventSender,
    file: &SourceFile,
    sizes: Vec<SizeResult>,
) {
    for size_result in sizes {
        match size_result.outcome {
            Ok(WriteOutcome::Generated) => {
                outcome.generated += 1;
                events.send(Event::Thumbnail(ThumbnailEvent::Generated {
                    source: file.path.clone(),
                    target: size_result.target,
                }));
            }
            Ok(WriteOutcome::UpToDate) => {
                outcome.up_to_date += 1;
                events.send(Event::Thumbnail(ThumbnailEvent::UpToDate {
                    target: size_result.target,
                }));
            }
            Err(e) => record_failure(outcome, events, file, Some(size_result.size), e),
        }
    }
}

fn record_failure(
    outcome: &mut FileOutcome,
    events: &EventSender,
    file: &SourceFile,
    size: Option<SizeClass>,
    error: ThumbnailError,
) {
    let message = error.to_string();
    warn!("{}", message);
    events.send(Event::Thumbnail(ThumbnailEvent::Error {
        source: file.path.clone(),
        size,
        message: message.clone(),
    }));
    outcome.failures.push(ThumbnailFailure {
        source: file.path.clone(),
        size,
        message,
        directory_failure: error.is_directory_failure(),
    });
}
