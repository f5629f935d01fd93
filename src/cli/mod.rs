//! # CLI Module
//!
//! Command-line interface for the thumbnail cache generator.
//!
//! ## Usage
//! ```bash
//! # Fill the default cache for a directory tree
//! thumbgen generate ~/Pictures
//!
//! # Images mounted at /home/user on this host, seen as /mnt/... elsewhere
//! thumbgen generate /home/user/photos --strip 2 --prefix /mnt/ --no-check
//!
//! # Only normal thumbnails, regenerate everything
//! thumbgen generate ~/Pictures --skip-large --force
//!
//! # Print where a file's thumbnails live
//! thumbgen key ~/Pictures/a.jpg
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use thumbgen::core::cache_key::{cache_path, CacheKey, SizeClass};
use thumbgen::core::location::PathTransform;
use thumbgen::core::pipeline::{default_output_dir, Pipeline, RunReport};
use thumbgen::core::scanner::DEFAULT_EXTENSION_PATTERN;
use thumbgen::error::Result;
use thumbgen::events::{Event, EventChannel, PipelineEvent, ScanEvent, ThumbnailEvent};

/// Exit status when the run finished but some thumbnails failed
const EXIT_PARTIAL_FAILURE: u8 = 3;

/// thumbgen - Fill a freedesktop thumbnail cache
#[derive(Parser, Debug)]
#[command(name = "thumbgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that compute cache locations
#[derive(clap::Args, Debug)]
struct LocationArgs {
    /// Cache root [default: $XDG_CACHE_HOME/thumbnails]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of leading path segments to strip before hashing
    #[arg(short = 'p', long, default_value_t = 0)]
    strip: usize,

    /// Absolute path prepended after stripping
    #[arg(short = 'x', long, default_value = "/")]
    prefix: String,

    /// Do not check that the rewritten path exists
    #[arg(short = 'n', long)]
    no_check: bool,

    /// Only produce normal (128px) thumbnails
    #[arg(short = 'l', long)]
    skip_large: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate thumbnails for every image below the given directories
    Generate {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        location: LocationArgs,

        /// Case-insensitive regex matched at the start of the file extension
        #[arg(short, long, default_value = DEFAULT_EXTENSION_PATTERN)]
        extensions: String,

        /// Regenerate thumbnails even when they are up to date
        #[arg(short, long)]
        force: bool,

        /// Skip hidden files and directories
        #[arg(long)]
        skip_hidden: bool,

        /// Worker threads [default: one per core]
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Output format
        #[arg(long, default_value = "pretty")]
        format: OutputFormat,

        /// Log every processed file
        #[arg(short, long)]
        verbose: bool,

        /// Log hash sources and cache decisions
        #[arg(short, long)]
        debug: bool,
    },

    /// Print the location, key and cache paths of files without writing
    Key {
        /// Files to describe
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        location: LocationArgs,

        /// Output format
        #[arg(long, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            paths,
            location,
            extensions,
            force,
            skip_hidden,
            jobs,
            format,
            verbose,
            debug,
        } => {
            let level = if debug {
                "debug"
            } else if verbose {
                "info"
            } else {
                "warn"
            };
            thumbgen::init_tracing(level);

            let show_progress = matches!(format, OutputFormat::Pretty) && !verbose && !debug;
            run_generate(
                paths,
                location,
                extensions,
                force,
                skip_hidden,
                jobs,
                format,
                show_progress,
            )
        }
        Commands::Key {
            files,
            location,
            format,
        } => {
            thumbgen::init_tracing("warn");
            run_key(files, location, format)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    paths: Vec<PathBuf>,
    location: LocationArgs,
    extensions: String,
    force: bool,
    skip_hidden: bool,
    jobs: Option<usize>,
    format: OutputFormat,
    show_progress: bool,
) -> Result<ExitCode> {
    let term = Term::stderr();
    let output_dir = location.output.unwrap_or_else(default_output_dir);

    let pipeline = Pipeline::builder()
        .paths(paths)
        .output_dir(&output_dir)
        .strip_count(location.strip)
        .prefix(location.prefix)
        .check_source_exists(!location.no_check)
        .skip_large(location.skip_large)
        .extension_pattern(extensions)
        .force(force)
        .include_hidden(!skip_hidden)
        .jobs(jobs)
        .build()?;

    if matches!(format, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("thumbgen").bold().cyan(),
            style(output_dir.display()).dim()
        ))
        .ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if show_progress && term.is_term() {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Thumbnail(ThumbnailEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    pb.set_message(
                        p.current_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let report = result?;

    match format {
        OutputFormat::Pretty => print_pretty_report(&term, &report),
        OutputFormat::Json => print_json(&report),
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL_FAILURE))
    }
}

fn print_pretty_report(term: &Term, report: &RunReport) {
    let marker = if report.is_clean() {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    term.write_line(&format!("{} Done", marker)).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(report.files_scanned).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} thumbnails generated for {} images",
        style(report.generated).cyan(),
        report.files_processed
    ))
    .ok();
    term.write_line(&format!(
        "  {} already up to date",
        style(report.up_to_date).dim()
    ))
    .ok();

    if !report.warnings.is_empty() {
        term.write_line(&format!(
            "  {} path warnings",
            style(report.warnings.len()).yellow()
        ))
        .ok();
    }

    if !report.failures.is_empty() || !report.scan_errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Failures:").bold().underlined()))
            .ok();
        for failure in &report.failures {
            let size = failure
                .size
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            term.write_line(&format!(
                "  {} {}{}: {}",
                style("✗").red(),
                failure.source.display(),
                style(size).dim(),
                failure.message
            ))
            .ok();
        }
        for message in &report.scan_errors {
            term.write_line(&format!("  {} {}", style("✗").red(), message))
                .ok();
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Cache entries a file maps to
#[derive(serde::Serialize)]
struct KeyReport {
    source: PathBuf,
    location: String,
    key: CacheKey,
    warnings: Vec<String>,
    entries: Vec<KeyEntry>,
}

#[derive(serde::Serialize)]
struct KeyEntry {
    size: SizeClass,
    path: PathBuf,
}

fn run_key(files: Vec<PathBuf>, location: LocationArgs, format: OutputFormat) -> Result<ExitCode> {
    let output_dir = location.output.unwrap_or_else(default_output_dir);
    let transform = PathTransform::validated(location.strip, location.prefix, !location.no_check)?;
    let sizes = SizeClass::defaults(location.skip_large);

    let reports: Vec<KeyReport> = files
        .into_iter()
        .map(|source| {
            let canonical = transform.canonicalize(&source);
            let key = CacheKey::derive(&canonical.location);
            KeyReport {
                entries: sizes
                    .iter()
                    .map(|&size| KeyEntry {
                        size,
                        path: cache_path(&output_dir, &key, size),
                    })
                    .collect(),
                warnings: canonical.warnings.iter().map(|w| w.to_string()).collect(),
                location: canonical.location.as_str().to_string(),
                key,
                source,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Pretty => {
            let term = Term::stdout();
            for report in &reports {
                term.write_line(&format!("{}", style(report.source.display()).bold()))
                    .ok();
                term.write_line(&format!("  location: {}", report.location)).ok();
                term.write_line(&format!("  key:      {}", style(report.key.as_str()).cyan()))
                    .ok();
                for entry in &report.entries {
                    term.write_line(&format!(
                        "  {:<9} {}",
                        format!("{}:", entry.size),
                        entry.path.display()
                    ))
                    .ok();
                }
                for warning in &report.warnings {
                    term.write_line(&format!("  {} {}", style("warning:").yellow(), warning))
                        .ok();
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
