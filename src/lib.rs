//! # thumbgen
//!
//! Populates a freedesktop-style thumbnail cache for a tree of images.
//!
//! Every source image gets one PNG per enabled size class, stored under a
//! name derived from the MD5 of its `file://` location. The location can be
//! rewritten (leading segments stripped, a new prefix prepended) so that
//! images reached through one mount are cached under the path another host
//! will see them at.
//!
//! ## Architecture
//! - `core` - The thumbnail engine (GUI-agnostic)
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, ThumbgenError};

/// Initialize tracing for the library
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (e.g. `"warn"`,
/// `"info"`) applies. Logs go to stderr so JSON output stays clean.
/// Calling this twice is harmless.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
