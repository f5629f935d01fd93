//! # Core Module
//!
//! The UI-agnostic thumbnail engine.
//!
//! ## Modules
//! - `location` - Canonical `file://` location of a source path
//! - `cache_key` - MD5 cache keys, size classes and entry paths
//! - `staleness` - Whether an entry needs regenerating
//! - `codec` - Decode, shrink-to-fit and PNG encode
//! - `writer` - Produces cache entries for one source
//! - `scanner` - Discovers source images in directories
//! - `pipeline` - Orchestrates the full run

pub mod cache_key;
pub mod codec;
pub mod location;
pub mod pipeline;
pub mod scanner;
pub mod staleness;
pub mod writer;

// Re-export commonly used types
pub use cache_key::{cache_path, CacheKey, SizeClass};
pub use location::{CanonicalLocation, PathTransform};
pub use pipeline::{Pipeline, RunReport};
pub use scanner::SourceFile;
pub use staleness::{Freshness, StalenessPolicy};
pub use writer::{ThumbnailWriter, WriteOutcome};
