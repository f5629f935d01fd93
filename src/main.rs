//! # thumbgen CLI
//!
//! Command-line interface for the thumbnail cache generator.
//!
//! ## Usage
//! ```bash
//! thumbgen generate ~/Pictures
//! thumbgen generate /home/user/photos --strip 2 --prefix /mnt/ --no-check
//! thumbgen key ~/Pictures/a.jpg
//! ```

mod cli;

use std::process::ExitCode;
use thumbgen::Result;

fn main() -> Result<ExitCode> {
    cli::run()
}
