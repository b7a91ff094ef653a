//! Epub checker
//!
//! A Rust library running [EPUBCheck](https://www.w3.org/publishing/epubcheck/)
//! over EPUB files or unpacked EPUB directories, and post-processing its report.
//!
//! The validation itself is done by EPUBCheck, run as a subprocess. This library
//! takes care of everything around it: packaging unpacked publications, invoking
//! the validator, filtering and sorting the diagnostics, and storing the result.
//!
//! ## Features
//!
//! - Check packaged `.epub` files and unpacked EPUB directories alike.
//! - Drop warnings, notices, or messages matching caller supplied patterns.
//! - Narrow message locations to the files you care about.
//! - Sort diagnostics from the most to the least severe.
//! - Store the final report as JSON.
//!
//! ## Quick Start
//!
//! ```rust, no_run
//! # use epubchecker::{checker::EpubChecker, validator::EpubCheck};
//! # fn main() -> Result<(), epubchecker::error::CheckerError> {
//! let checker = EpubChecker::new(EpubCheck::java_jar("path/to/epubcheck.jar"));
//!
//! let report = checker.check("path/to/book.epub")?;
//! for msg in &report.messages {
//!     println!("{}: [{}] {}", msg.severity, msg.id, msg.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `cli` (default): Builds the `epubchecker` command line tool.

pub(crate) mod utils;

pub mod archive;
pub mod checker;
pub mod error;
pub mod report;
pub mod validator;

pub use utils::TempFile;
