//! Epub Checker
//!
//! The entry point of the crate: runs the validator over an EPUB file or an
//! unpacked EPUB directory and returns the post-processed report.
//!
//! ## Pipeline
//!
//! 1. The input path must exist, otherwise [CheckerError::MissingFile] is returned
//!    before anything else happens.
//! 2. A directory is archived into a temporary `.epub` file.
//! 3. The validator runs over the file.
//! 4. The report is filtered, then sorted by severity.
//! 5. The temporary archive is removed, whether the previous steps succeeded or not.
//! 6. When an output path is configured, the report is written there as JSON.
//!
//! ## Usage
//!
//! ```rust, no_run
//! # fn main() -> Result<(), epubchecker::error::CheckerError> {
//! use epubchecker::{
//!     checker::{CheckerOptions, EpubChecker},
//!     report::{FilterOptions, Patterns},
//!     validator::EpubCheck,
//! };
//!
//! let options = CheckerOptions {
//!     filter: FilterOptions {
//!         include_warnings: true,
//!         exclude: Some(Patterns::from_regexes([r"\.css$"])?),
//!         ..Default::default()
//!     },
//!     output: Some("report.json".into()),
//!     ..Default::default()
//! };
//!
//! let checker = EpubChecker::new(EpubCheck::java_jar("epubcheck.jar")).with_options(options);
//! let report = checker.check("path/to/unpacked/book")?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    archive::epub_from_directory,
    error::CheckerError,
    report::{FilterOptions, Report},
    validator::{EpubCheck, Flags, Validate},
};

/// Options of a check
#[derive(Debug, Clone, Default)]
pub struct CheckerOptions {
    /// Filtering applied to the validator report
    pub filter: FilterOptions,

    /// Where to store the final report as JSON
    pub output: Option<PathBuf>,

    /// Extra flags passed to the validator
    pub flags: Flags,
}

/// Runs a validator over EPUB publications
///
/// A checker holds no mutable state; it can be shared between threads to check
/// several publications at once. Every check uses its own temporary files.
#[derive(Debug, Clone)]
pub struct EpubChecker<V = EpubCheck> {
    validator: V,
    options: CheckerOptions,
}

impl<V: Validate> EpubChecker<V> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            options: CheckerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CheckerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Checks an EPUB file or an unpacked EPUB directory
    ///
    /// # Parameters
    /// - `epub_path`: Path of the EPUB file or directory
    ///
    /// # Return
    /// - `Ok(Report)`: The filtered and sorted report
    /// - `Err(CheckerError)`: The input is missing, archiving or validation failed,
    ///   or the report could not be stored
    pub fn check<P: AsRef<Path>>(&self, epub_path: P) -> Result<Report, CheckerError> {
        let epub_path = epub_path.as_ref();
        if !epub_path.exists() {
            return Err(CheckerError::MissingFile {
                path: epub_path.to_path_buf(),
            });
        }

        let archive = if epub_path.is_dir() {
            Some(epub_from_directory(epub_path)?)
        } else {
            None
        };

        let target = archive.as_ref().map_or(epub_path, |archive| archive.path());
        info!("checking {}", epub_path.display());

        let result = self
            .validator
            .validate(target, &self.options.flags)
            .map(|mut report| {
                report.filter(&self.options.filter).sort_by_severity();
                report
            });

        if let Some(archive) = archive {
            if let Err(err) = archive.close() {
                warn!("{}", err);
            }
        }

        let report = result?;
        if let Some(output) = &self.options.output {
            persist_report(&report, output)?;
        }

        Ok(report)
    }
}

/// Writes the report as JSON indented with two spaces
fn persist_report(report: &Report, output: &Path) -> Result<(), CheckerError> {
    let data = report.to_pretty_json()?;

    let write = || {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output, data)
    };

    write().map_err(|err| CheckerError::PersistError {
        path: output.to_path_buf(),
        source: err,
    })?;
    info!("report stored in {}", output.display());

    Ok(())
}
