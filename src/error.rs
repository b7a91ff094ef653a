//! Error Type Definition Module
//!
//! This module defines the errors that may be encountered while packaging,
//! validating and post-processing an EPUB publication. All errors are uniformly
//! wrapped in the `CheckerError` enumeration for convenient error handling by
//! the caller.
//!
//! ## Error Groups
//!
//! - Input errors: [CheckerError::MissingFile]
//! - Archive errors: [CheckerError::ArchiveError], [CheckerError::WalkDirError],
//!   [CheckerError::IOError]
//! - Validator errors: [CheckerError::ValidatorLaunch], [CheckerError::MissingReport],
//!   [CheckerError::ReportParse]
//! - Output errors: [CheckerError::PersistError]
//! - Option errors: [CheckerError::InvalidPattern]

use std::path::PathBuf;

use thiserror::Error;

/// Types of errors that can occur while checking an EPUB publication
#[derive(Debug, Error)]
pub enum CheckerError {
    /// ZIP archive related errors
    ///
    /// Errors occur while writing the temporary archive of an unpacked
    /// EPUB directory.
    #[error("Archive error: {source}")]
    ArchiveError { source: zip::result::ZipError },

    /// Invalid filter pattern error
    ///
    /// This error occurs when a textual pattern cannot be compiled into a regular expression.
    #[error("Invalid pattern: \"{pattern}\" is not a valid regular expression ({source}).")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("IO error: {source}")]
    IOError { source: std::io::Error },

    /// Missing input error
    ///
    /// The EPUB file or directory to check does not exist. This error is
    /// reported before any archive is made or any process is launched.
    #[error("missing file: \"{}\"", .path.display())]
    MissingFile { path: PathBuf },

    /// Missing report error
    ///
    /// The validator exited without leaving a report at the requested location.
    /// This usually means the validator itself crashed or refused its arguments.
    #[error(
        "Missing report: The validator exited with status {} without writing a report. {stderr}",
        .status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
    )]
    MissingReport { status: Option<i32>, stderr: String },

    /// Persist error
    ///
    /// The final report could not be written to the configured output path.
    #[error("Persist error: Unable to write report to \"{}\": {source}", .path.display())]
    PersistError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Report parsing error
    ///
    /// The validator wrote a report that is not valid JSON or does not
    /// have the expected shape.
    #[error("Report parse error: {source}")]
    ReportParse { source: serde_json::Error },

    /// Validator launch error
    ///
    /// The validator process could not be started, for example because
    /// the Java runtime is not installed.
    #[error("Validator launch error: Unable to run \"{program}\": {source}")]
    ValidatorLaunch {
        program: String,
        source: std::io::Error,
    },

    /// WalkDir error
    ///
    /// This error occurs when using the WalkDir library to traverse the directory.
    #[error("WalkDir error: {source}")]
    WalkDirError { source: walkdir::Error },
}

impl From<zip::result::ZipError> for CheckerError {
    fn from(value: zip::result::ZipError) -> Self {
        CheckerError::ArchiveError { source: value }
    }
}

impl From<std::io::Error> for CheckerError {
    fn from(value: std::io::Error) -> Self {
        CheckerError::IOError { source: value }
    }
}

impl From<serde_json::Error> for CheckerError {
    fn from(value: serde_json::Error) -> Self {
        CheckerError::ReportParse { source: value }
    }
}

impl From<walkdir::Error> for CheckerError {
    fn from(value: walkdir::Error) -> Self {
        CheckerError::WalkDirError { source: value }
    }
}

#[cfg(test)]
impl PartialEq for CheckerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingFile { path: l_path }, Self::MissingFile { path: r_path }) => {
                l_path == r_path
            }
            (
                Self::InvalidPattern {
                    pattern: l_pattern, ..
                },
                Self::InvalidPattern {
                    pattern: r_pattern, ..
                },
            ) => l_pattern == r_pattern,
            (
                Self::MissingReport {
                    status: l_status, ..
                },
                Self::MissingReport {
                    status: r_status, ..
                },
            ) => l_status == r_status,
            (Self::PersistError { path: l_path, .. }, Self::PersistError { path: r_path, .. }) => {
                l_path == r_path
            }
            (
                Self::ValidatorLaunch {
                    program: l_program, ..
                },
                Self::ValidatorLaunch {
                    program: r_program, ..
                },
            ) => l_program == r_program,

            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}
