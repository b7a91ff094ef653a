//! Validator Invoker
//!
//! This module runs EPUBCheck as a subprocess and parses the JSON report it writes.
//!
//! The invoker does not interpret the messages of the report; it only turns the
//! validator's JSON output into a [Report]. The location of the validator is explicit
//! configuration given to [EpubCheck] at construction time.
//!
//! ## Usage
//!
//! ```rust, no_run
//! # fn main() -> Result<(), epubchecker::error::CheckerError> {
//! use std::path::Path;
//!
//! use epubchecker::validator::{EpubCheck, Flags, Validate};
//!
//! let epubcheck = EpubCheck::java_jar("vendors/epubcheck-5.1.0/epubcheck.jar");
//!
//! let mut flags = Flags::new();
//! flags.set("profile", "default");
//!
//! let report = epubcheck.validate(Path::new("book.epub"), &flags)?;
//! println!("{} messages", report.messages.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Notes
//!
//! - The exit status of the validator is not interpreted: EPUBCheck exits with a
//!   non-zero status whenever the publication has errors.
//! - No timeout is applied; a validator that never exits blocks the caller.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info, warn};

use crate::{error::CheckerError, report::Report, utils::TempFile};

/// A source of validation reports
///
/// Implemented by [EpubCheck]. The orchestrator only depends on this trait,
/// so any other way of producing a [Report] for a file can be plugged in.
pub trait Validate {
    /// Validates a packaged EPUB file
    ///
    /// # Parameters
    /// - `epub_file`: Path of the EPUB archive to validate
    /// - `flags`: Extra flags for the validator
    fn validate(&self, epub_file: &Path, flags: &Flags) -> Result<Report, CheckerError>;
}

/// Value of a validator flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Text(String),
    Bool(bool),
}

impl Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Text(value) => f.write_str(value),
            FlagValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Text(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

/// Extra flags passed to the validator as `--name value` pairs
///
/// A flag without value is kept in the map but not passed to the validator.
/// Flags are passed in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags(BTreeMap<String, Option<FlagValue>>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Option<FlagValue>) -> &mut Self {
        self.0.insert(name.to_string(), value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FlagValue>) -> &mut Self {
        self.insert(name, Some(value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name).and_then(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the command line arguments for the flags that have a value
    pub fn to_args(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|value| (name, value)))
            .flat_map(|(name, value)| [format!("--{}", name), value.to_string()])
            .collect()
    }
}

impl FromIterator<(String, Option<FlagValue>)> for Flags {
    fn from_iter<T: IntoIterator<Item = (String, Option<FlagValue>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// EPUBCheck launcher
///
/// Holds the program to run and the arguments placed before the arguments of
/// every check. For the Java distribution of EPUBCheck that is `java -jar <jar>`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpubCheck {
    /// The program to run
    program: PathBuf,

    /// Arguments placed before the report and flag arguments
    leading_args: Vec<OsString>,
}

impl EpubCheck {
    /// Runs the given EPUBCheck jar with the `java` found on the `PATH`
    pub fn java_jar<P: AsRef<Path>>(jar: P) -> Self {
        Self {
            program: PathBuf::from("java"),
            leading_args: vec![OsString::from("-jar"), jar.as_ref().as_os_str().to_owned()],
        }
    }

    /// Runs the jar of an EPUBCheck release unpacked in `vendors_dir`
    ///
    /// Release archives unpack into `epubcheck-<version>/epubcheck.jar`.
    pub fn vendored<P: AsRef<Path>>(vendors_dir: P, version: &str) -> Self {
        Self::java_jar(
            vendors_dir
                .as_ref()
                .join(format!("epubcheck-{}", version))
                .join("epubcheck.jar"),
        )
    }

    /// Runs a native launcher, such as an `epubcheck` wrapper script
    pub fn command<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            leading_args: vec![],
        }
    }

    /// Replaces the program, typically to use a specific Java runtime
    pub fn with_java<P: AsRef<Path>>(mut self, java: P) -> Self {
        self.program = java.as_ref().to_path_buf();
        self
    }

    /// Appends an argument passed before the arguments of every check
    pub fn with_arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the validator and returns its parsed report
    ///
    /// # Return
    /// - `Ok(Report)`: The report written by the validator
    /// - `Err(CheckerError)`: The validator could not be started, wrote no report,
    ///   or wrote a report that cannot be parsed
    pub fn check(&self, epub_file: &Path, flags: &Flags) -> Result<Report, CheckerError> {
        let (report_file, _) = TempFile::create(".json")?;

        let mut command = self.build_command(epub_file, report_file.path(), flags);
        debug!("running {:?}", command);

        let output = command
            .output()
            .map_err(|err| CheckerError::ValidatorLaunch {
                program: self.program.display().to_string(),
                source: err,
            })?;
        info!(
            "validator exited with {} for {}",
            output.status,
            epub_file.display()
        );

        let data = match fs::read_to_string(report_file.path()) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        if data.trim().is_empty() {
            return Err(CheckerError::MissingReport {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = Report::from_json(&data)?;

        if let Err(err) = report_file.close() {
            warn!("{}", err);
        }

        Ok(report)
    }

    fn build_command(&self, epub_file: &Path, report_path: &Path, flags: &Flags) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg("--json")
            .arg(report_path)
            .args(flags.to_args())
            .arg(epub_file);

        command
    }
}

impl Validate for EpubCheck {
    fn validate(&self, epub_file: &Path, flags: &Flags) -> Result<Report, CheckerError> {
        self.check(epub_file, flags)
    }
}
