//! Validator Report
//!
//! This module defines the in-memory shape of the report produced by EPUBCheck
//! and the post-processing applied to it before it is handed back to the caller.
//!
//! The structures only model the fields this crate works with. Every other field
//! the validator emits is kept in the `extra` maps, so a report that is parsed,
//! filtered and serialized again keeps the validator's original information.
//!
//! ## Submodules
//!
//! - [filter] - Removes messages and locations according to [FilterOptions]
//! - [sort] - Orders messages by [Severity]
//! - [format] - Plain-text rendering used by the command line tool

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CheckerError;

pub mod filter;
pub mod format;
pub mod sort;

pub use filter::{FilterOptions, Pattern, Patterns, filter_report};
pub use sort::sort_report;

/// Text that marks a location as a placeholder for omitted occurrences
///
/// EPUBCheck caps the number of locations listed for a single message and appends
/// a synthetic location such as "There are 12 additional locations for this message."
/// instead of listing the rest.
pub const ADDITIONAL_LOCATIONS: &str = "additional locations";

/// Diagnostic level assigned by the validator
///
/// The four well-known levels are ranked from the most to the least severe.
/// Any other level reported by the validator is kept verbatim in [Severity::Other]
/// and ranked after all known levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Info,
    Other(String),
}

impl Severity {
    /// Returns the sort rank of the severity, lower is more severe
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Fatal => 0,
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Other(_) => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Other(value) => value.as_str(),
        }
    }

    /// Whether the severity makes a publication invalid
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FATAL" => Severity::Fatal,
            "ERROR" => Severity::Error,
            "WARNING" => Severity::Warning,
            "INFO" => Severity::Info,
            _ => Severity::Other(value),
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        Severity::from(value.to_string())
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position reported by the validator for a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Path of the resource inside the publication
    ///
    /// May also hold the "additional locations" placeholder text,
    /// see [Location::is_additional_locations].
    pub path: String,

    /// Line number, `-1` when the validator does not know it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,

    /// Column number, `-1` when the validator does not know it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Location {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            line: None,
            column: None,
            extra: Map::new(),
        }
    }

    pub fn at(mut self, line: i64, column: i64) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Whether this location only stands for omitted occurrences
    pub fn is_additional_locations(&self) -> bool {
        self.path.contains(ADDITIONAL_LOCATIONS)
    }

    /// Returns `(line, column)` when both are known
    pub fn position(&self) -> Option<(i64, i64)> {
        match (self.line, self.column) {
            (Some(line), Some(column)) if line >= 0 && column >= 0 => Some((line, column)),
            _ => None,
        }
    }
}

/// A single diagnostic reported by the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,

    /// Validator message identifier, such as `RSC-005`
    #[serde(rename = "ID")]
    pub id: String,

    /// Human readable description
    #[serde(rename = "message")]
    pub text: String,

    /// Locations the message applies to, in validator order
    #[serde(default)]
    pub locations: Vec<Location>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(severity: impl Into<Severity>, id: &str, text: &str) -> Self {
        Self {
            severity: severity.into(),
            id: id.to_string(),
            text: text.to_string(),
            locations: vec![],
            extra: Map::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }
}

/// The report of a validator run
///
/// Besides `messages`, the validator writes information about the checker,
/// the publication and its items. Those are kept untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            extra: Map::new(),
        }
    }

    /// Parses a report from the validator's JSON output
    pub fn from_json(data: &str) -> Result<Self, CheckerError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Serializes the report as JSON indented with two spaces
    pub fn to_pretty_json(&self) -> Result<String, CheckerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Removes messages and locations rejected by `options`
    ///
    /// See [filter_report] for the exact rules.
    pub fn filter(&mut self, options: &FilterOptions) -> &mut Self {
        filter_report(self, options);
        self
    }

    /// Stable sort of the messages from the most to the least severe
    pub fn sort_by_severity(&mut self) -> &mut Self {
        sort_report(self);
        self
    }

    /// Whether the report contains at least one fatal error or error
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|msg| msg.severity.is_error())
    }
}
