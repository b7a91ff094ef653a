//! Plain-text rendering of a report
//!
//! Produces the console output of the `epubchecker` binary: one block per
//! message followed by a per-severity summary.

use std::{fmt::Display, path::Path};

use crate::report::{Location, Message, Report, Severity};

/// Text printed for a report without messages
pub const NOTHING_TO_REPORT: &str = "Everything is fine";

/// Number of messages per console category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// `FATAL` and `ERROR` messages
    pub errors: usize,
    pub warnings: usize,

    /// `INFO` and any other severity
    pub notices: usize,
}

impl Summary {
    pub fn of(report: &Report) -> Self {
        report
            .messages
            .iter()
            .fold(Summary::default(), |mut summary, msg| {
                match msg.severity {
                    Severity::Fatal | Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    _ => summary.notices += 1,
                }
                summary
            })
    }

    pub fn is_empty(&self) -> bool {
        self.errors == 0 && self.warnings == 0 && self.notices == 0
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chunks = vec![];
        if self.errors > 0 {
            chunks.push(format!("{} errors", self.errors));
        }
        if self.warnings > 0 {
            chunks.push(format!("{} warnings", self.warnings));
        }
        if self.notices > 0 {
            chunks.push(format!("{} notices", self.notices));
        }

        f.write_str(&chunks.join("\n"))
    }
}

/// Renders a single location, resolving its path against `base`
///
/// The "additional locations" placeholder is rendered verbatim.
pub fn render_location(location: &Location, base: &Path) -> String {
    if location.is_additional_locations() {
        return location.path.clone();
    }

    let path = base.join(&location.path);
    match location.position() {
        Some((line, column)) => format!("{}({},{})", path.display(), line, column),
        None => path.display().to_string(),
    }
}

/// Renders a message header and its locations
///
/// Newlines inside the message text are escaped so that every message header
/// stays on a single line.
pub fn render_message(msg: &Message, base: &Path) -> String {
    let mut output = format!(
        "{}: [{}] {}\n",
        msg.severity.as_str().to_lowercase(),
        msg.id,
        msg.text.replace('\n', "\\n")
    );

    if !msg.locations.is_empty() {
        for location in &msg.locations {
            output.push_str(&render_location(location, base));
            output.push('\n');
        }
        output.push('\n');
    }

    output
}

/// Renders the full report, including the summary
pub fn render_report(report: &Report, base: &Path) -> String {
    if report.messages.is_empty() {
        return format!("{NOTHING_TO_REPORT}\n");
    }

    let mut output = String::new();
    for msg in &report.messages {
        output.push_str(&render_message(msg, base));
    }

    let summary = Summary::of(report);
    if !summary.is_empty() {
        output.push_str(&format!("\n{summary}\n"));
    }

    output
}
