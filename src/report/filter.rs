//! Report filtering
//!
//! Removes messages the caller is not interested in and narrows the locations
//! of the remaining messages to the files the caller cares about.
//!
//! Patterns are opaque predicates over strings ([Pattern]). Regular expressions
//! from the `regex` crate implement it, and so does any `Fn(&str) -> bool` closure.
//!
//! ## Rules
//!
//! Each message is evaluated in the following order:
//!
//! 1. Warnings are dropped unless `include_warnings` is set.
//! 2. Notices (`INFO`) are dropped unless `include_notices` is set.
//! 3. Messages whose text matches an `ignore` pattern are dropped.
//! 4. Without `exclude` and `include` patterns the message is kept as is.
//! 5. Messages without locations are kept as is.
//! 6. Locations are kept when their path matches an `include` pattern, or when
//!    `exclude` patterns are set and none of them matches the path.
//! 7. A message left with only the "additional locations" placeholder is dropped.
//! 8. A message left without locations is dropped.

use std::{fmt::Debug, sync::Arc};

use regex::Regex;

use crate::{
    error::CheckerError,
    report::{Location, Message, Report, Severity},
};

/// A predicate over strings used to match message texts and location paths
pub trait Pattern: Send + Sync {
    fn is_match(&self, text: &str) -> bool;
}

impl Pattern for Regex {
    fn is_match(&self, text: &str) -> bool {
        Regex::is_match(self, text)
    }
}

impl<F> Pattern for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, text: &str) -> bool {
        (self)(text)
    }
}

/// A list of patterns, matching when any of its patterns matches
#[derive(Clone, Default)]
pub struct Patterns {
    patterns: Vec<Arc<dyn Pattern>>,
}

impl Patterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every source into a regular expression
    ///
    /// # Return
    /// - `Ok(Patterns)`: All sources compiled
    /// - `Err(CheckerError)`: The first source that is not a valid regular expression
    pub fn from_regexes<I, S>(sources: I) -> Result<Self, CheckerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Self::new();
        for source in sources {
            let source = source.as_ref();
            let regex = Regex::new(source).map_err(|err| CheckerError::InvalidPattern {
                pattern: source.to_string(),
                source: err,
            })?;
            patterns.push(regex);
        }

        Ok(patterns)
    }

    pub fn push<P: Pattern + 'static>(&mut self, pattern: P) -> &mut Self {
        self.patterns.push(Arc::new(pattern));
        self
    }

    pub fn with<P: Pattern + 'static>(mut self, pattern: P) -> Self {
        self.push(pattern);
        self
    }

    pub fn any_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Debug for Patterns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patterns")
            .field("len", &self.patterns.len())
            .finish()
    }
}

impl From<Regex> for Patterns {
    fn from(value: Regex) -> Self {
        Self::new().with(value)
    }
}

impl FromIterator<Regex> for Patterns {
    fn from_iter<T: IntoIterator<Item = Regex>>(iter: T) -> Self {
        let mut patterns = Self::new();
        for regex in iter {
            patterns.push(regex);
        }
        patterns
    }
}

/// Options controlling [filter_report]
///
/// A pattern list that is `Some` counts as set even when it is empty:
/// `exclude: Some(Patterns::new())` enables location filtering without
/// excluding any path.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Keep `WARNING` messages
    pub include_warnings: bool,

    /// Keep `INFO` messages
    pub include_notices: bool,

    /// Patterns tested against message texts; matching messages are dropped
    pub ignore: Option<Patterns>,

    /// Patterns tested against location paths; matching locations are dropped
    pub exclude: Option<Patterns>,

    /// Patterns tested against location paths; matching locations are always kept
    pub include: Option<Patterns>,
}

impl FilterOptions {
    /// Options keeping warnings and notices, without any pattern
    pub fn all() -> Self {
        Self {
            include_warnings: true,
            include_notices: true,
            ..Default::default()
        }
    }

    fn filters_locations(&self) -> bool {
        self.exclude.is_some() || self.include.is_some()
    }
}

/// Filters the report in place and returns it
///
/// Retained messages keep their relative order. The function is idempotent:
/// filtering an already filtered report with the same options changes nothing.
pub fn filter_report<'a>(report: &'a mut Report, options: &FilterOptions) -> &'a mut Report {
    report
        .messages
        .retain_mut(|msg| retain_message(msg, options));
    report
}

fn retain_message(msg: &mut Message, options: &FilterOptions) -> bool {
    if !options.include_warnings && msg.severity == Severity::Warning {
        return false;
    }

    if !options.include_notices && msg.severity == Severity::Info {
        return false;
    }

    if options
        .ignore
        .as_ref()
        .is_some_and(|ignore| ignore.any_match(&msg.text))
    {
        return false;
    }

    if !options.filters_locations() || msg.locations.is_empty() {
        return true;
    }

    msg.locations
        .retain(|location| retain_location(location, options));

    // a lone placeholder carries no concrete location
    if msg.locations.len() == 1 && msg.locations[0].is_additional_locations() {
        return false;
    }

    !msg.locations.is_empty()
}

fn retain_location(location: &Location, options: &FilterOptions) -> bool {
    if location.is_additional_locations() {
        return true;
    }

    if options
        .include
        .as_ref()
        .is_some_and(|include| include.any_match(&location.path))
    {
        return true;
    }

    options
        .exclude
        .as_ref()
        .is_some_and(|exclude| !exclude.any_match(&location.path))
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use crate::report::{
        Location, Message, Report, Severity,
        filter::{FilterOptions, Patterns, filter_report},
    };

    fn regexes(sources: &[&str]) -> Option<Patterns> {
        Some(Patterns::from_regexes(sources).unwrap())
    }

    fn severities(report: &Report) -> Vec<Severity> {
        report
            .messages
            .iter()
            .map(|msg| msg.severity.clone())
            .collect()
    }

    fn sample_report() -> Report {
        Report::new(vec![
            Message::new("ERROR", "RSC-005", "Error while parsing file")
                .with_location(Location::new("OEBPS/chapter1.xhtml").at(3, 4))
                .with_location(Location::new("OEBPS/chapter2.xhtml").at(8, 1)),
            Message::new("WARNING", "PKG-010", "Filename contains spaces")
                .with_location(Location::new("OEBPS/my file.xhtml")),
            Message::new("INFO", "HTM-010", "Namespace uri is unusual")
                .with_location(Location::new("OEBPS/nav.xhtml").at(1, 1)),
            Message::new("FATAL", "PKG-008", "Unable to read file"),
            Message::new("ERROR", "OPF-014", "Property remote-resources should be declared")
                .with_location(Location::new("OEBPS/content.opf").at(20, 3))
                .with_location(Location::new(
                    "There are 4 additional locations for this message.",
                )),
        ])
    }

    #[test]
    fn test_drop_warnings_and_notices_by_default() {
        let mut report = sample_report();
        filter_report(&mut report, &FilterOptions::default());

        assert_eq!(
            severities(&report),
            vec![Severity::Error, Severity::Fatal, Severity::Error]
        );
    }

    #[test]
    fn test_only_warnings_and_notices() {
        let mut report = Report::new(vec![
            Message::new("WARNING", "PKG-010", "one"),
            Message::new("INFO", "HTM-010", "two"),
            Message::new("WARNING", "PKG-012", "three"),
        ]);
        filter_report(&mut report, &FilterOptions::default());

        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_keep_warnings_drop_notices() {
        let mut report = sample_report();
        let options = FilterOptions {
            include_warnings: true,
            ..Default::default()
        };
        filter_report(&mut report, &options);

        assert_eq!(
            severities(&report),
            vec![
                Severity::Error,
                Severity::Warning,
                Severity::Fatal,
                Severity::Error
            ]
        );
    }

    #[test]
    fn test_other_severities_are_kept() {
        let mut report = Report::new(vec![Message::new("USAGE", "ACC-001", "usage")]);
        filter_report(&mut report, &FilterOptions::default());

        assert_eq!(report.messages.len(), 1);
    }

    #[test]
    fn test_ignore_by_message_text() {
        let mut report = sample_report();
        let options = FilterOptions {
            ignore: regexes(&["parsing", "^Unable"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        let ids: Vec<&str> = report.messages.iter().map(|msg| msg.id.as_str()).collect();
        assert_eq!(ids, vec!["PKG-010", "HTM-010", "OPF-014"]);
    }

    #[test]
    fn test_ignore_does_not_look_at_paths() {
        let mut report = sample_report();
        let options = FilterOptions {
            ignore: regexes(&["chapter1"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        assert_eq!(report.messages.len(), 5);
    }

    #[test]
    fn test_exclude_locations() {
        let mut report = sample_report();
        let options = FilterOptions {
            exclude: regexes(&[r"chapter1\.xhtml"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        assert_eq!(report.messages.len(), 5);
        assert_eq!(report.messages[0].locations.len(), 1);
        assert_eq!(report.messages[0].locations[0].path, "OEBPS/chapter2.xhtml");
    }

    #[test]
    fn test_exclude_every_location_drops_message() {
        let mut report = sample_report();
        let options = FilterOptions {
            exclude: regexes(&[r"chapter\d\.xhtml", "nav"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        let ids: Vec<&str> = report.messages.iter().map(|msg| msg.id.as_str()).collect();
        assert_eq!(ids, vec!["PKG-010", "PKG-008", "OPF-014"]);
    }

    #[test]
    fn test_lone_additional_locations_drops_message() {
        let mut report = Report::new(vec![
            Message::new("ERROR", "RSC-012", "Fragment identifier is not defined")
                .with_location(Location::new("OEBPS/a.html").at(2, 2))
                .with_location(Location::new("additional locations (3)")),
        ]);
        let options = FilterOptions {
            exclude: Some(Patterns::from(Regex::new(r"a\.html").unwrap())),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_additional_locations_kept_with_real_locations() {
        let mut report = sample_report();
        let options = FilterOptions {
            include: regexes(&["content.opf"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        let ids: Vec<&str> = report.messages.iter().map(|msg| msg.id.as_str()).collect();
        assert_eq!(ids, vec!["PKG-008", "OPF-014"]);
        assert_eq!(report.messages[1].locations.len(), 2);
        assert!(report.messages[1].locations[1].is_additional_locations());
    }

    #[test]
    fn test_include_wins_over_exclude() {
        let mut report = sample_report();
        let options = FilterOptions {
            exclude: regexes(&["OEBPS"]),
            include: regexes(&["chapter2"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        let ids: Vec<&str> = report.messages.iter().map(|msg| msg.id.as_str()).collect();
        assert_eq!(ids, vec!["RSC-005", "PKG-008"]);
        assert_eq!(report.messages[0].locations.len(), 1);
        assert_eq!(report.messages[0].locations[0].path, "OEBPS/chapter2.xhtml");
    }

    #[test]
    fn test_include_only_drops_other_locations() {
        let mut report = sample_report();
        let options = FilterOptions {
            include: regexes(&["nav"]),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        let ids: Vec<&str> = report.messages.iter().map(|msg| msg.id.as_str()).collect();
        assert_eq!(ids, vec!["HTM-010", "PKG-008"]);
    }

    #[test]
    fn test_empty_exclude_still_filters_locations() {
        let mut report = Report::new(vec![
            Message::new("ERROR", "RSC-012", "Fragment identifier is not defined").with_location(
                Location::new("There are 2 additional locations for this message."),
            ),
            Message::new("ERROR", "RSC-005", "Error while parsing file")
                .with_location(Location::new("OEBPS/a.html")),
        ]);
        let options = FilterOptions {
            exclude: Some(Patterns::new()),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].id, "RSC-005");
    }

    #[test]
    fn test_closure_pattern() {
        let mut report = sample_report();
        let options = FilterOptions {
            exclude: Some(Patterns::new().with(|path: &str| path.ends_with("chapter2.xhtml"))),
            ..FilterOptions::all()
        };
        filter_report(&mut report, &options);

        assert_eq!(report.messages[0].locations.len(), 1);
        assert_eq!(report.messages[0].locations[0].path, "OEBPS/chapter1.xhtml");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let options = FilterOptions {
            include_warnings: true,
            ignore: regexes(&["spaces"]),
            exclude: regexes(&["chapter1", "content"]),
            include: regexes(&["nav"]),
            ..Default::default()
        };

        let mut once = sample_report();
        filter_report(&mut once, &options);
        let mut twice = once.clone();
        filter_report(&mut twice, &options);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_regex() {
        let result = Patterns::from_regexes(["valid", "(unclosed"]);

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            crate::error::CheckerError::InvalidPattern {
                pattern: "(unclosed".to_string(),
                source: Regex::new("(").unwrap_err(),
            }
        );
    }
}
