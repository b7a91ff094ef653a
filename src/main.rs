//! epubchecker command line tool.
//!
//! Usage:
//! ```bash
//! epubchecker [OPTIONS] --jar <JAR> <FILE>
//! ```

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use epubchecker::{
    checker::{CheckerOptions, EpubChecker},
    error::CheckerError,
    report::{FilterOptions, Patterns, Report, format::render_report},
    validator::{EpubCheck, Flags},
};
use log::debug;

/// Run EPUBCheck over an EPUB file or an unpacked EPUB directory
#[derive(Parser, Debug)]
#[command(name = "epubchecker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// EPUB file or unpacked EPUB directory
    file: PathBuf,

    /// Store the JSON report at this path
    #[arg(short = 'O', long)]
    output: Option<PathBuf>,

    /// Remove warnings from the report
    #[arg(long)]
    no_warnings: bool,

    /// Remove notices from the report
    #[arg(long)]
    no_notices: bool,

    /// Regex for messages to ignore (can be specified multiple times)
    #[arg(long, value_name = "REGEX")]
    ignore: Vec<String>,

    /// Regex for files to exclude (can be specified multiple times)
    #[arg(long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Regex for files to include (can be specified multiple times)
    #[arg(long, value_name = "REGEX")]
    include: Vec<String>,

    /// Do not print the report
    #[arg(long)]
    silent: bool,

    /// Path to the EPUBCheck jar
    #[arg(long, env = "EPUBCHECK_JAR")]
    jar: PathBuf,

    /// Java runtime used to run the jar
    #[arg(long, env = "EPUBCHECK_JAVA", default_value = "java")]
    java: PathBuf,

    /// Extra EPUBCheck flag as NAME=VALUE (can be specified multiple times)
    #[arg(long = "flag", value_name = "NAME=VALUE", value_parser = parse_flag)]
    flags: Vec<(String, String)>,
}

impl Cli {
    fn checker_options(&self, file: &Path) -> Result<CheckerOptions, CheckerError> {
        let filter = FilterOptions {
            include_warnings: !self.no_warnings,
            include_notices: !self.no_notices,
            ignore: patterns(&self.ignore)?,
            exclude: patterns(&self.exclude)?,
            include: patterns(&self.include)?,
        };

        let mut flags = Flags::new();
        for (name, value) in &self.flags {
            flags.set(name, value.as_str());
        }

        let options = CheckerOptions {
            filter,
            output: self.output.as_deref().map(absolute),
            flags,
        };
        debug!("checking {} with {:?}", file.display(), options);

        Ok(options)
    }
}

/// Compiles the patterns of a repeatable option, `None` when the option was not given
fn patterns(sources: &[String]) -> Result<Option<Patterns>, CheckerError> {
    if sources.is_empty() {
        return Ok(None);
    }

    Patterns::from_regexes(sources).map(Some)
}

fn parse_flag(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got \"{}\"", value)),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn run(cli: &Cli) -> Result<Report, CheckerError> {
    let file = absolute(&cli.file);
    let options = cli.checker_options(&file)?;

    let validator = EpubCheck::java_jar(&cli.jar).with_java(&cli.java);
    EpubChecker::new(validator)
        .with_options(options)
        .check(&file)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let report = match run(&cli) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if !cli.silent && cli.output.is_none() {
        print!("{}", render_report(&report, &absolute(&cli.file)));
    }

    if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Cli, parse_flag};

    #[test]
    fn test_parse_flag() {
        assert_eq!(
            parse_flag("profile=dict"),
            Ok(("profile".to_string(), "dict".to_string()))
        );
        assert_eq!(
            parse_flag("locale=fr=CA"),
            Ok(("locale".to_string(), "fr=CA".to_string()))
        );
        assert!(parse_flag("=value").is_err());
        assert!(parse_flag("novalue").is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "epubchecker",
            "/books/test",
            "--jar",
            "/opt/epubcheck.jar",
            "--no-notices",
            "--exclude",
            r"\.css$",
            "--exclude",
            "nav",
            "--flag",
            "profile=default",
        ])
        .unwrap();

        let options = cli.checker_options(&cli.file).unwrap();
        assert!(options.filter.include_warnings);
        assert!(!options.filter.include_notices);
        assert!(options.filter.ignore.is_none());
        assert_eq!(options.filter.exclude.as_ref().map(|p| p.len()), Some(2));
        assert!(options.filter.include.is_none());
        assert_eq!(options.flags.to_args(), vec!["--profile", "default"]);
        assert!(options.output.is_none());
    }

    #[test]
    fn test_cli_invalid_regex() {
        let cli = Cli::try_parse_from([
            "epubchecker",
            "/books/test",
            "--jar",
            "/opt/epubcheck.jar",
            "--ignore",
            "(",
        ])
        .unwrap();

        assert!(cli.checker_options(&cli.file).is_err());
    }
}
