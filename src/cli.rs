//! Command handler functions for the covlua CLI.
//!
//! `cmd_report` returns its output as a `String`, making it easy to test
//! without capturing stdout.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::aggregate::Coverage;
use crate::grammar::LuaGrammar;
use crate::lcov;
use crate::report::{self, JsonFormatter, ReportOptions, TextFormatter};

/// Output style for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    Text,
    Json,
}

/// Multi-character flags that also accept the single-dash spelling
/// (`-path ./src`, `-showcode=false`).
const LONG_FLAGS: &[&str] = &[
    "input",
    "path",
    "filter",
    "showcode",
    "showtotal",
    "showfunc",
    "format",
    "lcov",
    "verbose",
];

/// Rewrite single-dash long flags to their double-dash form. Arguments after
/// a bare `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut done = false;
    args.into_iter()
        .map(|arg| {
            if done {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                done = true;
                return arg;
            }
            match s.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{s}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// Decode `input`, resolve its files under `root` and render the report.
/// When `lcov_out` is set, an LCOV tracefile is also written there.
pub fn cmd_report(
    input: &Path,
    root: &Path,
    filter: Option<&str>,
    options: ReportOptions,
    style: Style,
    lcov_out: Option<&Path>,
) -> Result<String> {
    let data = std::fs::read(input)
        .with_context(|| format!("Failed to read profile {}", input.display()))?;
    let coverage = Coverage::from_profile(&data, root)
        .with_context(|| format!("Failed to load profile {}", input.display()))?;

    let report = report::build_report(&coverage, filter, &LuaGrammar);

    if let Some(out) = lcov_out {
        std::fs::write(out, lcov::write_lcov(&report))
            .with_context(|| format!("Failed to write LCOV to {}", out.display()))?;
    }

    let output = match style {
        Style::Text => report.format(&TextFormatter { options }),
        Style::Json => report.format(&JsonFormatter),
    };
    Ok(output)
}
