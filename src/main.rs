use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use covlua::cli::{self, Style};
use covlua::report::ReportOptions;

/// covlua: line coverage for Lua sources from a binary execution-count profile.
#[derive(Parser)]
#[command(name = "covlua", version, about)]
struct Cli {
    /// Binary profile to read.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Source root that profile paths are resolved against.
    #[arg(long, default_value = "./")]
    path: PathBuf,

    /// Only report files with this name (file name without extension).
    #[arg(short = 'f', long)]
    filter: Option<String>,

    /// Print the annotated source listing.
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    showcode: bool,

    /// Print the per-file coverage summary.
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    showtotal: bool,

    /// Reserved; accepted for compatibility and currently ignored.
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_value_t = true, default_missing_value = "true")]
    showfunc: bool,

    /// Output style.
    #[arg(long, value_enum, default_value = "text")]
    format: Style,

    /// Also write an LCOV tracefile to this path.
    #[arg(long)]
    lcov: Option<PathBuf>,

    /// Log decoding details to stderr.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let Some(input) = cli.input else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let options = ReportOptions {
        show_code: cli.showcode,
        show_total: cli.showtotal,
        show_func: cli.showfunc,
    };

    let out = cli::cmd_report(
        &input,
        &cli.path,
        cli.filter.as_deref(),
        options,
        cli.format,
        cli.lcov.as_deref(),
    )?;
    print!("{out}");
    Ok(())
}
