//! filetally - Tally files by type across a directory tree.
//!
//! Usage:
//!   ftally [OPTIONS] <DIRECTORY>       Print a per-type table
//!   ftally -o out.csv <DIRECTORY>      Also export the table as CSV
//!   ftally -f json <DIRECTORY>         Print the snapshot as JSON
//!   ftally --help                      Show help

use std::io::{self, IsTerminal};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use crossterm::style::{Stylize, style};
use tracing_subscriber::EnvFilter;

use filetally_core::{AnalysisConfig, SizeThreshold, parse_size};
use filetally_report::{ConsoleReporter, CsvReport};
use filetally_scan::TypeScanner;

#[derive(Parser)]
#[command(
    name = "filetally",
    version,
    about = "Count files and total sizes per file type",
    long_about = "filetally walks a directory tree and reports how many files of each \
                  type it contains and how much space they take, largest first.",
    after_help = "Example:\n  ftally -a -e node_modules -t .cpp -t .h -s 1K -S 1M -o results.csv /path/to/dir"
)]
struct Cli {
    /// Directory to analyze
    directory: PathBuf,

    /// Include hidden files in the per-type statistics
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Directory to exclude (can be used multiple times)
    #[arg(short, long, value_name = "DIR")]
    exclude: Vec<PathBuf>,

    /// Export results to a CSV file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// File type to include, e.g. ".rs" (can be used multiple times)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Skip entries whose name matches a glob (can be used multiple times)
    #[arg(short, long, value_name = "GLOB")]
    ignore: Vec<String>,

    /// Minimum file size (e.g., 10K, 1M, 1.5G)
    #[arg(short = 's', long, value_name = "SIZE", value_parser = parse_size_arg)]
    min_size: Option<u64>,

    /// Maximum file size (e.g., 100M, 2G)
    #[arg(short = 'S', long, value_name = "SIZE", value_parser = parse_size_arg)]
    max_size: Option<u64>,

    /// Number of worker threads (defaults to available parallelism)
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<NonZeroUsize>,

    /// Do not follow symbolic links
    #[arg(short = 'P', long)]
    no_follow: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Add a human-readable size column to the CSV export
    #[arg(long)]
    csv_human: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log traversal details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn parse_size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let _ = color_eyre::install();
    let color = !cli.no_color && io::stdout().is_terminal();
    setup_logging(cli.verbose, !cli.no_color && io::stderr().is_terminal());

    match run(&cli, color) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("Error: {err:#}");
            if color {
                eprintln!("{}", style(&message).red());
            } else {
                eprintln!("{message}");
            }
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli, color: bool) -> Result<()> {
    let threshold = SizeThreshold::from_bounds(cli.min_size, cli.max_size)?;

    // The export must not count itself when it lands inside the tree.
    let mut exclude = cli.exclude.clone();
    exclude.extend(cli.output.iter().cloned());

    let config = AnalysisConfig::builder()
        .root(cli.directory.clone())
        .show_hidden(cli.all)
        .exclude_dirs(exclude)
        .include_types(cli.types.clone())
        .ignore_patterns(cli.ignore.clone())
        .size_threshold(threshold)
        .threads(cli.threads.map_or(0, NonZeroUsize::get))
        .follow_symlinks(!cli.no_follow)
        .build()
        .context("Invalid configuration")?;

    let mut scanner = TypeScanner::new(config).context("Invalid configuration")?;

    if let Some(path) = &cli.output {
        CsvReport::check_target(path)?;
    }

    let banner = format!("Analyzing directory: {}", cli.directory.display());
    if color {
        eprintln!("{}", style(&banner).blue());
    } else {
        eprintln!("{banner}");
    }

    let snapshot = scanner.analyze().context("Analysis failed")?;

    match cli.format {
        OutputFormat::Text => {
            let stdout = io::stdout();
            ConsoleReporter::new(color).render(&snapshot, &mut stdout.lock())?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    if let Some(path) = &cli.output {
        let mut report = CsvReport::create(path, cli.csv_human)?;
        report
            .write_snapshot(&snapshot)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        let done = format!("\nResults exported to {}", path.display());
        if color {
            println!("{}", style(&done).green());
        } else {
            println!("{done}");
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, ansi: bool) {
    let default = if verbose {
        "filetally=debug,filetally_core=debug,filetally_scan=debug,filetally_report=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .init();
}
