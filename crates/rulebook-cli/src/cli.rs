//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rulebook",
    version,
    about = "Validate tabular returns against a cycle's rule set",
    long_about = "Validate a directory of CSV tables against the rules published for a \
                  reporting cycle.\n\n\
                  Every rule runs in isolation: a rule that errors or panics is reported \
                  as an execution failure and the remaining rules still run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a cycle's rules against a directory of CSV tables.
    Validate(ValidateArgs),

    /// List the rules of a cycle.
    Rules(RulesArgs),

    /// List published cycles.
    Cycles,

    /// Show which rule codes changed between two cycles.
    Diff(DiffArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Directory of CSV files; each file is one table named by its file stem.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Reporting cycle whose rules apply.
    #[arg(long = "cycle", value_name = "ID")]
    pub cycle: String,

    /// Run only these rule codes (repeatable). Runs every rule when omitted.
    #[arg(long = "rule", value_name = "CODE")]
    pub rules: Vec<String>,

    /// Output directory for report files (default: <DATA_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report files to write.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Worker threads; 0 uses every available core.
    #[arg(long = "jobs", short = 'j', default_value_t = 1)]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Cycle to list (default: latest published).
    #[arg(long = "cycle", value_name = "ID")]
    pub cycle: Option<String>,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Older cycle.
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Newer cycle.
    #[arg(value_name = "TO")]
    pub to: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
    Both,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
