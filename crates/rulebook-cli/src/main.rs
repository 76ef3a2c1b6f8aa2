//! `rulebook` command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use rulebook_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::error;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_cycles, run_diff, run_rules, run_validate};
use crate::summary::print_summary;

/// Report has error-severity issues, failures or unknown codes.
const EXIT_FINDINGS: i32 = 1;
/// The command could not run.
const EXIT_FAILURE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    let result = match &cli.command {
        Command::Validate(args) => run_validate(args).map(|outcome| {
            print_summary(&outcome);
            if outcome.has_errors() { EXIT_FINDINGS } else { 0 }
        }),
        Command::Rules(args) => run_rules(args).map(|()| 0),
        Command::Cycles => run_cycles().map(|()| 0),
        Command::Diff(args) => run_diff(args).map(|()| 0),
    };
    let exit_code = result.unwrap_or_else(|err| {
        error!(error = %err, "command failed");
        eprintln!("error: {err:#}");
        EXIT_FAILURE
    });
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
