//! `submoduler_child` command-line entry point.
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use submoduler_child::cli::Cli;
use submoduler_child::commands;
use submoduler_child::logging::{Logger, init_subscriber};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let name = cli.command.name();
    init_subscriber(cli.verbose, name);
    let log = Logger::new(name);

    match commands::dispatch(&cli, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
