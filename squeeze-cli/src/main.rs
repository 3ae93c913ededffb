// squeeze-cli/src/main.rs
//
// Entry point of the `squeeze` binary: parses arguments, sets up logging,
// dispatches to a command and maps its result to the process exit code.
//
// Exit codes: 0 when the file was accepted, skipped, planned or compared
// equal; 1 on rejection, a failed comparison, or any error.

use clap::Parser;
use squeeze_cli::{Cli, Commands, logging, output, run_compare, run_convert, run_plan};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Convert(args) => run_convert(args, config_path, cli.json),
        Commands::Plan(args) => run_plan(args, config_path, cli.json),
        Commands::Compare(args) => run_compare(args, config_path, cli.json),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
