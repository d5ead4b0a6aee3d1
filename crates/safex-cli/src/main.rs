//! Safex CLI - Command-line utility for secure archive extraction.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use safex_core::CancellationToken;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let operation = cli.command.operation();

    if let Err(err) = logging::init(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        formatter.format_error(operation, &err);
        return ExitCode::from(error::EXIT_UNEXPECTED);
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        formatter.format_warning(&format!("interrupt handler not installed: {err}"));
    }

    let result = match &cli.command {
        cli::Commands::Extract(args) => {
            let show_progress = !cli.quiet && !cli.json && progress::CliProgress::should_show();
            commands::extract::execute(args, &*formatter, &cancel, show_progress)
        }
        cli::Commands::Verify(args) => commands::verify::execute(args, &*formatter, &cancel),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(operation, &err);
            ExitCode::from(error::exit_code(&err, cancel.is_cancelled()))
        }
    }
}
