//! FindFunc command-line entry point.

use clap::Parser;
use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufWriter, IsTerminal};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use findfunc::config::{Args, Config};
use findfunc::service::Search;
use findfunc::VERSION;

/// Exit status when stdout is closed early.
const EXIT_BROKEN_PIPE: u8 = 3;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let color = args.color || io::stdout().is_terminal();
    colored::control::set_override(color);

    debug!("findfunc v{}", VERSION);

    let config = match Config::from_args(args, color) {
        Ok(config) => config,
        Err(e) => {
            print_err(e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Inputs: {:?}", config.inputs);

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    match Search::new(&config, out).run() {
        Ok(summary) => {
            debug!("{:?}", summary);
            if summary.errors > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) if e.is_broken_pipe() => {
            print_err("Broken pipe, input/output was interrupted.");
            ExitCode::from(EXIT_BROKEN_PIPE)
        }
        Err(e) => {
            print_err(e);
            ExitCode::FAILURE
        }
    }
}

/// Print a message to stderr in red.
fn print_err(msg: impl Display) {
    eprintln!("{}", msg.to_string().red());
}
