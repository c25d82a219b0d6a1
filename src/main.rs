//! Circuit prioritizer entry point: CLI wiring and run reporting.

use std::process::ExitCode;

use tracing::error;

use circuit_prioritizer::cli::{self, Command};
use circuit_prioritizer::{logging, runner};

fn main() -> ExitCode {
    let opts = match cli::parse_args_from(std::env::args().skip(1)) {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            cli::print_usage();
            return ExitCode::from(2);
        }
    };

    let cfg = match opts.resolve() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&cfg.logging.filter);

    match runner::run(&cfg) {
        Ok(report) => {
            println!("{}", report.summary);
            eprintln!(
                "Results written to {} and {}",
                report.annual_path.display(),
                report.hourly_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
