use std::process::ExitCode;

use clap::Parser;
use pixelsheet_cli::{init_logging, run_with_args, Args};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // `--help` and `--version` are reported through the same path but are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.verbose);

    match run_with_args(&args) {
        Ok(summary) => {
            log::debug!("{summary:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
