//! cascade CLI entry point.

use cascade_core::cli::{run, Cli};
use cascade_core::exit_codes::ExitCode;
use cascade_core::logging::init_logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "command failed");
            eprintln!("cascade: {e}");
            ExitCode::from_error(&e)
        }
    };
    std::process::exit(code.as_i32());
}
