use clap::Parser;
use std::process::ExitCode;
use tidyext::cli::{Cli, run};
use tidyext::{logging, notify};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            notify::error(&format!("Error: {}", e));
            if e.is_configuration() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
