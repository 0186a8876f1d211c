use std::process::ExitCode;

use clap::Parser;
use spritegen::config::setup_logging;
use tracing::error;

fn main() -> ExitCode {
    // a missing .env is fine, real environment variables still apply
    let _ = dotenvy::dotenv();

    let cli = spritegen::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return ExitCode::FAILURE;
    }

    match spritegen::batch::run(&cli) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
