use std::process::ExitCode;

use clap::Parser;
use misalud_lib::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    misalud_lib::init_tracing();
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
