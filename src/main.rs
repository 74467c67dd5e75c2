use std::process::ExitCode;

use clap::Parser;
use notes_rpc_bridge::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
