//! cruddy command-line entry point

use clap::Parser;
use colored::Colorize;
use cruddy_cli::{Cli, run};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    // Initialize logging; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
