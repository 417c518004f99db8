// psi/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use psi_common::config::{Config, SUPPORT_CONTACT};
use psi_common::error::PsiError;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn init_tracing(verbose: u8, debug_env: bool) {
    let level_filter = match verbose {
        0 if debug_env => LevelFilter::DEBUG,
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("PSI_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args = CliArgs::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(cli_args.verbose, config.debug);
    debug!("Configuration: {:?}", config);

    // `run` owns the temporary directory, so it is gone by the time we exit.
    match cli_args.install.run(&config).await {
        Ok(()) => debug!("Command completed successfully."),
        Err(PsiError::Interrupted) => {
            eprintln!("{}", "Interrupted.".yellow());
            process::exit(130);
        }
        Err(PsiError::BuildFailed(code)) => {
            debug!("Build step exited with status {}", code);
            process::exit(1);
        }
        Err(e) => {
            debug!("Command failed: {:#}", e);
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            if e.is_upstream_change() {
                eprintln!("Please report to {SUPPORT_CONTACT}.");
            }
            process::exit(1);
        }
    }
}
