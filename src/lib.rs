pub mod commands;
pub mod core;

use std::error::Error as _;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::{Cli, Command};

/// Structured logging; `RUST_LOG` wins over the defaults.
pub fn init_logging(quiet: bool) {
    let default_filter = if quiet {
        "warn"
    } else {
        "info,server_installer_lib=debug"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = cli.config.as_deref();
    let outcome = match cli.command {
        Command::Install(args) => commands::install(args, config)
            .await
            .map(|report| print!("{}", commands::describe(&report))),
        Command::Versions(args) => commands::versions(args, config).await.map(|versions| {
            for version in versions {
                println!("{version}");
            }
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
