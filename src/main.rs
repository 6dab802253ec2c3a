//
//  bitbucket-server-driver
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_server_driver::api::ApiError;
use bitbucket_server_driver::cli::{Cli, Commands};
use bitbucket_server_driver::{exit_codes, DriverError};

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("BBS_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Supports(cmd) => cmd.run(&cli.global).await,
        Commands::Info(cmd) => cmd.run(&cli.global).await,
        Commands::Tags(cmd) => cmd.run(&cli.global).await,
        Commands::Branches(cmd) => cmd.run(&cli.global).await,
        Commands::File(cmd) => cmd.run(&cli.global).await,
        Commands::Date(cmd) => cmd.run(&cli.global).await,
        Commands::Archive(cmd) => cmd.run(&cli.global).await,
    }
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    let Some(error) = error.downcast_ref::<DriverError>() else {
        return exit_codes::ERROR;
    };

    match error {
        DriverError::InvalidUrl { .. }
        | DriverError::UnsupportedOrigin { .. }
        | DriverError::UnsupportedVcsKind { .. } => exit_codes::UNSUPPORTED,
        DriverError::FallbackInitFailed { .. }
        | DriverError::Transport(ApiError::AuthRequired | ApiError::Forbidden(_)) => {
            exit_codes::AUTH_ERROR
        }
        DriverError::Transport(ApiError::NotFound(_)) => exit_codes::NOT_FOUND,
        _ => exit_codes::ERROR,
    }
}
