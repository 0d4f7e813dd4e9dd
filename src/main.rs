//! unravel - JavaScript deobfuscation engine and MCP tool server.
//!
//! Main entry point for the unravel CLI and stdio server.

mod cli;
mod commands;
mod server;

use clap::Parser;
use tracing::{error, warn};

use unravel_config::ConfigValidator;

use crate::cli::{Cli, Commands};
use crate::commands::{run_deobfuscate, run_detect, DeobfuscateArgs};
use crate::server::{build_engine, init_tracing, load_config, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(&config.logging)?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!(path = %err.path, "{}", err.message);
        }
        return Err(format!("Invalid configuration: {}", cli.config.display()).into());
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Deobfuscate {
            file,
            json,
            detect_only,
            no_optimize,
            aggressive_vm,
            timeout_ms,
        } => {
            let engine = build_engine(&config);
            let args = DeobfuscateArgs {
                json,
                detect_only,
                no_optimize,
                aggressive_vm,
                timeout_ms,
            };
            run_deobfuscate(&engine, &file, args).await
        }
        Commands::Detect { file, json } => run_detect(&build_engine(&config), &file, json).await,
    }
}
