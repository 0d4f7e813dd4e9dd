//! CLI definitions for unravel.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// unravel CLI.
#[derive(Parser)]
#[command(name = "unravel")]
#[command(about = "JavaScript deobfuscation engine and MCP tool server")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "unravel.toml", global = true, env = "UNRAVEL_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Deobfuscate a JavaScript file and print the result
    Deobfuscate {
        /// File to read ("-" for stdin)
        file: PathBuf,

        /// Print the full JSON response instead of the code
        #[arg(long)]
        json: bool,

        /// Only report detected techniques
        #[arg(long)]
        detect_only: bool,

        /// Skip the AST optimizer
        #[arg(long)]
        no_optimize: bool,

        /// Attempt to lift VM-protected code
        #[arg(long)]
        aggressive_vm: bool,

        /// Time budget in milliseconds (defaults to engine.timeout_ms)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Report obfuscation techniques used by a JavaScript file
    Detect {
        /// File to read ("-" for stdin)
        file: PathBuf,

        /// Print the full JSON report
        #[arg(long)]
        json: bool,
    },
}
