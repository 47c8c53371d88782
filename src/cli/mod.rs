//! Command-line surface: `multitool serve` and `multitool smoke`.

pub mod serve;
pub mod smoke;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "multitool", version, about = "Caching gateway for Gemini text tasks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP gateway
    Serve {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Listen port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Bind address (overrides config and MULTITOOL_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Post the canned sample requests to a running gateway and print the replies
    Smoke {
        /// Gateway base URL
        #[arg(long, default_value = "http://localhost:5000")]
        base_url: String,
    },
}
