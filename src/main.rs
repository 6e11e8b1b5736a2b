// File: src/main.rs
// Multi-interface ledger explorer: drill down from the chain to blocks to transactions

use std::{fs::File, path::PathBuf, time::Duration};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cli_interface;
mod data_models;
mod decoder;
mod error;
mod ledger_gateway;
mod navigator;
mod tui_dashboard;
mod view_model;
mod web_server;

use crate::data_models::{AppConfig, DEFAULT_NODE_URL};

/// Command-line interface definition for the Ledger Explorer
#[derive(Parser)]
#[command(name = "ledger-explorer")]
#[command(about = "Drill-down ledger explorer with CLI, TUI and Web interfaces")]
#[command(version)]
pub struct Cli {
    /// Base URL of the ledger query service
    #[arg(short, long, env = "LEDGER_NODE_URL", default_value = DEFAULT_NODE_URL)]
    pub node: String,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "LEDGER_TIMEOUT_MS", default_value = "10000")]
    pub timeout_ms: u64,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Interface mode selection
    #[command(subcommand)]
    pub mode: InterfaceMode,
}

/// Available interface modes
#[derive(Subcommand)]
pub enum InterfaceMode {
    /// Print the chain, a block or a transaction and exit
    Cli {
        /// Show the block with this hash
        #[arg(short, long)]
        block: Option<String>,

        /// Show the transaction with this hash
        #[arg(short, long)]
        transaction: Option<String>,
    },

    /// Interactive terminal explorer (ratatui)
    Tui,

    /// Web server with browser explorer (axum + WebSocket)
    Web {
        /// Server port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,

        /// Enable CORS for development
        #[arg(short, long)]
        cors: bool,
    },
}

/// Set up env_logger. The TUI owns the terminal, so it only logs to a file
/// or when RUST_LOG asks for it explicitly.
fn init_logging(mode: &InterfaceMode, log_file: Option<&PathBuf>) -> Result<()> {
    let default_filter = match (mode, log_file) {
        (InterfaceMode::Tui, None) => "off",
        _ => "info",
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Main application entry point
/// Routes to appropriate interface mode based on CLI arguments
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.mode, cli.log_file.as_ref())?;

    if !cli.node.starts_with("http://") && !cli.node.starts_with("https://") {
        anyhow::bail!("Ledger node URL must start with http:// or https://: {}", cli.node);
    }

    let config = AppConfig {
        node_url: cli.node,
        request_timeout: Duration::from_millis(cli.timeout_ms),
    };
    log::info!("Using ledger service at {}", config.node_url);

    match cli.mode {
        InterfaceMode::Cli { block, transaction } => {
            println!("🔍 Ledger Explorer - CLI Mode");
            cli_interface::run_cli_mode(&config, block, transaction).await
        },

        InterfaceMode::Tui => {
            tui_dashboard::run_tui_mode(&config).await
        },

        InterfaceMode::Web { port, bind, cors } => {
            println!("🌐 Ledger Explorer - Web Server Mode");
            web_server::run_web_mode(&config, &bind, port, cors).await
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_modes_and_defaults() {
        let cli = Cli::try_parse_from(["ledger-explorer", "cli", "--block", "h1"]).unwrap();
        assert!(matches!(cli.mode, InterfaceMode::Cli { block: Some(ref b), transaction: None } if b == "h1"));

        let cli = Cli::try_parse_from(["ledger-explorer", "--node", "http://node:5000", "web", "--cors"]).unwrap();
        assert_eq!(cli.node, "http://node:5000");
        assert!(matches!(cli.mode, InterfaceMode::Web { port: 8080, cors: true, .. }));
    }
}
