//! discovery-relayer: resolve and execute approved messages on Sui
//!
//! ## Example Usage
//!
//! ```bash
//! # Show the call sequence a destination app publishes for a message
//! discovery-relayer discover \
//!     --discovery-package 0xd1... --discovery-object 0xd2... \
//!     --message message.json --sender 0x5e...
//!
//! # Discover and execute, signing with SUI_RELAYER_PRIVATE_KEY
//! discovery-relayer execute \
//!     --discovery-package 0xd1... --discovery-object 0xd2... \
//!     --gateway-package 0x6a... --gateway-object 0x6b... \
//!     --message message.json
//!
//! # Inspect a raw registry response
//! discovery-relayer decode-sequence 0x0100
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod relayer_cli;

use relayer_cli::{decode::DecodeSequenceCmd, discover::DiscoverCmd, execute::ExecuteCmd, output};

#[derive(Parser)]
#[command(
    name = "discovery-relayer",
    author,
    version,
    about = "Resolve and execute approved cross-chain messages on Sui",
    long_about = "Walks the on-chain discovery registry to find the calls a destination \
                  application expects, then executes them together with the gateway's \
                  approved-message capability in a single transaction."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery and print the resolved call sequence
    Discover(DiscoverCmd),

    /// Run discovery, then submit the final sequence
    Execute(ExecuteCmd),

    /// Decode a BCS-encoded call sequence
    DecodeSequence(DecodeSequenceCmd),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Discover(cmd) => cmd.execute(json).await,
        Commands::Execute(cmd) => cmd.execute(json).await,
        Commands::DecodeSequence(cmd) => cmd.execute(json),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    match run(command, json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", output::format_error(&err, json));
            ExitCode::FAILURE
        }
    }
}
