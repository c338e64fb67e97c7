//! Discover command - walk the registry without submitting anything

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sui_discovery_relayer::input::read_json;
use sui_relayer_types::MessageInfo;

use super::output::format_sequence;
use super::{DiscoveryArgs, LedgerArgs};

#[derive(Parser, Debug)]
pub struct DiscoverCmd {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Message JSON file, or `-` for stdin
    #[arg(long)]
    pub message: PathBuf,

    #[command(flatten)]
    pub ledger: LedgerArgs,
}

impl DiscoverCmd {
    pub async fn execute(&self, json_output: bool) -> Result<()> {
        let message: MessageInfo = read_json(&self.message)?;
        let relayer = self.ledger.connect().await?;
        let sequence = relayer.discover(&self.discovery.info(), &message).await?;
        println!("{}", format_sequence(&sequence, json_output)?);
        Ok(())
    }
}
