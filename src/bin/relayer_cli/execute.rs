//! Execute command - discover, then submit the final sequence

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use move_core_types::account_address::AccountAddress;
use sui_discovery_relayer::input::{parse_address_arg, read_json};
use sui_relayer_types::{GatewayInfo, MessageInfo};

use super::output::format_receipt;
use super::{DiscoveryArgs, LedgerArgs};

#[derive(Parser, Debug)]
pub struct ExecuteCmd {
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Gateway package
    #[arg(long, value_parser = parse_address_arg)]
    pub gateway_package: AccountAddress,

    /// Shared gateway object
    #[arg(long, value_parser = parse_address_arg)]
    pub gateway_object: AccountAddress,

    /// Message JSON file, or `-` for stdin
    #[arg(long)]
    pub message: PathBuf,

    #[command(flatten)]
    pub ledger: LedgerArgs,
}

impl ExecuteCmd {
    pub async fn execute(&self, json_output: bool) -> Result<()> {
        let message: MessageInfo = read_json(&self.message)?;
        let gateway = GatewayInfo {
            package_id: self.gateway_package,
            gateway: self.gateway_object,
        };
        let relayer = self.ledger.connect().await?;
        let receipt = relayer
            .execute(&self.discovery.info(), &gateway, &message)
            .await?;
        println!("{}", format_receipt(&receipt, json_output)?);
        Ok(())
    }
}
