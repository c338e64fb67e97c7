//! Subcommands of the discovery-relayer CLI.

pub mod decode;
pub mod discover;
pub mod execute;
pub mod output;

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use move_core_types::account_address::AccountAddress;
use sui_discovery_relayer::input::parse_address_arg;
use sui_discovery_relayer::{parse_private_key, SuiLedger, DEFAULT_GAS_BUDGET};
use sui_relayer_core::{Relayer, RelayerConfig};
use sui_relayer_types::{DiscoveryInfo, RetryConfig};

pub const DEFAULT_RPC_URL: &str = "https://fullnode.mainnet.sui.io:443";

/// Connection, signing and retry settings shared by networked commands.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Sui JSON-RPC endpoint
    #[arg(long, env = "SUI_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Base64 `flag || key` private key used to sign submissions
    #[arg(long, env = "SUI_RELAYER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Sender for simulations when no private key is given
    #[arg(long, value_parser = parse_address_arg)]
    pub sender: Option<AccountAddress>,

    /// Gas budget in MIST
    #[arg(long, default_value_t = DEFAULT_GAS_BUDGET)]
    pub gas_budget: u64,

    /// Maximum discovery simulations per message
    #[arg(long)]
    pub max_discovery_iterations: Option<usize>,

    /// Confirmation polling attempts after submission
    #[arg(long)]
    pub confirm_attempts: Option<usize>,

    /// Delay between confirmation attempts, in milliseconds
    #[arg(long)]
    pub confirm_delay_ms: Option<u64>,
}

impl LedgerArgs {
    /// Environment defaults (`RELAYER_*`) overridden by explicit flags.
    pub fn relayer_config(&self) -> RelayerConfig {
        let mut config = RelayerConfig::from_env();
        if let Some(iterations) = self.max_discovery_iterations {
            config = config.with_max_discovery_iterations(iterations);
        }
        let attempts = self.confirm_attempts.unwrap_or(config.confirmation.attempts);
        let delay_ms = self
            .confirm_delay_ms
            .unwrap_or(config.confirmation.delay.as_millis() as u64);
        config.with_confirmation(RetryConfig::new(attempts, delay_ms))
    }

    pub async fn connect(&self) -> Result<Relayer> {
        let keypair = self
            .private_key
            .as_deref()
            .map(parse_private_key)
            .transpose()?;
        let ledger =
            SuiLedger::connect(&self.rpc_url, keypair, self.sender, self.gas_budget).await?;
        Ok(Relayer::new(Arc::new(ledger), self.relayer_config()))
    }
}

#[derive(Args, Debug)]
pub struct DiscoveryArgs {
    /// Package that publishes the discovery registry
    #[arg(long, value_parser = parse_address_arg)]
    pub discovery_package: AccountAddress,

    /// Shared registry object
    #[arg(long, value_parser = parse_address_arg)]
    pub discovery_object: AccountAddress,
}

impl DiscoveryArgs {
    pub fn info(&self) -> DiscoveryInfo {
        DiscoveryInfo {
            package_id: self.discovery_package,
            discovery: self.discovery_object,
        }
    }
}
