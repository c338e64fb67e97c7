//! Routing descriptors for one relayed message.

use move_core_types::account_address::AccountAddress;
use serde::{Deserialize, Serialize};

use crate::encoding;

/// An approved cross-chain message awaiting execution on Sui.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub source_chain: String,
    pub message_id: String,
    pub source_address: String,
    /// Channel id the message is addressed to; selects the registry entry.
    #[serde(with = "encoding::address_hex")]
    pub destination_id: AccountAddress,
    #[serde(with = "encoding::hex_bytes32")]
    pub payload_hash: [u8; 32],
    #[serde(with = "encoding::hex_bytes")]
    pub payload: Vec<u8>,
}

/// Discovery registry package and its shared registry object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    #[serde(with = "encoding::address_hex")]
    pub package_id: AccountAddress,
    #[serde(with = "encoding::address_hex")]
    pub discovery: AccountAddress,
}

/// Gateway package and its shared gateway object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    #[serde(with = "encoding::address_hex")]
    pub package_id: AccountAddress,
    #[serde(with = "encoding::address_hex")]
    pub gateway: AccountAddress,
}
