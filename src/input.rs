//! Reading CLI inputs: message files, addresses and encoded sequences.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use move_core_types::account_address::AccountAddress;
use serde::de::DeserializeOwned;
use sui_relayer_types::encoding::{parse_address, parse_hex_bytes};
use sui_relayer_types::CallSequence;

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parse JSON from {}", path.display()))
}

/// Clap value parser for object ids and package addresses.
pub fn parse_address_arg(s: &str) -> Result<AccountAddress> {
    parse_address(s).ok_or_else(|| anyhow!("invalid address: {}", s))
}

/// Decode a BCS-encoded call sequence given as hex (default) or base64.
pub fn decode_sequence(encoded: &str, base64: bool) -> Result<CallSequence> {
    let bytes = if base64 {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .context("invalid base64")?
    } else {
        parse_hex_bytes(encoded).context("invalid hex")?
    };
    CallSequence::from_bcs(&bytes).context("decode call sequence")
}
