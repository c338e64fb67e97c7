//! Discovery-driven message relayer for Sui
//!
//! Resolves the call sequence a destination application publishes in the
//! on-chain discovery registry, then executes it in one programmable
//! transaction together with the gateway's approved-message capability.
//!
//! - [`sui_ledger`]: [`sui_relayer_core::LedgerClient`] backed by a Sui full node
//! - [`input`]: reading message files and CLI values
//!
//! The protocol logic lives in `sui-relayer-core`; this crate wires it to a
//! real network and exposes the `discovery-relayer` binary.

#![allow(clippy::result_large_err)]

pub mod input;
pub mod sui_ledger;

pub use sui_ledger::{parse_private_key, SuiLedger, DEFAULT_GAS_BUDGET};
