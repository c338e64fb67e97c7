//! Shared types for the discovery relayer workspace.
//!
//! This crate holds everything that has to agree byte-for-byte with the
//! on-chain side, plus small helpers used by both the core and the CLI:
//!
//! - [`call`] - the discovery wire format ([`CallSequence`], [`CallUnit`],
//!   [`ArgumentSource`])
//! - [`message`] - routing descriptors for a relayed message
//! - [`framework`] - Sui framework addresses
//! - [`encoding`] - hex helpers and serde adapters
//! - [`env_utils`] - environment variable parsing

pub mod call;
pub mod encoding;
pub mod env_utils;
pub mod framework;
pub mod message;

pub use call::{ArgumentDecodeError, ArgumentSource, CallSequence, CallUnit, Function};
pub use message::{DiscoveryInfo, GatewayInfo, MessageInfo};

use std::time::Duration;

/// Fixed-delay retry policy for network polling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (the first try counts).
    pub attempts: usize,
    /// Delay between two attempts.
    pub delay: Duration,
}

impl RetryConfig {
    /// Create a new RetryConfig with the specified parameters.
    pub fn new(attempts: usize, delay_ms: u64) -> Self {
        Self {
            attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(1000),
        }
    }
}
