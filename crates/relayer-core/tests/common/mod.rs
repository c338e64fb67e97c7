#![allow(dead_code, unused_imports)]
//! Shared test utilities for the relayer integration tests.
//!
//! - `mocks`: scripted in-memory [`LedgerClient`](sui_relayer_core::LedgerClient)
//! - `fixtures`: addresses, signatures and messages for a toy deployment
//! - `assertions`: error assertion helpers

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::{assert_code, assert_error_contains};
pub use fixtures::*;
pub use mocks::{MockLedger, Simulation};
