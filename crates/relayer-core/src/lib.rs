//! Sui Relayer Core
//!
//! Dynamic transaction construction and relayer discovery for Sui.
//!
//! Given only a function target and untyped values, the crate looks up the
//! normalized signature, encodes every argument the way the Move VM expects
//! and appends the call to a programmable transaction. On top of that it runs
//! the discovery protocol: an on-chain registry is simulated repeatedly until
//! it returns a final call sequence, which is then executed with the approved
//! message capability spliced in.
//!
//! # Core Modules
//!
//! - [`descriptor`]: Move parameter types
//! - [`codec`]: type-directed BCS encoding, struct resolution
//! - [`classify`]: object vs pure argument classification
//! - [`builder`]: Move call construction
//! - [`ptb`]: transaction model
//! - [`cache`]: object reference cache
//! - [`discovery`]: discovery resolution loop
//! - [`executor`]: chained execution with the capability
//! - [`ledger`]: the ledger collaborator trait
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sui_relayer_core::{Relayer, RelayerConfig};
//!
//! let relayer = Relayer::new(Arc::new(ledger), RelayerConfig::from_env());
//! let receipt = relayer.execute(&discovery, &gateway, &message).await?;
//! println!("{}", receipt.digest);
//! ```

#![allow(clippy::result_large_err)]

pub mod builder;
pub mod cache;
pub mod classify;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod ptb;
pub mod relayer;
pub mod well_known;

pub use builder::{CallBuilder, Target};
pub use cache::{ObjectCache, ObjectCacheEntry, ObjectChange, ObjectChangeKind, Owner};
pub use codec::{ArgValue, Encoder, TypeResolver};
pub use config::RelayerConfig;
pub use descriptor::{Primitive, TypeDescriptor};
pub use error::{ErrorCode, Phase, PhaseError, RelayerError};
pub use executor::Capability;
pub use ledger::{
    CommandOutputs, ExecutionReceipt, ExecutionStatus, FieldDescriptor, FunctionSignature,
    LedgerClient, ReturnValue, SimulationResult, StructSchema,
};
pub use ptb::{Argument, CallArg, Command, MoveCall, ObjectInput, PTBBuilder, ProgrammableTransaction};
pub use relayer::Relayer;
