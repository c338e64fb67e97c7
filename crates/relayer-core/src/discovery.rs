//! Discovery resolution loop.
//!
//! Starting from `discovery::get_transaction`, each round simulates the
//! current call sequence and decodes the next one from the return value of
//! its last call, until the registry answers with `is_final`.
//!
//! ```text
//! Seed -> Simulating -> Decoding -> (Simulating | Final)
//! ```

use move_core_types::account_address::AccountAddress;
use sui_relayer_types::call::ArgumentSource;
use sui_relayer_types::{CallSequence, CallUnit, DiscoveryInfo, Function, MessageInfo};
use tracing::{debug, info};

use crate::builder::{CallBuilder, Target};
use crate::codec::ArgValue;
use crate::error::{Phase, PhaseError, RelayerError, Result};
use crate::executor::CapabilitySlot;
use crate::ledger::SimulationResult;
use crate::ptb::{Argument, PTBBuilder};
use crate::relayer::Relayer;
use crate::well_known::ident;

/// The first sequence: ask the registry what to call for `destination_id`.
pub fn seed_sequence(discovery: &DiscoveryInfo, destination_id: AccountAddress) -> CallSequence {
    CallSequence {
        is_final: false,
        calls: vec![CallUnit {
            function: Function::new(
                discovery.package_id,
                ident::DISCOVERY.as_str(),
                ident::GET_TRANSACTION.as_str(),
            ),
            arguments: vec![
                ArgumentSource::Object(discovery.discovery).encode(),
                ArgumentSource::Pure(destination_id.to_vec()).encode(),
            ],
            type_arguments: vec![],
        }],
    }
}

/// Append every call of `calls` to `tx`, resolving tagged arguments.
///
/// Returns the command index of each call. Result references count calls in
/// `calls` only, so helper commands and calls added before are skipped over.
/// Errors carry the index of the failing call.
pub(crate) async fn assemble_calls(
    builder: &CallBuilder,
    tx: &mut PTBBuilder,
    calls: &[CallUnit],
    payload: &[u8],
    capability: &mut CapabilitySlot,
) -> std::result::Result<Vec<u16>, (usize, RelayerError)> {
    let mut commands: Vec<u16> = Vec::with_capacity(calls.len());
    let mut return_counts: Vec<usize> = Vec::with_capacity(calls.len());

    for (position, unit) in calls.iter().enumerate() {
        let fail = |e: RelayerError| (position, e);
        let target = Target::try_from(&unit.function).map_err(fail)?;
        let signature = builder.signature(&target).await.map_err(fail)?;
        let sources = unit
            .sources()
            .map_err(|(index, source)| fail(RelayerError::MalformedArgument { index, source }))?;

        let mut values = Vec::with_capacity(sources.len());
        for (arg_index, source) in sources.into_iter().enumerate() {
            let value = match source {
                ArgumentSource::Object(id) => {
                    let mutable = signature
                        .parameters
                        .get(arg_index)
                        .map_or(true, |p| p.is_mutable_object());
                    ArgValue::Argument(tx.object(builder.cache().get_or_bare(id, mutable)))
                }
                ArgumentSource::Pure(bytes) => ArgValue::Encoded(bytes),
                ArgumentSource::Capability => ArgValue::Argument(capability.take().map_err(fail)?),
                ArgumentSource::Payload => ArgValue::Bytes(payload.to_vec()),
                ArgumentSource::PriorResult { call, index } => {
                    let invalid = |reason: String| {
                        fail(RelayerError::InvalidResultReference {
                            call,
                            index,
                            position,
                            reason,
                        })
                    };
                    let call_idx = call as usize;
                    if call_idx >= position {
                        return Err(invalid("refers to a call that has not run yet".into()));
                    }
                    if index as usize >= return_counts[call_idx] {
                        return Err(invalid(format!(
                            "call {} returns {} values",
                            call_idx, return_counts[call_idx]
                        )));
                    }
                    ArgValue::Argument(Argument::NestedResult(commands[call_idx], index as u16))
                }
            };
            values.push(value);
        }

        builder
            .build(tx, &target, values, &unit.type_arguments)
            .await
            .map_err(fail)?;
        commands.push((tx.command_count() - 1) as u16);
        return_counts.push(signature.returns.len());
    }

    Ok(commands)
}

/// Decode the next sequence from the first return value of `command`.
pub fn decode_response(result: &SimulationResult, command: u16) -> Result<CallSequence> {
    let outputs = result.results.get(command as usize).ok_or_else(|| {
        RelayerError::MalformedDiscoveryResponse(format!("no results for command {}", command))
    })?;
    let first = outputs.return_values.first().ok_or_else(|| {
        RelayerError::MalformedDiscoveryResponse(format!("command {} returned nothing", command))
    })?;
    CallSequence::from_bcs(&first.bytes)
        .map_err(|e| RelayerError::MalformedDiscoveryResponse(e.to_string()))
}

impl Relayer {
    /// Resolve the final call sequence for `message`.
    pub async fn discover(
        &self,
        discovery: &DiscoveryInfo,
        message: &MessageInfo,
    ) -> std::result::Result<CallSequence, PhaseError> {
        let limit = self.config.max_discovery_iterations;
        let sender = self.ledger.sender();
        let mut sequence = seed_sequence(discovery, message.destination_id);
        info!(
            destination_id = %message.destination_id,
            message_id = %message.message_id,
            "resolving call sequence"
        );

        for iteration in 1..=limit {
            if sequence.calls.is_empty() {
                return Err(PhaseError::discovery(RelayerError::MalformedDiscoveryResponse(
                    "non-final sequence without calls".into(),
                )));
            }

            let mut tx = PTBBuilder::new();
            let mut capability = CapabilitySlot::Absent;
            let commands = assemble_calls(
                &self.builder,
                &mut tx,
                &sequence.calls,
                &message.payload,
                &mut capability,
            )
            .await
            .map_err(|(index, e)| PhaseError::new(Phase::Discovery, Some(index), e))?;

            let tx = tx.finish();
            let result = self
                .ledger
                .simulate(&tx, sender)
                .await
                .map_err(|e| PhaseError::discovery(RelayerError::Ledger(e)))?;
            if let Some(error) = result.error.clone() {
                return Err(PhaseError::discovery(RelayerError::SimulationReverted(error)));
            }

            let last_command = commands.last().copied().unwrap_or_default();
            let next = decode_response(&result, last_command).map_err(PhaseError::discovery)?;
            debug!(
                iteration,
                calls = next.calls.len(),
                is_final = next.is_final,
                "discovery round"
            );

            if next.is_final {
                return Ok(next);
            }
            sequence = next;
        }

        Err(PhaseError::discovery(RelayerError::DiscoveryLoopExceeded { limit }))
    }
}
