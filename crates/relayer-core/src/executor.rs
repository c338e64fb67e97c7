//! Chained execution of a resolved call sequence.
//!
//! The final transaction starts with `gateway::take_approved_message`, whose
//! result is a [`Capability`] that must be handed to exactly one argument of
//! the replayed sequence.

use sui_relayer_types::{CallSequence, DiscoveryInfo, GatewayInfo, MessageInfo};
use tracing::{info, warn};

use crate::builder::Target;
use crate::codec::ArgValue;
use crate::discovery::assemble_calls;
use crate::error::{Phase, PhaseError, RelayerError, Result};
use crate::ledger::{ExecutionReceipt, ExecutionStatus};
use crate::ptb::{Argument, PTBBuilder, ProgrammableTransaction};
use crate::relayer::Relayer;
use crate::well_known::ident;

/// The approved-message hot potato. Not `Clone`; consumed once.
#[derive(Debug)]
#[must_use]
pub struct Capability {
    argument: Argument,
}

impl Capability {
    pub(crate) fn new(argument: Argument) -> Self {
        Self { argument }
    }

    pub(crate) fn consume(self) -> Argument {
        self.argument
    }
}

/// Tracks the capability while a sequence is being replayed.
#[derive(Debug)]
pub(crate) enum CapabilitySlot {
    /// Discovery: there is no capability to hand out.
    Absent,
    Available(Capability),
    Consumed,
}

impl CapabilitySlot {
    pub(crate) fn take(&mut self) -> Result<Argument> {
        match std::mem::replace(self, CapabilitySlot::Consumed) {
            CapabilitySlot::Available(capability) => Ok(capability.consume()),
            CapabilitySlot::Consumed => Err(RelayerError::CapabilityReused),
            CapabilitySlot::Absent => {
                *self = CapabilitySlot::Absent;
                Err(RelayerError::MissingCapability)
            }
        }
    }

    pub(crate) fn is_consumed(&self) -> bool {
        matches!(self, CapabilitySlot::Consumed)
    }
}

fn check_status(receipt: &ExecutionReceipt) -> Result<()> {
    match &receipt.status {
        ExecutionStatus::Success => Ok(()),
        ExecutionStatus::Failure { error } => Err(RelayerError::SubmissionReverted {
            digest: receipt.digest.clone(),
            reason: error.clone(),
        }),
    }
}

impl Relayer {
    /// Discover the call sequence for `message`, then execute it.
    pub async fn execute(
        &self,
        discovery: &DiscoveryInfo,
        gateway: &GatewayInfo,
        message: &MessageInfo,
    ) -> std::result::Result<ExecutionReceipt, PhaseError> {
        let sequence = self.discover(discovery, message).await?;
        self.execute_sequence(gateway, message, &sequence).await
    }

    /// Execute an already resolved final `sequence`.
    pub async fn execute_sequence(
        &self,
        gateway: &GatewayInfo,
        message: &MessageInfo,
        sequence: &CallSequence,
    ) -> std::result::Result<ExecutionReceipt, PhaseError> {
        let tx = self
            .assemble_execution(gateway, message, sequence)
            .await?;

        let receipt = self
            .submit_and_confirm(&tx)
            .await
            .map_err(PhaseError::execution)?;
        if let Some(changes) = &receipt.object_changes {
            self.cache.update(changes);
        }
        info!(
            digest = %receipt.digest,
            message_id = %message.message_id,
            "message executed"
        );
        Ok(receipt)
    }

    /// Build the final transaction without submitting it.
    pub async fn assemble_execution(
        &self,
        gateway: &GatewayInfo,
        message: &MessageInfo,
        sequence: &CallSequence,
    ) -> std::result::Result<ProgrammableTransaction, PhaseError> {
        if !sequence.is_final {
            return Err(PhaseError::execution(RelayerError::SequenceNotFinal));
        }
        let mut tx = PTBBuilder::new();
        let take = Target::new(
            gateway.package_id,
            ident::GATEWAY.as_str(),
            ident::TAKE_APPROVED_MESSAGE.as_str(),
        )
        .map_err(PhaseError::execution)?;
        let approved = self
            .builder
            .build(
                &mut tx,
                &take,
                vec![
                    gateway.gateway.into(),
                    message.source_chain.as_str().into(),
                    message.message_id.as_str().into(),
                    message.source_address.as_str().into(),
                    message.destination_id.into(),
                    ArgValue::Bytes(message.payload.clone()),
                ],
                &[],
            )
            .await
            .map_err(PhaseError::execution)?;

        let mut capability = CapabilitySlot::Available(Capability::new(approved));
        assemble_calls(
            &self.builder,
            &mut tx,
            &sequence.calls,
            &message.payload,
            &mut capability,
        )
        .await
        .map_err(|(index, e)| PhaseError::new(Phase::Execution, Some(index), e))?;

        if !capability.is_consumed() {
            return Err(PhaseError::execution(RelayerError::CapabilityNotConsumed));
        }
        Ok(tx.finish())
    }

    async fn submit_and_confirm(&self, tx: &ProgrammableTransaction) -> Result<ExecutionReceipt> {
        let receipt = self.ledger.submit(tx).await?;
        check_status(&receipt)?;
        if receipt.confirmed_local_execution && receipt.object_changes.is_some() {
            return Ok(receipt);
        }
        self.wait_for_confirmation(&receipt.digest).await
    }

    /// Poll until the transaction is visible with its object changes.
    pub async fn wait_for_confirmation(&self, digest: &str) -> Result<ExecutionReceipt> {
        let policy = self.config.confirmation;
        for attempt in 1..=policy.attempts {
            match self.ledger.confirm(digest).await {
                // A failed status is final even without object changes.
                Ok(receipt)
                    if receipt.object_changes.is_some()
                        || matches!(receipt.status, ExecutionStatus::Failure { .. }) =>
                {
                    check_status(&receipt)?;
                    return Ok(receipt);
                }
                Ok(_) => warn!(digest, attempt, "transaction visible without object changes"),
                Err(e) => warn!(digest, attempt, error = %e, "confirmation lookup failed"),
            }
            if attempt < policy.attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }
        Err(RelayerError::ConfirmationTimeout {
            digest: digest.to_string(),
            attempts: policy.attempts,
        })
    }
}
