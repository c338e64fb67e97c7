//! Error taxonomy for call construction, discovery and execution.

use std::fmt;

use sui_relayer_types::ArgumentDecodeError;
use thiserror::Error;

/// Stable, machine-readable error codes.
pub trait ErrorCode {
    fn code(&self) -> &'static str;
}

/// Where an argument sits in a call, attached once the builder knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentLocation {
    pub target: String,
    pub index: usize,
}

impl fmt::Display for ArgumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} argument {}", self.target, self.index)
    }
}

#[derive(Debug, Error)]
pub enum RelayerError {
    #[error("unsupported type {type_name}: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    #[error(
        "cannot encode value as {expected}{}: {reason}",
        .at.as_ref().map(|at| format!(" ({at})")).unwrap_or_default()
    )]
    Serialization {
        expected: String,
        reason: String,
        at: Option<ArgumentLocation>,
    },

    #[error("{target} takes {expected} arguments ({declared} declared) but was given {actual}")]
    Arity {
        target: String,
        expected: usize,
        declared: usize,
        actual: usize,
    },

    #[error("invalid call target '{0}'")]
    InvalidTarget(String),

    #[error("malformed argument {index}: {source}")]
    MalformedArgument {
        index: usize,
        #[source]
        source: ArgumentDecodeError,
    },

    #[error("invalid result reference ({call}, {index}) at call {position}: {reason}")]
    InvalidResultReference {
        call: u8,
        index: u8,
        position: usize,
        reason: String,
    },

    #[error("capability requested but none is available during discovery")]
    MissingCapability,

    #[error("capability already consumed by an earlier argument")]
    CapabilityReused,

    #[error("final call sequence never consumes the capability")]
    CapabilityNotConsumed,

    #[error("call sequence is not final; run discovery first")]
    SequenceNotFinal,

    #[error("malformed discovery response: {0}")]
    MalformedDiscoveryResponse(String),

    #[error("discovery did not reach a final sequence within {limit} iterations")]
    DiscoveryLoopExceeded { limit: usize },

    #[error("simulation reverted: {0}")]
    SimulationReverted(String),

    #[error("transaction {digest} reverted: {reason}")]
    SubmissionReverted { digest: String, reason: String },

    #[error("transaction {digest} not confirmed after {attempts} attempts")]
    ConfirmationTimeout { digest: String, attempts: usize },

    #[error("ledger error: {0:#}")]
    Ledger(#[from] anyhow::Error),
}

impl RelayerError {
    pub fn serialization(expected: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialization {
            expected: expected.into(),
            reason: reason.into(),
            at: None,
        }
    }

    pub fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Attach the call target and argument position to a serialization error.
    /// Other variants pass through untouched.
    pub fn at_argument(self, target: &str, index: usize) -> Self {
        match self {
            Self::Serialization {
                expected,
                reason,
                at: None,
            } => Self::Serialization {
                expected,
                reason,
                at: Some(ArgumentLocation {
                    target: target.to_string(),
                    index,
                }),
            },
            other => other,
        }
    }

    /// Errors caused by caller or registry input rather than the ledger.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Serialization { .. }
                | Self::Arity { .. }
                | Self::InvalidResultReference { .. }
                | Self::MalformedArgument { .. }
                | Self::SequenceNotFinal
        )
    }
}

impl ErrorCode for RelayerError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::Serialization { .. } => "SERIALIZATION",
            Self::Arity { .. } => "ARITY",
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::MalformedArgument { .. } => "MALFORMED_ARGUMENT",
            Self::InvalidResultReference { .. } => "INVALID_RESULT_REFERENCE",
            Self::MissingCapability => "MISSING_CAPABILITY",
            Self::CapabilityReused => "CAPABILITY_REUSED",
            Self::CapabilityNotConsumed => "CAPABILITY_NOT_CONSUMED",
            Self::SequenceNotFinal => "SEQUENCE_NOT_FINAL",
            Self::MalformedDiscoveryResponse(_) => "MALFORMED_DISCOVERY_RESPONSE",
            Self::DiscoveryLoopExceeded { .. } => "DISCOVERY_LOOP_EXCEEDED",
            Self::SimulationReverted(_) => "SIMULATION_REVERTED",
            Self::SubmissionReverted { .. } => "SUBMISSION_REVERTED",
            Self::ConfirmationTimeout { .. } => "CONFIRMATION_TIMEOUT",
            Self::Ledger(_) => "LEDGER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discovery,
    Execution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Discovery => write!(f, "discovery"),
            Phase::Execution => write!(f, "execution"),
        }
    }
}

/// A [`RelayerError`] tagged with the phase and call that produced it.
#[derive(Debug, Error)]
#[error(
    "{phase} failed{}: {source}",
    .call_index.map(|index| format!(" at call {index}")).unwrap_or_default()
)]
pub struct PhaseError {
    pub phase: Phase,
    /// Index into the call sequence being assembled, when one applies.
    pub call_index: Option<usize>,
    #[source]
    pub source: RelayerError,
}

impl PhaseError {
    pub fn new(phase: Phase, call_index: Option<usize>, source: RelayerError) -> Self {
        Self {
            phase,
            call_index,
            source,
        }
    }

    pub fn discovery(source: RelayerError) -> Self {
        Self::new(Phase::Discovery, None, source)
    }

    pub fn execution(source: RelayerError) -> Self {
        Self::new(Phase::Execution, None, source)
    }
}

impl ErrorCode for PhaseError {
    fn code(&self) -> &'static str {
        self.source.code()
    }
}

pub type Result<T, E = RelayerError> = std::result::Result<T, E>;
