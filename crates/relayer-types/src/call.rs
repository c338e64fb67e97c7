//! Discovery wire format.
//!
//! These structs mirror the Move-side `Function`, `MoveCall` and
//! `Transaction` structs of the discovery registry. Field order is the BCS
//! order; do not reorder.

use move_core_types::account_address::AccountAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::encoding;

/// Argument tag: object id follows.
pub const TAG_OBJECT: u8 = 0;
/// Argument tag: already-encoded pure bytes follow.
pub const TAG_PURE: u8 = 1;
/// Argument tag: the approved-message capability.
pub const TAG_CAPABILITY: u8 = 2;
/// Argument tag: the message payload.
pub const TAG_PAYLOAD: u8 = 3;
/// Argument tag: result of an earlier call (call index, result index).
pub const TAG_PRIOR_RESULT: u8 = 4;

/// A fully qualified Move function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Function {
    #[serde(with = "encoding::address_hex")]
    pub package_id: AccountAddress,
    pub module_name: String,
    pub name: String,
}

impl Function {
    pub fn new(
        package_id: AccountAddress,
        module_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package_id,
            module_name: module_name.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            encoding::address_to_string(&self.package_id),
            self.module_name,
            self.name
        )
    }
}

/// One call in a discovery response (`MoveCall` on chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUnit {
    pub function: Function,
    /// Raw tagged arguments, see [`ArgumentSource`].
    #[serde(with = "encoding::hex_byte_vecs")]
    pub arguments: Vec<Vec<u8>>,
    pub type_arguments: Vec<String>,
}

impl CallUnit {
    /// Decode every raw argument. Stops at the first malformed one.
    pub fn sources(&self) -> Result<Vec<ArgumentSource>, (usize, ArgumentDecodeError)> {
        self.arguments
            .iter()
            .enumerate()
            .map(|(i, raw)| ArgumentSource::decode(raw).map_err(|e| (i, e)))
            .collect()
    }
}

/// An ordered call sequence returned by the registry (`Transaction` on chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSequence {
    pub is_final: bool,
    #[serde(rename = "move_calls")]
    pub calls: Vec<CallUnit>,
}

impl CallSequence {
    pub fn to_bcs(&self) -> Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    /// Strict decode: trailing bytes are rejected.
    pub fn from_bcs(bytes: &[u8]) -> Result<Self, bcs::Error> {
        bcs::from_bytes(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentDecodeError {
    #[error("empty argument")]
    Empty,
    #[error("unknown argument tag {0}")]
    UnknownTag(u8),
    #[error("argument tag {tag} expects {expected} payload bytes, got {actual}")]
    BadLength {
        tag: u8,
        expected: usize,
        actual: usize,
    },
}

/// Decoded form of one `CallUnit.arguments[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSource {
    Object(AccountAddress),
    /// Already BCS-encoded; passed through verbatim.
    Pure(Vec<u8>),
    Capability,
    Payload,
    PriorResult { call: u8, index: u8 },
}

impl ArgumentSource {
    pub fn decode(raw: &[u8]) -> Result<Self, ArgumentDecodeError> {
        let (&tag, rest) = raw.split_first().ok_or(ArgumentDecodeError::Empty)?;
        let expect_len = |expected: usize| {
            if rest.len() == expected {
                Ok(())
            } else {
                Err(ArgumentDecodeError::BadLength {
                    tag,
                    expected,
                    actual: rest.len(),
                })
            }
        };
        match tag {
            TAG_OBJECT => {
                expect_len(AccountAddress::LENGTH)?;
                let mut id = [0u8; AccountAddress::LENGTH];
                id.copy_from_slice(rest);
                Ok(Self::Object(AccountAddress::new(id)))
            }
            TAG_PURE => Ok(Self::Pure(rest.to_vec())),
            TAG_CAPABILITY => expect_len(0).map(|_| Self::Capability),
            TAG_PAYLOAD => expect_len(0).map(|_| Self::Payload),
            TAG_PRIOR_RESULT => {
                expect_len(2)?;
                Ok(Self::PriorResult {
                    call: rest[0],
                    index: rest[1],
                })
            }
            other => Err(ArgumentDecodeError::UnknownTag(other)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Object(id) => {
                let mut out = Vec::with_capacity(1 + AccountAddress::LENGTH);
                out.push(TAG_OBJECT);
                out.extend_from_slice(id.as_ref());
                out
            }
            Self::Pure(bytes) => {
                let mut out = Vec::with_capacity(1 + bytes.len());
                out.push(TAG_PURE);
                out.extend_from_slice(bytes);
                out
            }
            Self::Capability => vec![TAG_CAPABILITY],
            Self::Payload => vec![TAG_PAYLOAD],
            Self::PriorResult { call, index } => vec![TAG_PRIOR_RESULT, *call, *index],
        }
    }
}
