//! Move call construction from untyped arguments.
//!
//! [`CallBuilder::build`] looks up the target's normalized signature, checks
//! arity, classifies each argument and appends one `MoveCall` to the PTB.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;
use move_core_types::language_storage::TypeTag;
use parking_lot::RwLock;
use sui_relayer_types::encoding::parse_address;
use sui_relayer_types::Function;
use tracing::{debug, trace};

use crate::cache::ObjectCache;
use crate::classify::ArgumentEncoder;
use crate::codec::{ArgValue, TypeResolver};
use crate::error::{RelayerError, Result};
use crate::ledger::{FunctionSignature, LedgerClient};
use crate::ptb::{Argument, MoveCall, PTBBuilder};

/// A fully qualified Move function: `0xpkg::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub package: AccountAddress,
    pub module: Identifier,
    pub function: Identifier,
}

impl Target {
    pub fn new(package: AccountAddress, module: &str, function: &str) -> Result<Self> {
        let invalid = || {
            RelayerError::InvalidTarget(format!(
                "{}::{}::{}",
                package.to_hex_literal(),
                module,
                function
            ))
        };
        Ok(Self {
            package,
            module: Identifier::new(module).map_err(|_| invalid())?,
            function: Identifier::new(function).map_err(|_| invalid())?,
        })
    }
}

impl FromStr for Target {
    type Err = RelayerError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(RelayerError::InvalidTarget(s.to_string()));
        };
        let package = parse_address(package).ok_or_else(|| RelayerError::InvalidTarget(s.to_string()))?;
        Self::new(package, module, function)
    }
}

impl TryFrom<&Function> for Target {
    type Error = RelayerError;

    fn try_from(f: &Function) -> Result<Self> {
        Self::new(f.package_id, &f.module_name, &f.name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.package.to_hex_literal(),
            self.module,
            self.function
        )
    }
}

/// Add `0x` to bare 64-digit hex addresses, as emitted by Move's `type_name`.
pub fn normalize_type_argument(type_argument: &str) -> String {
    let mut out = String::with_capacity(type_argument.len() + 8);
    let mut token = String::new();
    let flush = |token: &mut String, out: &mut String| {
        if token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()) {
            out.push_str("0x");
        }
        out.push_str(token);
        token.clear();
    };
    for c in type_argument.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            token.push(c);
        } else {
            flush(&mut token, &mut out);
            out.push(c);
        }
    }
    flush(&mut token, &mut out);
    out
}

pub fn parse_type_arguments(type_arguments: &[String]) -> Result<Vec<TypeTag>> {
    type_arguments
        .iter()
        .map(|raw| {
            let normalized = normalize_type_argument(raw);
            TypeTag::from_str(&normalized)
                .map_err(|e| RelayerError::serialization("type argument", format!("'{}': {}", raw, e)))
        })
        .collect()
}

/// Builds Move calls against live signatures. Signatures are memoized per
/// target for the lifetime of the builder.
pub struct CallBuilder {
    ledger: Arc<dyn LedgerClient>,
    resolver: TypeResolver,
    cache: Arc<ObjectCache>,
    signatures: RwLock<HashMap<Target, Arc<FunctionSignature>>>,
}

impl CallBuilder {
    pub fn new(ledger: Arc<dyn LedgerClient>, cache: Arc<ObjectCache>) -> Self {
        Self {
            resolver: TypeResolver::new(ledger.clone()),
            ledger,
            cache,
            signatures: RwLock::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<ObjectCache> {
        &self.cache
    }

    pub async fn signature(&self, target: &Target) -> Result<Arc<FunctionSignature>> {
        let cached = self.signatures.read().get(target).cloned();
        if let Some(signature) = cached {
            return Ok(signature);
        }
        debug!(%target, "fetching function signature");
        let signature = Arc::new(self.ledger.function_signature(target).await?);
        self.signatures
            .write()
            .insert(target.clone(), signature.clone());
        Ok(signature)
    }

    /// Append a call to `target` and return `Result(command_index)`.
    pub async fn build(
        &self,
        tx: &mut PTBBuilder,
        target: &Target,
        arguments: Vec<ArgValue>,
        type_arguments: &[String],
    ) -> Result<Argument> {
        let signature = self.signature(target).await?;
        let declared = signature.parameters.len();
        let expected = match signature.parameters.last() {
            Some(last) if last.is_tx_context() => declared - 1,
            _ => declared,
        };
        if arguments.len() != expected {
            return Err(RelayerError::Arity {
                target: target.to_string(),
                expected,
                declared,
                actual: arguments.len(),
            });
        }

        let type_tags = parse_type_arguments(type_arguments)?;
        if type_tags.len() != signature.type_parameter_count {
            return Err(RelayerError::serialization(
                format!("{} type arguments", signature.type_parameter_count),
                format!("{} takes {} type arguments, got {}", target, signature.type_parameter_count, type_tags.len()),
            ));
        }

        let target_name = target.to_string();
        let encoder = ArgumentEncoder::new(&self.resolver, &self.cache);
        let mut call_arguments = Vec::with_capacity(expected);
        for (index, (parameter, value)) in signature.parameters.iter().zip(arguments).enumerate() {
            let arg = encoder
                .classify_and_encode(tx, parameter, value, &type_tags)
                .await
                .map_err(|e| e.at_argument(&target_name, index))?;
            trace!(target = %target_name, index, ?arg, "encoded argument");
            call_arguments.push(arg);
        }

        Ok(tx.move_call(MoveCall {
            package: target.package,
            module: target.module.clone(),
            function: target.function.clone(),
            type_arguments: type_tags,
            arguments: call_arguments,
        }))
    }
}
