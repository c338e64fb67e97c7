//! Argument classification: object input, object vector, or pure value.

use move_core_types::account_address::AccountAddress;
use move_core_types::language_storage::TypeTag;
use sui_relayer_types::encoding::parse_address;

use crate::cache::ObjectCache;
use crate::codec::{ArgValue, TypeResolver};
use crate::descriptor::TypeDescriptor;
use crate::error::{RelayerError, Result};
use crate::ptb::{Argument, PTBBuilder};

/// Turns one caller value into a PTB argument for a parameter of known type.
pub struct ArgumentEncoder<'a> {
    resolver: &'a TypeResolver,
    cache: &'a ObjectCache,
}

impl<'a> ArgumentEncoder<'a> {
    pub fn new(resolver: &'a TypeResolver, cache: &'a ObjectCache) -> Self {
        Self { resolver, cache }
    }

    /// Classify `value` against `descriptor` and add it to `tx`.
    ///
    /// `type_arguments` are the call-site type arguments used to substitute
    /// type parameters.
    pub async fn classify_and_encode(
        &self,
        tx: &mut PTBBuilder,
        descriptor: &TypeDescriptor,
        value: ArgValue,
        type_arguments: &[TypeTag],
    ) -> Result<Argument> {
        match value {
            ArgValue::Argument(arg) => return Ok(arg),
            ArgValue::Encoded(bytes) => return Ok(tx.pure_bytes(bytes)),
            _ => {}
        }

        if descriptor.is_object_like() {
            return self.object_argument(tx, descriptor, value, type_arguments);
        }

        let context: Vec<TypeDescriptor> = type_arguments
            .iter()
            .map(TypeDescriptor::from_type_tag)
            .collect();
        let encoder = self.resolver.resolve(descriptor, &context).await?;
        let bytes = encoder.encode(&value)?;
        Ok(tx.pure_bytes(bytes))
    }

    fn object_argument(
        &self,
        tx: &mut PTBBuilder,
        descriptor: &TypeDescriptor,
        value: ArgValue,
        type_arguments: &[TypeTag],
    ) -> Result<Argument> {
        if let ArgValue::Argument(arg) = value {
            return Ok(arg);
        }

        match descriptor {
            TypeDescriptor::Vector(element) => {
                let items = match value {
                    ArgValue::Array(items) => items,
                    other => {
                        return Err(RelayerError::serialization(
                            descriptor.to_string(),
                            format!("expected an array of objects, got {:?}", other),
                        ))
                    }
                };
                let elements = items
                    .into_iter()
                    .map(|item| self.object_argument(tx, element, item, type_arguments))
                    .collect::<Result<Vec<_>>>()?;
                let element_type = element.to_type_tag(type_arguments)?;
                Ok(tx.make_move_vec(Some(element_type), elements))
            }
            _ => {
                let id = object_id(descriptor, &value)?;
                let input = self.cache.get_or_bare(id, descriptor.is_mutable_object());
                Ok(tx.object(input))
            }
        }
    }
}

/// Object id from 32 raw bytes or a hex string; bytes win.
fn object_id(descriptor: &TypeDescriptor, value: &ArgValue) -> Result<AccountAddress> {
    match value {
        ArgValue::Bytes(bytes) => AccountAddress::from_bytes(bytes).map_err(|_| {
            RelayerError::serialization(
                descriptor.to_string(),
                format!("object id must be 32 bytes, got {}", bytes.len()),
            )
        }),
        ArgValue::String(s) => parse_address(s).ok_or_else(|| {
            RelayerError::serialization(descriptor.to_string(), format!("'{}' is not an object id", s))
        }),
        other => Err(RelayerError::serialization(
            descriptor.to_string(),
            format!("expected an object id, got {:?}", other),
        )),
    }
}
