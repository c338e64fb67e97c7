//! Type descriptors for Move function parameters.
//!
//! A [`TypeDescriptor`] is built per call site from the normalized signature
//! returned by the ledger and drives both argument classification and the
//! choice of pure encoder.

use std::fmt;

use move_core_types::account_address::AccountAddress;
use move_core_types::identifier::Identifier;
use move_core_types::language_storage::{StructTag, TypeTag};
use serde_json::Value as JsonValue;
use sui_relayer_types::encoding::parse_address;

use crate::error::{RelayerError, Result};
use crate::well_known::{is_string_struct, is_tx_context_struct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
}

impl Primitive {
    fn from_normalized(name: &str) -> Option<Self> {
        Some(match name {
            "Bool" => Self::Bool,
            "U8" => Self::U8,
            "U16" => Self::U16,
            "U32" => Self::U32,
            "U64" => Self::U64,
            "U128" => Self::U128,
            "U256" => Self::U256,
            "Address" => Self::Address,
            "Signer" => Self::Signer,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "u256",
            Self::Address => "address",
            Self::Signer => "signer",
        }
    }
}

/// A Move type as it appears in a normalized function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Vector(Box<TypeDescriptor>),
    Struct {
        address: AccountAddress,
        module: String,
        name: String,
        type_arguments: Vec<TypeDescriptor>,
    },
    Reference(Box<TypeDescriptor>),
    MutableReference(Box<TypeDescriptor>),
    TypeParameter(u16),
}

impl TypeDescriptor {
    pub fn vector(inner: TypeDescriptor) -> Self {
        Self::Vector(Box::new(inner))
    }

    pub fn reference(inner: TypeDescriptor) -> Self {
        Self::Reference(Box::new(inner))
    }

    pub fn mutable_reference(inner: TypeDescriptor) -> Self {
        Self::MutableReference(Box::new(inner))
    }

    pub fn structure(address: AccountAddress, module: &str, name: &str) -> Self {
        Self::Struct {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_arguments: vec![],
        }
    }

    /// Parse the JSON-RPC normalized type shape (`"U64"`, `{"Vector": ..}`,
    /// `{"Struct": {..}}`, `{"Reference": ..}`, `{"MutableReference": ..}`,
    /// `{"TypeParameter": n}`).
    pub fn from_normalized_json(json: &JsonValue) -> Result<Self> {
        let unsupported = |reason: &str| RelayerError::unsupported(json.to_string(), reason);

        match json {
            JsonValue::String(name) => Primitive::from_normalized(name)
                .map(Self::Primitive)
                .ok_or_else(|| unsupported("unknown primitive")),
            JsonValue::Object(map) if map.len() == 1 => {
                let (kind, inner) = map
                    .iter()
                    .next()
                    .ok_or_else(|| unsupported("empty type object"))?;
                match kind.as_str() {
                    "Vector" => Ok(Self::vector(Self::from_normalized_json(inner)?)),
                    "Reference" => Ok(Self::reference(Self::from_normalized_json(inner)?)),
                    "MutableReference" => {
                        Ok(Self::mutable_reference(Self::from_normalized_json(inner)?))
                    }
                    "TypeParameter" => inner
                        .as_u64()
                        .and_then(|idx| u16::try_from(idx).ok())
                        .map(Self::TypeParameter)
                        .ok_or_else(|| unsupported("type parameter index is not a u16")),
                    "Struct" => Self::struct_from_json(inner).ok_or_else(|| unsupported("bad struct shape")),
                    _ => Err(unsupported("unknown type kind")),
                }
            }
            _ => Err(unsupported("unrecognized type shape")),
        }
    }

    fn struct_from_json(json: &JsonValue) -> Option<Self> {
        let address = parse_address(json.get("address")?.as_str()?)?;
        let module = json.get("module")?.as_str()?.to_string();
        let name = json.get("name")?.as_str()?.to_string();
        let type_arguments = match json.get("typeArguments") {
            None | Some(JsonValue::Null) => vec![],
            Some(JsonValue::Array(args)) => args
                .iter()
                .map(|arg| Self::from_normalized_json(arg).ok())
                .collect::<Option<Vec<_>>>()?,
            Some(_) => return None,
        };
        Some(Self::Struct {
            address,
            module,
            name,
            type_arguments,
        })
    }

    pub fn from_type_tag(tag: &TypeTag) -> Self {
        match tag {
            TypeTag::Bool => Self::Primitive(Primitive::Bool),
            TypeTag::U8 => Self::Primitive(Primitive::U8),
            TypeTag::U16 => Self::Primitive(Primitive::U16),
            TypeTag::U32 => Self::Primitive(Primitive::U32),
            TypeTag::U64 => Self::Primitive(Primitive::U64),
            TypeTag::U128 => Self::Primitive(Primitive::U128),
            TypeTag::U256 => Self::Primitive(Primitive::U256),
            TypeTag::Address => Self::Primitive(Primitive::Address),
            TypeTag::Signer => Self::Primitive(Primitive::Signer),
            TypeTag::Vector(inner) => Self::vector(Self::from_type_tag(inner)),
            TypeTag::Struct(s) => Self::Struct {
                address: s.address,
                module: s.module.to_string(),
                name: s.name.to_string(),
                type_arguments: s.type_params.iter().map(Self::from_type_tag).collect(),
            },
        }
    }

    /// Concrete `TypeTag`, with type parameters taken from `type_arguments`.
    pub fn to_type_tag(&self, type_arguments: &[TypeTag]) -> Result<TypeTag> {
        Ok(match self {
            Self::Primitive(p) => match p {
                Primitive::Bool => TypeTag::Bool,
                Primitive::U8 => TypeTag::U8,
                Primitive::U16 => TypeTag::U16,
                Primitive::U32 => TypeTag::U32,
                Primitive::U64 => TypeTag::U64,
                Primitive::U128 => TypeTag::U128,
                Primitive::U256 => TypeTag::U256,
                Primitive::Address => TypeTag::Address,
                Primitive::Signer => TypeTag::Signer,
            },
            Self::Vector(inner) => TypeTag::Vector(Box::new(inner.to_type_tag(type_arguments)?)),
            Self::Struct {
                address,
                module,
                name,
                type_arguments: params,
            } => {
                let identifier = |s: &str| {
                    Identifier::new(s)
                        .map_err(|_| RelayerError::unsupported(self.to_string(), "invalid identifier"))
                };
                TypeTag::Struct(Box::new(StructTag {
                    address: *address,
                    module: identifier(module)?,
                    name: identifier(name)?,
                    type_params: params
                        .iter()
                        .map(|p| p.to_type_tag(type_arguments))
                        .collect::<Result<_>>()?,
                }))
            }
            Self::TypeParameter(idx) => type_arguments
                .get(*idx as usize)
                .cloned()
                .ok_or_else(|| {
                    RelayerError::unsupported(
                        self.to_string(),
                        format!("only {} type arguments supplied", type_arguments.len()),
                    )
                })?,
            Self::Reference(_) | Self::MutableReference(_) => {
                return Err(RelayerError::unsupported(
                    self.to_string(),
                    "references have no type tag",
                ))
            }
        })
    }

    /// Replace type parameters with entries of `context`.
    pub fn substitute(&self, context: &[TypeDescriptor]) -> Result<TypeDescriptor> {
        Ok(match self {
            Self::TypeParameter(idx) => context.get(*idx as usize).cloned().ok_or_else(|| {
                RelayerError::unsupported(
                    self.to_string(),
                    format!("type parameter out of range ({} in context)", context.len()),
                )
            })?,
            Self::Vector(inner) => Self::vector(inner.substitute(context)?),
            Self::Reference(inner) => Self::reference(inner.substitute(context)?),
            Self::MutableReference(inner) => Self::mutable_reference(inner.substitute(context)?),
            Self::Struct {
                address,
                module,
                name,
                type_arguments,
            } => Self::Struct {
                address: *address,
                module: module.clone(),
                name: name.clone(),
                type_arguments: type_arguments
                    .iter()
                    .map(|t| t.substitute(context))
                    .collect::<Result<_>>()?,
            },
            Self::Primitive(_) => self.clone(),
        })
    }

    /// Trailing `&TxContext` / `&mut TxContext` parameter supplied by the runtime.
    pub fn is_tx_context(&self) -> bool {
        match self {
            Self::Reference(inner) | Self::MutableReference(inner) => matches!(
                inner.as_ref(),
                Self::Struct { address, module, name, .. } if is_tx_context_struct(address, module, name)
            ),
            _ => false,
        }
    }

    /// Std string struct, possibly behind a reference.
    pub fn is_string(&self) -> bool {
        match self.strip_reference() {
            Self::Struct {
                address,
                module,
                name,
                ..
            } => is_string_struct(address, module, name),
            _ => false,
        }
    }

    pub fn strip_reference(&self) -> &TypeDescriptor {
        match self {
            Self::Reference(inner) | Self::MutableReference(inner) => inner,
            other => other,
        }
    }

    /// Innermost type after removing `vector` layers, with the layer count.
    pub fn strip_vectors(&self) -> (&TypeDescriptor, usize) {
        let mut current = self;
        let mut depth = 0;
        while let Self::Vector(inner) = current {
            current = inner;
            depth += 1;
        }
        (current, depth)
    }

    /// Whether values of this type must be passed as object inputs.
    pub fn is_object_like(&self) -> bool {
        let (innermost, _) = self.strip_vectors();
        if innermost.is_string() {
            return false;
        }
        matches!(
            innermost,
            Self::Struct { .. }
                | Self::Reference(_)
                | Self::MutableReference(_)
                | Self::TypeParameter(_)
        )
    }

    /// Anything but an immutable reference is requested mutably.
    pub fn is_mutable_object(&self) -> bool {
        !matches!(self, Self::Reference(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Vector(inner) => write!(f, "vector<{}>", inner),
            Self::Struct {
                address,
                module,
                name,
                type_arguments,
            } => {
                write!(f, "{}::{}::{}", address.to_hex_literal(), module, name)?;
                if !type_arguments.is_empty() {
                    let args: Vec<String> = type_arguments.iter().map(|t| t.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            Self::Reference(inner) => write!(f, "&{}", inner),
            Self::MutableReference(inner) => write!(f, "&mut {}", inner),
            Self::TypeParameter(idx) => write!(f, "T{}", idx),
        }
    }
}
