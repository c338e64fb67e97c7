//! Type-directed BCS codec for pure arguments.
//!
//! [`TypeResolver`] turns a [`TypeDescriptor`] into an [`Encoder`], fetching
//! struct layouts from the ledger as needed. Encoders accept loosely typed
//! [`ArgValue`]s and emit the BCS bytes the Move VM expects; they also decode
//! those bytes back into values.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use move_core_types::account_address::AccountAddress;
use move_core_types::u256::U256;
use parking_lot::RwLock;
use sui_relayer_types::encoding::{address_to_string, parse_address, parse_hex_bytes};
use tracing::debug;

use crate::descriptor::{Primitive, TypeDescriptor};
use crate::error::{RelayerError, Result};
use crate::ledger::LedgerClient;
use crate::ptb::Argument;

// =============================================================================
// Values
// =============================================================================

/// An untyped argument value; its meaning is fixed by the target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Number(u128),
    /// Hex, decimal or plain text depending on the target type.
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<ArgValue>),
    /// Named fields; order does not matter when encoding.
    Struct(Vec<(String, ArgValue)>),
    /// Already BCS-encoded bytes, used verbatim.
    Encoded(Vec<u8>),
    /// An existing PTB argument (capability, prior result).
    Argument(Argument),
}

impl ArgValue {
    fn kind(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "bool",
            ArgValue::Number(_) => "number",
            ArgValue::String(_) => "string",
            ArgValue::Bytes(_) => "bytes",
            ArgValue::Array(_) => "array",
            ArgValue::Struct(_) => "struct",
            ArgValue::Encoded(_) => "encoded bytes",
            ArgValue::Argument(_) => "PTB argument",
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(v: $t) -> Self {
                ArgValue::Number(v as u128)
            }
        })*
    };
}

number_from!(u8, u16, u32, u64, u128);

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::String(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::String(v)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(v: Vec<u8>) -> Self {
        ArgValue::Bytes(v)
    }
}

impl From<AccountAddress> for ArgValue {
    fn from(v: AccountAddress) -> Self {
        ArgValue::Bytes(v.to_vec())
    }
}

impl From<Argument> for ArgValue {
    fn from(v: Argument) -> Self {
        ArgValue::Argument(v)
    }
}

// =============================================================================
// Encoders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructEncoder {
    pub type_name: String,
    pub fields: Vec<(String, Encoder)>,
}

/// Resolved encoder tree for one concrete Move type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    /// `0x1::string::String` / `0x1::ascii::String`
    String,
    /// `vector<u8>`
    Bytes,
    Vector(Box<Encoder>),
    Struct(Arc<StructEncoder>),
}

impl Encoder {
    pub fn type_name(&self) -> String {
        match self {
            Encoder::Bool => "bool".into(),
            Encoder::U8 => "u8".into(),
            Encoder::U16 => "u16".into(),
            Encoder::U32 => "u32".into(),
            Encoder::U64 => "u64".into(),
            Encoder::U128 => "u128".into(),
            Encoder::U256 => "u256".into(),
            Encoder::Address => "address".into(),
            Encoder::String => "string".into(),
            Encoder::Bytes => "vector<u8>".into(),
            Encoder::Vector(inner) => format!("vector<{}>", inner.type_name()),
            Encoder::Struct(s) => s.type_name.clone(),
        }
    }

    pub fn encode(&self, value: &ArgValue) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Decode a complete value; trailing bytes are an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<ArgValue> {
        let mut decoder = Decoder { data: bytes, cursor: 0 };
        let value = decoder.decode(self)?;
        if decoder.cursor != bytes.len() {
            return Err(self.mismatch(format!(
                "{} trailing bytes",
                bytes.len() - decoder.cursor
            )));
        }
        Ok(value)
    }

    fn mismatch(&self, reason: impl Into<String>) -> RelayerError {
        RelayerError::serialization(self.type_name(), reason)
    }

    fn unexpected(&self, value: &ArgValue) -> RelayerError {
        self.mismatch(format!("unexpected {}", value.kind()))
    }

    fn width(&self) -> Option<usize> {
        match self {
            Encoder::U8 => Some(1),
            Encoder::U16 => Some(2),
            Encoder::U32 => Some(4),
            Encoder::U64 => Some(8),
            Encoder::U128 => Some(16),
            _ => None,
        }
    }

    fn encode_into(&self, value: &ArgValue, out: &mut Vec<u8>) -> Result<()> {
        match value {
            ArgValue::Encoded(bytes) => {
                out.extend_from_slice(bytes);
                return Ok(());
            }
            ArgValue::Argument(_) => {
                return Err(self.mismatch("a PTB argument cannot be nested in a pure value"))
            }
            _ => {}
        }

        match self {
            Encoder::Bool => match value {
                ArgValue::Bool(b) => out.push(*b as u8),
                ArgValue::String(s) if s == "true" || s == "false" => out.push((s == "true") as u8),
                other => return Err(self.unexpected(other)),
            },
            Encoder::U8 | Encoder::U16 | Encoder::U32 | Encoder::U64 | Encoder::U128 => {
                let width = self.width().unwrap_or(16);
                if let ArgValue::Bytes(bytes) = value {
                    if bytes.len() != width {
                        return Err(self.mismatch(format!(
                            "expected {} little-endian bytes, got {}",
                            width,
                            bytes.len()
                        )));
                    }
                    out.extend_from_slice(bytes);
                    return Ok(());
                }
                let n = match value {
                    ArgValue::Number(n) => *n,
                    ArgValue::String(s) => parse_u128(s).ok_or_else(|| {
                        self.mismatch(format!("'{}' is not a decimal or hex number", s))
                    })?,
                    other => return Err(self.unexpected(other)),
                };
                if width < 16 && n >> (width * 8) != 0 {
                    return Err(self.mismatch(format!("{} out of range", n)));
                }
                out.extend_from_slice(&n.to_le_bytes()[..width]);
            }
            Encoder::U256 => {
                let n = match value {
                    ArgValue::Bytes(bytes) if bytes.len() == 32 => {
                        out.extend_from_slice(bytes);
                        return Ok(());
                    }
                    ArgValue::Number(n) => U256::from(*n),
                    ArgValue::String(s) => parse_u256(s).ok_or_else(|| {
                        self.mismatch(format!("'{}' is not a decimal or hex number", s))
                    })?,
                    other => return Err(self.unexpected(other)),
                };
                out.extend_from_slice(&n.to_le_bytes());
            }
            Encoder::Address => match value {
                ArgValue::Bytes(bytes) if bytes.len() == AccountAddress::LENGTH => {
                    out.extend_from_slice(bytes)
                }
                ArgValue::Bytes(bytes) => {
                    return Err(self.mismatch(format!("expected 32 bytes, got {}", bytes.len())))
                }
                ArgValue::String(s) => {
                    let addr = parse_address(s)
                        .ok_or_else(|| self.mismatch(format!("'{}' is not a hex address", s)))?;
                    out.extend_from_slice(addr.as_ref());
                }
                other => return Err(self.unexpected(other)),
            },
            Encoder::String => match value {
                ArgValue::String(s) => write_bytes(self, out, s.as_bytes())?,
                ArgValue::Bytes(bytes) => {
                    std::str::from_utf8(bytes)
                        .map_err(|e| self.mismatch(format!("invalid UTF-8: {}", e)))?;
                    write_bytes(self, out, bytes)?
                }
                other => return Err(self.unexpected(other)),
            },
            Encoder::Bytes => match value {
                ArgValue::Bytes(bytes) => write_bytes(self, out, bytes)?,
                ArgValue::String(s) => {
                    let bytes = parse_hex_bytes(s)
                        .map_err(|e| self.mismatch(format!("invalid hex '{}': {}", s, e)))?;
                    write_bytes(self, out, &bytes)?
                }
                ArgValue::Array(items) => {
                    write_len(self, out, items.len())?;
                    for item in items {
                        Encoder::U8.encode_into(item, out)?;
                    }
                }
                other => return Err(self.unexpected(other)),
            },
            Encoder::Vector(inner) => match value {
                ArgValue::Array(items) => {
                    write_len(self, out, items.len())?;
                    for item in items {
                        inner.encode_into(item, out)?;
                    }
                }
                other => return Err(self.unexpected(other)),
            },
            Encoder::Struct(layout) => match value {
                ArgValue::Struct(fields) => {
                    if fields.len() != layout.fields.len() {
                        return Err(self.mismatch(format!(
                            "expected {} fields, got {}",
                            layout.fields.len(),
                            fields.len()
                        )));
                    }
                    for (name, encoder) in &layout.fields {
                        let field = fields
                            .iter()
                            .find(|(n, _)| n == name)
                            .map(|(_, v)| v)
                            .ok_or_else(|| self.mismatch(format!("missing field '{}'", name)))?;
                        encoder.encode_into(field, out)?;
                    }
                }
                ArgValue::Array(items) if items.len() == layout.fields.len() => {
                    for ((_, encoder), item) in layout.fields.iter().zip(items) {
                        encoder.encode_into(item, out)?;
                    }
                }
                other => return Err(self.unexpected(other)),
            },
        }
        Ok(())
    }
}

/// Decimal, or hex with a `0x` prefix.
fn parse_u128(s: &str) -> Option<u128> {
    let s = s.trim();
    match s.strip_prefix("0x") {
        Some(hex) => u128::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn parse_u256(s: &str) -> Option<U256> {
    let s = s.trim();
    match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_str_radix(s, 10).ok(),
    }
}

fn write_bytes(encoder: &Encoder, out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    write_len(encoder, out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_len(encoder: &Encoder, out: &mut Vec<u8>, len: usize) -> Result<()> {
    if len > bcs::MAX_SEQUENCE_LENGTH {
        return Err(encoder.mismatch(format!(
            "length {} exceeds {}",
            len,
            bcs::MAX_SEQUENCE_LENGTH
        )));
    }
    write_uleb128(out, len as u64);
    Ok(())
}

fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}

struct Decoder<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Decoder<'a> {
    fn read_bytes(&mut self, encoder: &Encoder, n: usize) -> Result<&'a [u8]> {
        if self.cursor + n > self.data.len() {
            return Err(encoder.mismatch(format!(
                "unexpected end of input: need {} bytes at offset {}, have {}",
                n,
                self.cursor,
                self.data.len()
            )));
        }
        let slice = &self.data[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(slice)
    }

    /// Canonical BCS length: no redundant zero groups, at most
    /// [`bcs::MAX_SEQUENCE_LENGTH`].
    fn read_uleb128(&mut self, encoder: &Encoder) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.read_bytes(encoder, 1)?[0];
            let digit = (byte & 0x7f) as u64;
            result |= digit << shift;
            if result > bcs::MAX_SEQUENCE_LENGTH as u64 {
                return Err(encoder.mismatch(format!(
                    "length exceeds {}",
                    bcs::MAX_SEQUENCE_LENGTH
                )));
            }
            if byte & 0x80 == 0 {
                if shift > 0 && digit == 0 {
                    return Err(encoder.mismatch("non-canonical ULEB128 length"));
                }
                return Ok(result);
            }
            shift += 7;
            if shift > 28 {
                return Err(encoder.mismatch("ULEB128 length too long"));
            }
        }
    }

    fn read_len(&mut self, encoder: &Encoder) -> Result<usize> {
        let len = self.read_uleb128(encoder)? as usize;
        if len > self.data.len() - self.cursor {
            return Err(encoder.mismatch(format!("length {} exceeds remaining input", len)));
        }
        Ok(len)
    }

    fn decode(&mut self, encoder: &Encoder) -> Result<ArgValue> {
        Ok(match encoder {
            Encoder::Bool => match self.read_bytes(encoder, 1)?[0] {
                0 => ArgValue::Bool(false),
                1 => ArgValue::Bool(true),
                b => return Err(encoder.mismatch(format!("invalid bool byte {}", b))),
            },
            Encoder::U8 | Encoder::U16 | Encoder::U32 | Encoder::U64 | Encoder::U128 => {
                let width = encoder.width().unwrap_or(16);
                let mut buf = [0u8; 16];
                buf[..width].copy_from_slice(self.read_bytes(encoder, width)?);
                ArgValue::Number(u128::from_le_bytes(buf))
            }
            Encoder::U256 => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(self.read_bytes(encoder, 32)?);
                let n = U256::from_le_bytes(&buf);
                match u128::try_from(n) {
                    Ok(small) => ArgValue::Number(small),
                    Err(_) => ArgValue::String(n.to_string()),
                }
            }
            Encoder::Address => {
                let mut buf = [0u8; AccountAddress::LENGTH];
                buf.copy_from_slice(self.read_bytes(encoder, AccountAddress::LENGTH)?);
                ArgValue::String(address_to_string(&AccountAddress::new(buf)))
            }
            Encoder::String => {
                let len = self.read_len(encoder)?;
                let bytes = self.read_bytes(encoder, len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| encoder.mismatch(format!("invalid UTF-8: {}", e)))?;
                ArgValue::String(text.to_string())
            }
            Encoder::Bytes => {
                let len = self.read_len(encoder)?;
                ArgValue::Bytes(self.read_bytes(encoder, len)?.to_vec())
            }
            Encoder::Vector(inner) => {
                let len = self.read_len(encoder)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.decode(inner)?);
                }
                ArgValue::Array(items)
            }
            Encoder::Struct(layout) => {
                let mut fields = Vec::with_capacity(layout.fields.len());
                for (name, field_encoder) in &layout.fields {
                    fields.push((name.clone(), self.decode(field_encoder)?));
                }
                ArgValue::Struct(fields)
            }
        })
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Builds encoders for descriptors, one registry round-trip per distinct struct.
///
/// Only fully resolved struct encoders are memoized, so a failed resolution
/// is retried on the next call.
pub struct TypeResolver {
    ledger: Arc<dyn LedgerClient>,
    structs: RwLock<HashMap<String, Arc<StructEncoder>>>,
}

impl TypeResolver {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            structs: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `descriptor`, substituting type parameters from `context`.
    pub async fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        context: &[TypeDescriptor],
    ) -> Result<Encoder> {
        let mut visiting = Vec::new();
        self.resolve_inner(descriptor, context, &mut visiting).await
    }

    pub fn cached_structs(&self) -> usize {
        self.structs.read().len()
    }

    fn resolve_inner<'a>(
        &'a self,
        descriptor: &'a TypeDescriptor,
        context: &'a [TypeDescriptor],
        visiting: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<Encoder>> {
        Box::pin(async move {
            match descriptor {
                TypeDescriptor::Primitive(p) => match p {
                    Primitive::Bool => Ok(Encoder::Bool),
                    Primitive::U8 => Ok(Encoder::U8),
                    Primitive::U16 => Ok(Encoder::U16),
                    Primitive::U32 => Ok(Encoder::U32),
                    Primitive::U64 => Ok(Encoder::U64),
                    Primitive::U128 => Ok(Encoder::U128),
                    Primitive::U256 => Ok(Encoder::U256),
                    Primitive::Address => Ok(Encoder::Address),
                    Primitive::Signer => Err(RelayerError::unsupported(
                        "signer",
                        "signer values cannot be passed as arguments",
                    )),
                },
                TypeDescriptor::Vector(inner) => {
                    match self.resolve_inner(inner, context, visiting).await? {
                        Encoder::U8 => Ok(Encoder::Bytes),
                        element => Ok(Encoder::Vector(Box::new(element))),
                    }
                }
                TypeDescriptor::Reference(inner) | TypeDescriptor::MutableReference(inner) => {
                    self.resolve_inner(inner, context, visiting).await
                }
                TypeDescriptor::TypeParameter(idx) => {
                    let concrete = context.get(*idx as usize).ok_or_else(|| {
                        RelayerError::unsupported(
                            descriptor.to_string(),
                            format!("type parameter out of range ({} in context)", context.len()),
                        )
                    })?;
                    self.resolve_inner(concrete, &[], visiting).await
                }
                TypeDescriptor::Struct { .. } if descriptor.is_string() => Ok(Encoder::String),
                TypeDescriptor::Struct { .. } => {
                    let concrete = descriptor.substitute(context)?;
                    self.resolve_struct(&concrete, visiting).await
                }
            }
        })
    }

    async fn resolve_struct(
        &self,
        concrete: &TypeDescriptor,
        visiting: &mut Vec<String>,
    ) -> Result<Encoder> {
        let TypeDescriptor::Struct {
            address,
            module,
            name,
            type_arguments,
        } = concrete
        else {
            return Err(RelayerError::unsupported(concrete.to_string(), "not a struct"));
        };

        let key = concrete.to_string();
        let cached = self.structs.read().get(&key).cloned();
        if let Some(cached) = cached {
            return Ok(Encoder::Struct(cached));
        }
        if visiting.contains(&key) {
            return Err(RelayerError::unsupported(key, "recursive struct"));
        }

        debug!(struct_type = %key, "fetching struct schema");
        let schema = self.ledger.struct_schema(*address, module, name).await?;
        if schema.type_parameter_count != type_arguments.len() {
            return Err(RelayerError::unsupported(
                key,
                format!(
                    "expects {} type arguments, got {}",
                    schema.type_parameter_count,
                    type_arguments.len()
                ),
            ));
        }

        visiting.push(key.clone());
        let mut fields = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let encoder = self
                .resolve_inner(&field.ty, type_arguments, visiting)
                .await;
            match encoder {
                Ok(encoder) => fields.push((field.name.clone(), encoder)),
                Err(e) => {
                    visiting.pop();
                    return Err(e);
                }
            }
        }
        visiting.pop();

        let layout = Arc::new(StructEncoder {
            type_name: key.clone(),
            fields,
        });
        self.structs.write().insert(key, layout.clone());
        Ok(Encoder::Struct(layout))
    }
}
