//! Hex helpers and serde adapters.
//!
//! Binary fields are rendered as `0x`-prefixed hex in human-readable formats
//! (JSON) and left untouched in binary formats (BCS), so the same structs
//! serve both the wire format and CLI output.

use move_core_types::account_address::AccountAddress;

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex bytes, with or without `0x` prefix.
pub fn parse_hex_bytes(hex_str: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = hex_str.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits)
}

/// Parse an address, accepting short (`0x2`) and unprefixed forms.
pub fn parse_address(hex_str: &str) -> Option<AccountAddress> {
    let trimmed = hex_str.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        AccountAddress::from_hex_literal(&trimmed.to_lowercase()).ok()
    } else {
        AccountAddress::from_hex_literal(&format!("0x{}", trimmed.to_lowercase())).ok()
    }
}

/// Full-width `0x` address string.
pub fn address_to_string(addr: &AccountAddress) -> String {
    format!("0x{}", addr.to_hex())
}

/// `Vec<u8>` as hex in JSON, raw in BCS.
pub mod hex_bytes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            super::to_hex(bytes).serialize(s)
        } else {
            bytes.serialize(s)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        if d.is_human_readable() {
            let s = String::deserialize(d)?;
            super::parse_hex_bytes(&s).map_err(D::Error::custom)
        } else {
            Vec::<u8>::deserialize(d)
        }
    }
}

/// `Vec<Vec<u8>>` as a list of hex strings in JSON, raw in BCS.
pub mod hex_byte_vecs {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(vecs: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            let rendered: Vec<String> = vecs.iter().map(|b| super::to_hex(b)).collect();
            rendered.serialize(s)
        } else {
            vecs.serialize(s)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
        if d.is_human_readable() {
            let rendered = Vec::<String>::deserialize(d)?;
            rendered
                .iter()
                .map(|s| super::parse_hex_bytes(s).map_err(D::Error::custom))
                .collect()
        } else {
            Vec::<Vec<u8>>::deserialize(d)
        }
    }
}

/// `[u8; 32]` as hex in JSON, fixed 32 bytes in BCS.
pub mod hex_bytes32 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            super::to_hex(bytes).serialize(s)
        } else {
            bytes.serialize(s)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        if d.is_human_readable() {
            let s = String::deserialize(d)?;
            let bytes = super::parse_hex_bytes(&s).map_err(D::Error::custom)?;
            <[u8; 32]>::try_from(bytes.as_slice())
                .map_err(|_| D::Error::custom(format!("expected 32 bytes, got {}", bytes.len())))
        } else {
            <[u8; 32]>::deserialize(d)
        }
    }
}

/// `AccountAddress` as a full `0x` hex string in JSON (short forms accepted),
/// 32 raw bytes in BCS.
pub mod address_hex {
    use move_core_types::account_address::AccountAddress;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(addr: &AccountAddress, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            super::address_to_string(addr).serialize(s)
        } else {
            addr.serialize(s)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<AccountAddress, D::Error> {
        if d.is_human_readable() {
            let s = String::deserialize(d)?;
            super::parse_address(&s)
                .ok_or_else(|| D::Error::custom(format!("invalid address '{}'", s)))
        } else {
            AccountAddress::deserialize(d)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("0x1234").unwrap(), vec![0x12, 0x34]);
        assert_eq!(parse_hex_bytes("abcd").unwrap(), vec![0xab, 0xcd]);
        assert!(parse_hex_bytes("0x123").is_err());
    }

    #[test]
    fn test_parse_address_short_and_bare() {
        let two = parse_address("0x2").unwrap();
        assert_eq!(two.to_vec()[31], 2);
        let bare = parse_address(&"ab".repeat(32)).unwrap();
        assert_eq!(bare.to_vec(), vec![0xab; 32]);
        assert!(parse_address("0xzz").is_none());
    }

    #[test]
    fn test_address_to_string_is_full_width() {
        let s = address_to_string(&AccountAddress::ONE);
        assert_eq!(s.len(), 66);
        assert!(s.ends_with("01"));
    }
}
