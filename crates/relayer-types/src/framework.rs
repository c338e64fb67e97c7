//! Sui framework addresses and the framework types the relayer recognizes.
//!
//! # Example
//!
//! ```
//! use sui_relayer_types::framework::{MOVE_STDLIB, SUI_FRAMEWORK};
//!
//! assert_eq!(MOVE_STDLIB.to_hex_literal(), "0x1");
//! assert_eq!(SUI_FRAMEWORK.to_hex_literal(), "0x2");
//! ```

use move_core_types::account_address::AccountAddress;

// ============================================================================
// Framework Package Addresses
// ============================================================================

/// Move standard library address (0x1)
pub const MOVE_STDLIB: AccountAddress = AccountAddress::ONE;

/// Sui framework address (0x2)
pub const SUI_FRAMEWORK: AccountAddress = AccountAddress::TWO;

// ============================================================================
// Module and Type Names
// ============================================================================

/// `0x2::tx_context`
pub const TX_CONTEXT_MODULE: &str = "tx_context";
/// `0x2::tx_context::TxContext`
pub const TX_CONTEXT_STRUCT: &str = "TxContext";
/// `0x1::string`
pub const UTF8_STRING_MODULE: &str = "string";
/// `0x1::ascii`
pub const ASCII_STRING_MODULE: &str = "ascii";
/// Struct name shared by both std string types.
pub const STRING_STRUCT: &str = "String";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_addresses() {
        assert_eq!(MOVE_STDLIB, AccountAddress::from_hex_literal("0x1").unwrap());
        assert_eq!(SUI_FRAMEWORK, AccountAddress::from_hex_literal("0x2").unwrap());
    }
}
