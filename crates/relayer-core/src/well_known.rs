//! Well-known Sui framework identifiers and type predicates.
//!
//! # Usage
//!
//! ```
//! use sui_relayer_core::well_known::{ident, is_string_struct};
//! use sui_relayer_types::framework::MOVE_STDLIB;
//!
//! assert_eq!(ident::GET_TRANSACTION.as_str(), "get_transaction");
//! assert!(is_string_struct(&MOVE_STDLIB, "ascii", "String"));
//! ```

use move_core_types::account_address::AccountAddress;

pub use sui_relayer_types::framework::{
    ASCII_STRING_MODULE, MOVE_STDLIB, STRING_STRUCT, SUI_FRAMEWORK, TX_CONTEXT_MODULE,
    TX_CONTEXT_STRUCT, UTF8_STRING_MODULE,
};

/// Identifiers validated at compile time.
pub mod ident {
    use move_core_types::ident_str;
    use move_core_types::identifier::IdentStr;

    pub const DISCOVERY: &IdentStr = ident_str!("discovery");
    pub const GET_TRANSACTION: &IdentStr = ident_str!("get_transaction");
    pub const GATEWAY: &IdentStr = ident_str!("gateway");
    pub const TAKE_APPROVED_MESSAGE: &IdentStr = ident_str!("take_approved_message");
}

/// `0x1::string::String` or `0x1::ascii::String`.
pub fn is_string_struct(address: &AccountAddress, module: &str, name: &str) -> bool {
    *address == MOVE_STDLIB
        && (module == UTF8_STRING_MODULE || module == ASCII_STRING_MODULE)
        && name == STRING_STRUCT
}

/// `0x2::tx_context::TxContext`.
pub fn is_tx_context_struct(address: &AccountAddress, module: &str, name: &str) -> bool {
    *address == SUI_FRAMEWORK && module == TX_CONTEXT_MODULE && name == TX_CONTEXT_STRUCT
}
