//! A toy deployment: discovery registry, gateway and one destination app.

use move_core_types::account_address::AccountAddress;
use sui_relayer_core::{
    ExecutionReceipt, ExecutionStatus, FunctionSignature, ObjectChange, ObjectChangeKind, Owner,
    Primitive, TypeDescriptor,
};
use sui_relayer_types::{
    ArgumentSource, CallSequence, CallUnit, DiscoveryInfo, Function, GatewayInfo, MessageInfo,
};

use super::mocks::MockLedger;

pub const SENDER: AccountAddress = AccountAddress::new([0x5e; 32]);
pub const DISCOVERY_PACKAGE: AccountAddress = AccountAddress::new([0xd1; 32]);
pub const DISCOVERY_OBJECT: AccountAddress = AccountAddress::new([0xd2; 32]);
pub const GATEWAY_PACKAGE: AccountAddress = AccountAddress::new([0x6a; 32]);
pub const GATEWAY_OBJECT: AccountAddress = AccountAddress::new([0x6b; 32]);
pub const APP_PACKAGE: AccountAddress = AccountAddress::new([0xa1; 32]);
pub const APP_SINGLETON: AccountAddress = AccountAddress::new([0xa2; 32]);
pub const DESTINATION: AccountAddress = AccountAddress::new([0xee; 32]);

pub const PAYLOAD: [u8; 2] = [0xde, 0xad];

pub fn target(package: AccountAddress, module: &str, name: &str) -> String {
    format!("{}::{}::{}", package.to_hex_literal(), module, name)
}

pub fn prim(p: Primitive) -> TypeDescriptor {
    TypeDescriptor::Primitive(p)
}

pub fn ascii_string() -> TypeDescriptor {
    TypeDescriptor::structure(AccountAddress::ONE, "ascii", "String")
}

pub fn tx_context() -> TypeDescriptor {
    TypeDescriptor::mutable_reference(TypeDescriptor::structure(
        AccountAddress::TWO,
        "tx_context",
        "TxContext",
    ))
}

fn transaction_type() -> TypeDescriptor {
    TypeDescriptor::structure(DISCOVERY_PACKAGE, "transaction", "Transaction")
}

pub fn approved_message() -> TypeDescriptor {
    TypeDescriptor::structure(GATEWAY_PACKAGE, "channel", "ApprovedMessage")
}

pub fn singleton() -> TypeDescriptor {
    TypeDescriptor::structure(APP_PACKAGE, "app", "Singleton")
}

pub fn signature(parameters: Vec<TypeDescriptor>, returns: Vec<TypeDescriptor>) -> FunctionSignature {
    FunctionSignature {
        type_parameter_count: 0,
        parameters,
        returns,
    }
}

/// Ledger with the registry, gateway and app functions registered.
pub fn deployment() -> MockLedger {
    MockLedger::new(SENDER)
        .with_signature(
            &target(DISCOVERY_PACKAGE, "discovery", "get_transaction"),
            signature(
                vec![
                    TypeDescriptor::reference(TypeDescriptor::structure(
                        DISCOVERY_PACKAGE,
                        "discovery",
                        "RelayerDiscovery",
                    )),
                    prim(Primitive::Address),
                ],
                vec![transaction_type()],
            ),
        )
        .with_signature(
            &target(GATEWAY_PACKAGE, "gateway", "take_approved_message"),
            signature(
                vec![
                    TypeDescriptor::mutable_reference(TypeDescriptor::structure(
                        GATEWAY_PACKAGE,
                        "gateway",
                        "Gateway",
                    )),
                    ascii_string(),
                    ascii_string(),
                    ascii_string(),
                    prim(Primitive::Address),
                    TypeDescriptor::vector(prim(Primitive::U8)),
                ],
                vec![approved_message()],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "get_final_transaction"),
            signature(
                vec![TypeDescriptor::reference(singleton())],
                vec![transaction_type()],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "receive"),
            signature(
                vec![
                    TypeDescriptor::mutable_reference(singleton()),
                    approved_message(),
                    tx_context(),
                ],
                vec![],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "prepare"),
            signature(
                vec![
                    TypeDescriptor::reference(singleton()),
                    TypeDescriptor::vector(prim(Primitive::U8)),
                ],
                vec![prim(Primitive::U64), prim(Primitive::Address)],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "finalize"),
            signature(
                vec![
                    TypeDescriptor::reference(singleton()),
                    prim(Primitive::U64),
                    prim(Primitive::Address),
                ],
                vec![transaction_type()],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "consume"),
            signature(
                vec![
                    TypeDescriptor::mutable_reference(singleton()),
                    prim(Primitive::U64),
                    prim(Primitive::Address),
                    approved_message(),
                ],
                vec![],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "receive_twice"),
            signature(
                vec![
                    TypeDescriptor::mutable_reference(singleton()),
                    approved_message(),
                    approved_message(),
                ],
                vec![],
            ),
        )
        .with_signature(
            &target(APP_PACKAGE, "app", "touch"),
            signature(vec![TypeDescriptor::mutable_reference(singleton())], vec![]),
        )
}

pub fn discovery_info() -> DiscoveryInfo {
    DiscoveryInfo {
        package_id: DISCOVERY_PACKAGE,
        discovery: DISCOVERY_OBJECT,
    }
}

pub fn gateway_info() -> GatewayInfo {
    GatewayInfo {
        package_id: GATEWAY_PACKAGE,
        gateway: GATEWAY_OBJECT,
    }
}

pub fn message() -> MessageInfo {
    MessageInfo {
        source_chain: "Ethereum".into(),
        message_id: "0xabc-1".into(),
        source_address: "0x4F4495243837681061C4743b74B3eEdf548D56A5".into(),
        destination_id: DESTINATION,
        payload_hash: [0x11; 32],
        payload: PAYLOAD.to_vec(),
    }
}

// -----------------------------------------------------------------------------
// Call sequences
// -----------------------------------------------------------------------------

pub fn object_arg(id: AccountAddress) -> Vec<u8> {
    ArgumentSource::Object(id).encode()
}

pub fn pure_arg(bytes: &[u8]) -> Vec<u8> {
    ArgumentSource::Pure(bytes.to_vec()).encode()
}

pub fn capability_arg() -> Vec<u8> {
    ArgumentSource::Capability.encode()
}

pub fn payload_arg() -> Vec<u8> {
    ArgumentSource::Payload.encode()
}

pub fn prior_arg(call: u8, index: u8) -> Vec<u8> {
    ArgumentSource::PriorResult { call, index }.encode()
}

pub fn app_call(name: &str, arguments: Vec<Vec<u8>>) -> CallUnit {
    CallUnit {
        function: Function::new(APP_PACKAGE, "app", name),
        arguments,
        type_arguments: vec![],
    }
}

pub fn sequence(is_final: bool, calls: Vec<CallUnit>) -> CallSequence {
    CallSequence { is_final, calls }
}

// -----------------------------------------------------------------------------
// Receipts
// -----------------------------------------------------------------------------

pub fn singleton_mutated(version: u64) -> ObjectChange {
    ObjectChange {
        kind: ObjectChangeKind::Mutated,
        object_id: APP_SINGLETON,
        version,
        digest: Some(format!("digest-{version}")),
        object_type: Some(singleton().to_string()),
        owner: Some(Owner::Shared {
            initial_shared_version: 3,
        }),
    }
}

pub fn receipt(digest: &str, confirmed: bool, changes: Option<Vec<ObjectChange>>) -> ExecutionReceipt {
    ExecutionReceipt {
        digest: digest.to_string(),
        status: ExecutionStatus::Success,
        confirmed_local_execution: confirmed,
        effects: None,
        object_changes: changes,
        events: vec![],
    }
}
