//! Call construction against scripted signatures: argument classification,
//! arity, struct encoding and error locations.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use move_core_types::account_address::AccountAddress;
use sui_relayer_core::{
    ArgValue, Argument, CallArg, CallBuilder, Command, ErrorCode, FieldDescriptor, ObjectCache,
    ObjectInput, PTBBuilder, Primitive, RelayerError, StructSchema, Target, TypeDescriptor,
    TypeResolver,
};

fn builder_for(ledger: MockLedger) -> (Arc<MockLedger>, CallBuilder) {
    let ledger = Arc::new(ledger);
    let builder = CallBuilder::new(ledger.clone(), Arc::new(ObjectCache::new()));
    (ledger, builder)
}

fn parse(target: &str) -> Target {
    target.parse().unwrap()
}

#[tokio::test]
async fn test_pure_arguments_become_pure_inputs() {
    let name = target(APP_PACKAGE, "app", "transfer");
    let ledger = MockLedger::new(SENDER).with_signature(
        &name,
        signature(
            vec![
                prim(Primitive::Address),
                prim(Primitive::U64),
                TypeDescriptor::vector(prim(Primitive::U8)),
            ],
            vec![],
        ),
    );
    let (_, builder) = builder_for(ledger);

    let mut tx = PTBBuilder::new();
    let result = builder
        .build(
            &mut tx,
            &parse(&name),
            vec!["0xabc".into(), 42u64.into(), "0x1234".into()],
            &[],
        )
        .await
        .unwrap();
    assert_eq!(result, Argument::Result(0));

    let tx = tx.finish();
    let mut address = [0u8; 32];
    address[30] = 0x0a;
    address[31] = 0xbc;
    assert_eq!(
        tx.inputs,
        vec![
            CallArg::Pure(address.to_vec()),
            CallArg::Pure(42u64.to_le_bytes().to_vec()),
            CallArg::Pure(vec![2, 0x12, 0x34]),
        ]
    );
    let Command::MoveCall(call) = &tx.commands[0] else {
        panic!("expected a move call");
    };
    assert_eq!(
        call.arguments,
        vec![Argument::Input(0), Argument::Input(1), Argument::Input(2)]
    );
    assert_eq!(call.function.as_str(), "transfer");
}

#[tokio::test]
async fn test_object_ids_become_object_inputs() {
    let (_, builder) = builder_for(deployment());
    let mut tx = PTBBuilder::new();
    builder
        .build(
            &mut tx,
            &parse(&target(APP_PACKAGE, "app", "prepare")),
            vec![APP_SINGLETON.into(), vec![1u8, 2, 3].into()],
            &[],
        )
        .await
        .unwrap();
    builder
        .build(
            &mut tx,
            &parse(&target(APP_PACKAGE, "app", "touch")),
            vec![ArgValue::String(APP_SINGLETON.to_hex_literal())],
            &[],
        )
        .await
        .unwrap();

    let tx = tx.finish();
    // One input for both calls, upgraded to mutable by `touch`.
    assert_eq!(tx.inputs.len(), 2);
    assert_eq!(
        tx.inputs[0],
        CallArg::Object(ObjectInput::Bare {
            id: APP_SINGLETON,
            mutable: true,
        })
    );
    assert_eq!(tx.inputs[1], CallArg::Pure(vec![3, 1, 2, 3]));
}

#[tokio::test]
async fn test_cached_objects_use_known_reference() {
    let ledger = Arc::new(deployment());
    let cache = Arc::new(ObjectCache::new());
    cache.update(&[singleton_mutated(7)]);
    let builder = CallBuilder::new(ledger, cache);

    let mut tx = PTBBuilder::new();
    builder
        .build(
            &mut tx,
            &parse(&target(APP_PACKAGE, "app", "get_final_transaction")),
            vec![APP_SINGLETON.into()],
            &[],
        )
        .await
        .unwrap();

    match &tx.finish().inputs[0] {
        CallArg::Object(ObjectInput::Known { entry, mutable }) => {
            assert_eq!(entry.version, 7);
            assert_eq!(entry.digest, "digest-7");
            assert!(!mutable);
        }
        other => panic!("expected a cached object input, got {:?}", other),
    }
}

#[tokio::test]
async fn test_object_vector_uses_make_move_vec() {
    let name = target(APP_PACKAGE, "app", "merge");
    let coin = TypeDescriptor::structure(AccountAddress::TWO, "coin", "Coin");
    let ledger = MockLedger::new(SENDER)
        .with_signature(&name, signature(vec![TypeDescriptor::vector(coin)], vec![]));
    let (_, builder) = builder_for(ledger);

    let first = AccountAddress::new([0x01; 32]);
    let second = AccountAddress::new([0x02; 32]);
    let mut tx = PTBBuilder::new();
    builder
        .build(
            &mut tx,
            &parse(&name),
            vec![ArgValue::Array(vec![first.into(), second.into()])],
            &[],
        )
        .await
        .unwrap();

    let tx = tx.finish();
    assert_eq!(tx.inputs.len(), 2);
    assert_eq!(tx.commands.len(), 2);
    match &tx.commands[0] {
        Command::MakeMoveVec(Some(_), elements) => {
            assert_eq!(elements, &vec![Argument::Input(0), Argument::Input(1)]);
        }
        other => panic!("expected MakeMoveVec, got {:?}", other),
    }
    let Command::MoveCall(call) = &tx.commands[1] else {
        panic!("expected a move call");
    };
    assert_eq!(call.arguments, vec![Argument::Result(0)]);
}

#[tokio::test]
async fn test_trailing_tx_context_is_not_counted() {
    let (_, builder) = builder_for(deployment());
    let receive = parse(&target(APP_PACKAGE, "app", "receive"));

    let mut tx = PTBBuilder::new();
    builder
        .build(
            &mut tx,
            &receive,
            vec![APP_SINGLETON.into(), ArgValue::Argument(Argument::Result(0))],
            &[],
        )
        .await
        .unwrap();

    let err = builder
        .build(
            &mut tx,
            &receive,
            vec![
                APP_SINGLETON.into(),
                ArgValue::Argument(Argument::Result(0)),
                ArgValue::Bytes(vec![]),
            ],
            &[],
        )
        .await
        .unwrap_err();
    match &err {
        RelayerError::Arity {
            expected,
            declared,
            actual,
            ..
        } => {
            assert_eq!((*expected, *declared, *actual), (2, 3, 3));
        }
        other => panic!("expected an arity error, got {:?}", other),
    }
    assert!(err.is_input_error());
    assert_code(&err, "ARITY");
}

#[tokio::test]
async fn test_type_argument_count_is_checked() {
    let name = target(APP_PACKAGE, "app", "generic");
    let mut sig = signature(vec![TypeDescriptor::TypeParameter(0)], vec![]);
    sig.type_parameter_count = 1;
    let ledger = MockLedger::new(SENDER).with_signature(&name, sig);
    let (_, builder) = builder_for(ledger);

    let mut tx = PTBBuilder::new();
    let err = builder
        .build(&mut tx, &parse(&name), vec![APP_SINGLETON.into()], &[])
        .await
        .unwrap_err();
    assert_code(&err, "SERIALIZATION");

    let ok = builder
        .build(
            &mut tx,
            &parse(&name),
            vec![APP_SINGLETON.into()],
            &["0x2::sui::SUI".to_string()],
        )
        .await;
    assert!(ok.is_ok(), "{:?}", ok);
    let tx = tx.finish();
    let Command::MoveCall(call) = &tx.commands[0] else {
        panic!("expected a move call");
    };
    assert_eq!(call.type_arguments.len(), 1);
}

#[tokio::test]
async fn test_struct_values_encoded_by_field_layout() {
    let config = TypeDescriptor::structure(APP_PACKAGE, "app", "Config");
    let ledger = Arc::new(MockLedger::new(SENDER).with_schema(
        APP_PACKAGE,
        "app",
        "Config",
        StructSchema {
            type_parameter_count: 0,
            fields: vec![
                FieldDescriptor {
                    name: "amount".into(),
                    ty: prim(Primitive::U64),
                },
                FieldDescriptor {
                    name: "memo".into(),
                    ty: ascii_string(),
                },
            ],
        },
    ));
    let resolver = TypeResolver::new(ledger.clone());

    let by_name = ArgValue::Struct(vec![
        ("memo".into(), "hi".into()),
        ("amount".into(), 5u64.into()),
    ]);
    let positional = ArgValue::Array(vec![5u64.into(), "hi".into()]);

    let mut expected = 5u64.to_le_bytes().to_vec();
    expected.extend_from_slice(&[2, b'h', b'i']);
    for value in [by_name, positional] {
        let encoder = resolver.resolve(&config, &[]).await.unwrap();
        assert_eq!(encoder.encode(&value).unwrap(), expected);
    }
    assert_eq!(ledger.schema_lookups.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cached_structs(), 1);

    let nested = TypeDescriptor::vector(config);
    let encoder = resolver.resolve(&nested, &[]).await.unwrap();
    let bytes = encoder
        .encode(&ArgValue::Array(vec![ArgValue::Array(vec![
            1u64.into(),
            "".into(),
        ])]))
        .unwrap();
    assert_eq!(bytes, vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_recursive_struct_is_unsupported() {
    let node = TypeDescriptor::structure(APP_PACKAGE, "app", "Node");
    let edge = TypeDescriptor::structure(APP_PACKAGE, "app", "Edge");
    let ledger = Arc::new(
        MockLedger::new(SENDER)
            .with_schema(
                APP_PACKAGE,
                "app",
                "Node",
                StructSchema {
                    type_parameter_count: 0,
                    fields: vec![
                        FieldDescriptor {
                            name: "id".into(),
                            ty: prim(Primitive::U64),
                        },
                        FieldDescriptor {
                            name: "edges".into(),
                            ty: TypeDescriptor::vector(edge.clone()),
                        },
                    ],
                },
            )
            .with_schema(
                APP_PACKAGE,
                "app",
                "Edge",
                StructSchema {
                    type_parameter_count: 0,
                    fields: vec![FieldDescriptor {
                        name: "to".into(),
                        ty: node.clone(),
                    }],
                },
            ),
    );
    let resolver = TypeResolver::new(ledger.clone());

    for descriptor in [&node, &edge] {
        let err = resolver.resolve(descriptor, &[]).await.unwrap_err();
        assert_code(&err, "UNSUPPORTED_TYPE");
        assert_error_contains(&err, "recursive struct", "cycle reason");
    }
    // Nothing half-resolved is memoized.
    assert_eq!(resolver.cached_structs(), 0);
}

#[tokio::test]
async fn test_signatures_are_memoized() {
    let (ledger, builder) = builder_for(deployment());
    let touch = parse(&target(APP_PACKAGE, "app", "touch"));
    let mut tx = PTBBuilder::new();
    for _ in 0..3 {
        builder
            .build(&mut tx, &touch, vec![APP_SINGLETON.into()], &[])
            .await
            .unwrap();
    }
    assert_eq!(ledger.signature_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_serialization_error_names_argument() {
    let (_, builder) = builder_for(deployment());
    let consume = target(APP_PACKAGE, "app", "consume");
    let mut tx = PTBBuilder::new();
    let err = builder
        .build(
            &mut tx,
            &parse(&consume),
            vec![
                APP_SINGLETON.into(),
                "not a number".into(),
                "0x1".into(),
                ArgValue::Argument(Argument::Result(0)),
            ],
            &[],
        )
        .await
        .unwrap_err();

    assert_code(&err, "SERIALIZATION");
    assert!(err.is_input_error());
    assert_error_contains(&err, "argument 1", "serialization error location");
    assert_error_contains(&err, "u64", "serialization error type");
}

#[tokio::test]
async fn test_unknown_function_is_ledger_error() {
    let (_, builder) = builder_for(MockLedger::new(SENDER));
    let mut tx = PTBBuilder::new();
    let err = builder
        .build(&mut tx, &parse("0x2::missing::call"), vec![], &[])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "LEDGER");
    assert!(!err.is_input_error());
    assert_error_contains(&err, "not found", "ledger error");
}
