//! [`LedgerClient`] backed by a Sui full node over JSON-RPC.
//!
//! Normalized modules are fetched once per package. Object inputs without a
//! cached reference are resolved at conversion time: shared objects by their
//! initial shared version, everything else by its current object ref.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use fastcrypto::traits::EncodeDecodeBase64;
use move_core_types::account_address::AccountAddress;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use sui_json_rpc_types::{
    Coin, ObjectChange as SuiObjectChange, SuiExecutionStatus, SuiObjectDataOptions,
    SuiTransactionBlockEffectsAPI, SuiTransactionBlockResponse,
    SuiTransactionBlockResponseOptions,
};
use sui_relayer_core::{
    Argument, CallArg, Command, CommandOutputs, ExecutionReceipt, ExecutionStatus, FunctionSignature,
    LedgerClient, ObjectCacheEntry, ObjectChange, ObjectChangeKind, ObjectInput, Owner,
    ProgrammableTransaction, ReturnValue, SimulationResult, StructSchema, Target,
};
use sui_sdk::{SuiClient, SuiClientBuilder};
use sui_types::base_types::{ObjectDigest, ObjectID, SequenceNumber, SuiAddress};
use sui_types::crypto::SuiKeyPair;
use sui_types::digests::TransactionDigest;
use sui_types::object::Owner as SuiOwner;
use sui_types::quorum_driver_types::ExecuteTransactionRequestType;
use sui_types::transaction::{
    Argument as SuiArgument, CallArg as SuiCallArg, Command as SuiCommand, ObjectArg,
    ProgrammableMoveCall, ProgrammableTransaction as SuiProgrammableTransaction,
    SharedObjectMutability, Transaction, TransactionData, TransactionKind,
};
use sui_types::type_input::TypeInput;
use tracing::{debug, info};

/// Default gas budget in MIST (0.05 SUI).
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;

/// Number of sender coins inspected when picking a gas coin.
const GAS_COIN_PAGE: usize = 10;

/// Parse a base64 `flag || private key` string.
pub fn parse_private_key(encoded: &str) -> Result<SuiKeyPair> {
    SuiKeyPair::decode_base64(encoded.trim())
        .map_err(|e| anyhow!("invalid base64 private key: {}", e))
}

pub struct SuiLedger {
    client: SuiClient,
    sender: AccountAddress,
    keypair: Option<SuiKeyPair>,
    gas_budget: u64,
    /// Normalized modules per package, as JSON.
    packages: RwLock<HashMap<AccountAddress, Arc<JsonValue>>>,
}

impl SuiLedger {
    /// Connect to `rpc_url`. The sender is taken from `keypair` when present;
    /// without a key only simulation is possible.
    pub async fn connect(
        rpc_url: &str,
        keypair: Option<SuiKeyPair>,
        sender: Option<AccountAddress>,
        gas_budget: u64,
    ) -> Result<Self> {
        let key_address = keypair
            .as_ref()
            .map(|kp| sui_to_account(&SuiAddress::from(&kp.public())));
        let sender = match (key_address, sender) {
            (Some(from_key), Some(given)) if from_key != given => bail!(
                "sender {} does not match the private key address {}",
                given.to_hex_literal(),
                from_key.to_hex_literal()
            ),
            (Some(address), _) | (None, Some(address)) => address,
            (None, None) => bail!("either a private key or a sender address is required"),
        };

        let client = SuiClientBuilder::default()
            .build(rpc_url)
            .await
            .with_context(|| format!("connect rpc: {}", rpc_url))?;
        info!(rpc_url, sender = %sender.to_hex_literal(), "connected to Sui node");

        Ok(Self {
            client,
            sender,
            keypair,
            gas_budget,
            packages: RwLock::new(HashMap::new()),
        })
    }

    async fn package_modules(&self, package: AccountAddress) -> Result<Arc<JsonValue>> {
        let cached = self.packages.read().get(&package).cloned();
        if let Some(modules) = cached {
            return Ok(modules);
        }
        debug!(package = %package.to_hex_literal(), "fetching normalized modules");
        let modules = self
            .client
            .read_api()
            .get_normalized_move_modules_by_package(ObjectID::from(package))
            .await
            .with_context(|| format!("fetch normalized modules for {}", package.to_hex_literal()))?;
        let modules = Arc::new(
            serde_json::to_value(&modules).context("serialize normalized modules")?,
        );
        self.packages.write().insert(package, modules.clone());
        Ok(modules)
    }

    async fn module_entry(
        &self,
        package: AccountAddress,
        module: &str,
        section: &str,
        name: &str,
    ) -> Result<JsonValue> {
        let modules = self.package_modules(package).await?;
        let module_json = modules
            .get(module)
            .ok_or_else(|| anyhow!("module {}::{} not found", package.to_hex_literal(), module))?;
        module_json
            .get(section)
            .and_then(|entries| entries.get(name))
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "{}::{}::{} not found in {}",
                    package.to_hex_literal(),
                    module,
                    name,
                    section
                )
            })
    }

    async fn resolve_object(&self, id: AccountAddress, mutable: bool) -> Result<ObjectArg> {
        let object_id = ObjectID::from(id);
        let resp = self
            .client
            .read_api()
            .get_object_with_options(object_id, SuiObjectDataOptions::new().with_owner())
            .await
            .with_context(|| format!("get_object {}", object_id))?;
        let Some(data) = resp.data else {
            bail!("object not found: {}", object_id);
        };
        let object_ref = data.object_ref();
        let owner = data
            .owner
            .ok_or_else(|| anyhow!("object missing owner: {}", object_id))?;
        Ok(match owner {
            SuiOwner::Shared {
                initial_shared_version,
            } => shared_object(id, initial_shared_version, mutable),
            SuiOwner::ConsensusAddressOwner { start_version, .. } => {
                shared_object(id, start_version, mutable)
            }
            _ => ObjectArg::ImmOrOwnedObject(object_ref),
        })
    }

    async fn object_arg(&self, input: &ObjectInput) -> Result<ObjectArg> {
        match input {
            ObjectInput::Known { entry, mutable } => cached_object_arg(entry, *mutable),
            ObjectInput::Bare { id, mutable } => self.resolve_object(*id, *mutable).await,
        }
    }

    async fn to_sui_transaction(
        &self,
        tx: &ProgrammableTransaction,
    ) -> Result<SuiProgrammableTransaction> {
        let mut inputs = Vec::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            inputs.push(match input {
                CallArg::Pure(bytes) => SuiCallArg::Pure(bytes.clone()),
                CallArg::Object(object) => SuiCallArg::Object(self.object_arg(object).await?),
            });
        }
        Ok(SuiProgrammableTransaction {
            inputs,
            commands: tx.commands.iter().map(convert_command).collect(),
        })
    }

    /// First sender coin that is not already an input of `tx`.
    async fn pick_gas_coin(&self, tx: &ProgrammableTransaction) -> Result<Coin> {
        let used: HashSet<AccountAddress> = tx
            .inputs
            .iter()
            .filter_map(|input| match input {
                CallArg::Object(object) => Some(object.id()),
                CallArg::Pure(_) => None,
            })
            .collect();
        let page = self
            .client
            .coin_read_api()
            .get_coins(sui_address(self.sender), None, None, Some(GAS_COIN_PAGE))
            .await
            .context("get_coins")?;
        page.data
            .into_iter()
            .find(|coin| !used.contains(&AccountAddress::from(coin.coin_object_id)))
            .ok_or_else(|| {
                anyhow!(
                    "no Coin<SUI> gas coins found for sender: {}",
                    self.sender.to_hex_literal()
                )
            })
    }
}

fn response_options() -> SuiTransactionBlockResponseOptions {
    SuiTransactionBlockResponseOptions::new()
        .with_effects()
        .with_object_changes()
        .with_events()
}

#[async_trait::async_trait]
impl LedgerClient for SuiLedger {
    fn sender(&self) -> AccountAddress {
        self.sender
    }

    async fn function_signature(&self, target: &Target) -> Result<FunctionSignature> {
        let json = self
            .module_entry(
                target.package,
                target.module.as_str(),
                "exposedFunctions",
                target.function.as_str(),
            )
            .await?;
        FunctionSignature::from_normalized_json(&json)
            .with_context(|| format!("parse signature of {}", target))
    }

    async fn struct_schema(
        &self,
        address: AccountAddress,
        module: &str,
        name: &str,
    ) -> Result<StructSchema> {
        let json = self.module_entry(address, module, "structs", name).await?;
        StructSchema::from_normalized_json(&json).with_context(|| {
            format!("parse struct {}::{}::{}", address.to_hex_literal(), module, name)
        })
    }

    async fn simulate(
        &self,
        tx: &ProgrammableTransaction,
        sender: AccountAddress,
    ) -> Result<SimulationResult> {
        let pt = self.to_sui_transaction(tx).await?;
        let res = self
            .client
            .read_api()
            .dev_inspect_transaction_block(
                sui_address(sender),
                TransactionKind::ProgrammableTransaction(pt),
                None,
                None,
                None,
            )
            .await
            .context("dev_inspect_transaction_block")?;
        let json = serde_json::to_value(&res).context("serialize devInspect JSON")?;
        simulation_from_json(&json)
    }

    async fn submit(&self, tx: &ProgrammableTransaction) -> Result<ExecutionReceipt> {
        let keypair = self
            .keypair
            .as_ref()
            .ok_or_else(|| anyhow!("submitting a transaction requires a private key"))?;
        let pt = self.to_sui_transaction(tx).await?;
        let gas = self.pick_gas_coin(tx).await?;
        let gas_price = self
            .client
            .read_api()
            .get_reference_gas_price()
            .await
            .context("get_reference_gas_price")?;

        let data = TransactionData::new_programmable(
            sui_address(self.sender),
            vec![gas.object_ref()],
            pt,
            self.gas_budget,
            gas_price,
        );
        let signed = Transaction::from_data_and_signer(data, vec![keypair]);
        let response = self
            .client
            .quorum_driver_api()
            .execute_transaction_block(
                signed,
                response_options(),
                Some(ExecuteTransactionRequestType::WaitForLocalExecution),
            )
            .await
            .context("execute_transaction_block")?;
        info!(digest = %response.digest, "transaction submitted");
        receipt_from_response(response, false)
    }

    async fn confirm(&self, digest: &str) -> Result<ExecutionReceipt> {
        let parsed = TransactionDigest::from_str(digest)
            .map_err(|e| anyhow!("invalid transaction digest {}: {}", digest, e))?;
        let response = self
            .client
            .read_api()
            .get_transaction_with_options(parsed, response_options())
            .await
            .with_context(|| format!("get_transaction {}", digest))?;
        receipt_from_response(response, true)
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn sui_address(address: AccountAddress) -> SuiAddress {
    SuiAddress::from(ObjectID::from(address))
}

fn sui_to_account(address: &SuiAddress) -> AccountAddress {
    AccountAddress::new(address.to_inner())
}

fn shared_object(id: AccountAddress, initial_shared_version: SequenceNumber, mutable: bool) -> ObjectArg {
    ObjectArg::SharedObject {
        id: ObjectID::from(id),
        initial_shared_version,
        mutability: if mutable {
            SharedObjectMutability::Mutable
        } else {
            SharedObjectMutability::Immutable
        },
    }
}

fn cached_object_arg(entry: &ObjectCacheEntry, mutable: bool) -> Result<ObjectArg> {
    match &entry.owner {
        Some(Owner::Shared {
            initial_shared_version,
        }) => Ok(shared_object(
            entry.object_id,
            SequenceNumber::from_u64(*initial_shared_version),
            mutable,
        )),
        Some(Owner::ConsensusAddressOwner { start_version, .. }) => Ok(shared_object(
            entry.object_id,
            SequenceNumber::from_u64(*start_version),
            mutable,
        )),
        _ => {
            let digest = ObjectDigest::from_str(&entry.digest)
                .map_err(|e| anyhow!("invalid object digest {}: {}", entry.digest, e))?;
            Ok(ObjectArg::ImmOrOwnedObject((
                ObjectID::from(entry.object_id),
                SequenceNumber::from_u64(entry.version),
                digest,
            )))
        }
    }
}

fn convert_argument(argument: &Argument) -> SuiArgument {
    match *argument {
        Argument::GasCoin => SuiArgument::GasCoin,
        Argument::Input(idx) => SuiArgument::Input(idx),
        Argument::Result(idx) => SuiArgument::Result(idx),
        Argument::NestedResult(cmd, idx) => SuiArgument::NestedResult(cmd, idx),
    }
}

fn convert_command(command: &Command) -> SuiCommand {
    match command {
        Command::MoveCall(call) => SuiCommand::MoveCall(Box::new(ProgrammableMoveCall {
            package: ObjectID::from(call.package),
            module: call.module.to_string(),
            function: call.function.to_string(),
            type_arguments: call
                .type_arguments
                .iter()
                .cloned()
                .map(TypeInput::from)
                .collect(),
            arguments: call.arguments.iter().map(convert_argument).collect(),
        })),
        Command::MakeMoveVec(tag, elements) => SuiCommand::MakeMoveVec(
            tag.clone().map(TypeInput::from),
            elements.iter().map(convert_argument).collect(),
        ),
    }
}

fn convert_owner(owner: &SuiOwner) -> Option<Owner> {
    match owner {
        SuiOwner::AddressOwner(address) => Some(Owner::AddressOwner(sui_to_account(address))),
        SuiOwner::ObjectOwner(address) => Some(Owner::ObjectOwner(sui_to_account(address))),
        SuiOwner::Shared {
            initial_shared_version,
        } => Some(Owner::Shared {
            initial_shared_version: initial_shared_version.value(),
        }),
        SuiOwner::Immutable => Some(Owner::Immutable),
        SuiOwner::ConsensusAddressOwner {
            start_version,
            owner,
        } => Some(Owner::ConsensusAddressOwner {
            start_version: start_version.value(),
            owner: sui_to_account(owner),
        }),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn convert_object_change(change: &SuiObjectChange) -> Option<ObjectChange> {
    let converted = match change {
        SuiObjectChange::Published {
            package_id,
            version,
            digest,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Published,
            object_id: AccountAddress::from(*package_id),
            version: version.value(),
            digest: Some(digest.to_string()),
            object_type: None,
            owner: None,
        },
        SuiObjectChange::Transferred {
            recipient,
            object_type,
            object_id,
            version,
            digest,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Transferred,
            object_id: AccountAddress::from(*object_id),
            version: version.value(),
            digest: Some(digest.to_string()),
            object_type: Some(object_type.to_string()),
            owner: convert_owner(recipient),
        },
        SuiObjectChange::Mutated {
            owner,
            object_type,
            object_id,
            version,
            digest,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Mutated,
            object_id: AccountAddress::from(*object_id),
            version: version.value(),
            digest: Some(digest.to_string()),
            object_type: Some(object_type.to_string()),
            owner: convert_owner(owner),
        },
        SuiObjectChange::Created {
            owner,
            object_type,
            object_id,
            version,
            digest,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Created,
            object_id: AccountAddress::from(*object_id),
            version: version.value(),
            digest: Some(digest.to_string()),
            object_type: Some(object_type.to_string()),
            owner: convert_owner(owner),
        },
        SuiObjectChange::Deleted {
            object_type,
            object_id,
            version,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Deleted,
            object_id: AccountAddress::from(*object_id),
            version: version.value(),
            digest: None,
            object_type: Some(object_type.to_string()),
            owner: None,
        },
        SuiObjectChange::Wrapped {
            object_type,
            object_id,
            version,
            ..
        } => ObjectChange {
            kind: ObjectChangeKind::Wrapped,
            object_id: AccountAddress::from(*object_id),
            version: version.value(),
            digest: None,
            object_type: Some(object_type.to_string()),
            owner: None,
        },
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(converted)
}

/// `confirmed` marks receipts read back from the node, which are final by
/// definition; a submission without effects is reported unconfirmed so the
/// relayer polls for it.
fn receipt_from_response(
    response: SuiTransactionBlockResponse,
    confirmed: bool,
) -> Result<ExecutionReceipt> {
    let digest = response.digest.to_string();
    let Some(effects) = response.effects.as_ref() else {
        if confirmed {
            bail!("transaction {} has no effects yet", digest);
        }
        return Ok(ExecutionReceipt {
            digest,
            status: ExecutionStatus::Success,
            confirmed_local_execution: false,
            effects: None,
            object_changes: None,
            events: vec![],
        });
    };

    let status = match effects.status() {
        SuiExecutionStatus::Success => ExecutionStatus::Success,
        SuiExecutionStatus::Failure { error } => ExecutionStatus::Failure {
            error: error.clone(),
        },
    };
    let events = match &response.events {
        Some(events) => events
            .data
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("serialize events")?,
        None => vec![],
    };

    Ok(ExecutionReceipt {
        digest,
        status,
        confirmed_local_execution: confirmed || response.confirmed_local_execution.unwrap_or(false),
        effects: Some(serde_json::to_value(effects).context("serialize effects")?),
        object_changes: response
            .object_changes
            .as_ref()
            .map(|changes| changes.iter().filter_map(convert_object_change).collect()),
        events,
    })
}

/// Read `error` and `results[].returnValues` from a devInspect JSON response.
/// Return values are `[bytes, type]` pairs, bytes as a number array.
pub fn simulation_from_json(json: &JsonValue) -> Result<SimulationResult> {
    let error = json
        .get("error")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let mut results = Vec::new();
    if let Some(commands) = json.get("results").and_then(JsonValue::as_array) {
        for (cmd_idx, command) in commands.iter().enumerate() {
            let mut outputs = CommandOutputs::default();
            let values = command
                .get("returnValues")
                .and_then(JsonValue::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for value in values {
                let pair = value
                    .as_array()
                    .filter(|pair| pair.len() == 2)
                    .ok_or_else(|| anyhow!("results[{}] return value is not a pair", cmd_idx))?;
                let bytes = pair[0]
                    .as_array()
                    .ok_or_else(|| anyhow!("results[{}] return bytes are not an array", cmd_idx))?
                    .iter()
                    .map(|b| {
                        b.as_u64()
                            .and_then(|n| u8::try_from(n).ok())
                            .ok_or_else(|| anyhow!("results[{}] contains a non-byte value", cmd_idx))
                    })
                    .collect::<Result<Vec<u8>>>()?;
                outputs.return_values.push(ReturnValue {
                    bytes,
                    type_name: pair[1].as_str().unwrap_or_default().to_string(),
                });
            }
            results.push(outputs);
        }
    }
    Ok(SimulationResult { error, results })
}
