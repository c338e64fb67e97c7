//! Ledger collaborator interface.
//!
//! The relayer never talks to a node directly; everything it needs from the
//! chain goes through [`LedgerClient`]. Implementations own transport, gas
//! selection and signing.

use anyhow::{anyhow, Context, Result};
use move_core_types::account_address::AccountAddress;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::builder::Target;
use crate::cache::ObjectChange;
use crate::descriptor::TypeDescriptor;
use crate::ptb::ProgrammableTransaction;

/// Normalized parameter and return types of a Move function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub type_parameter_count: usize,
    pub parameters: Vec<TypeDescriptor>,
    pub returns: Vec<TypeDescriptor>,
}

impl FunctionSignature {
    /// Parse a JSON-RPC normalized function (`typeParameters`, `parameters`, `return`).
    pub fn from_normalized_json(json: &JsonValue) -> Result<Self> {
        let types = |key: &str| -> Result<Vec<TypeDescriptor>> {
            match json.get(key) {
                None | Some(JsonValue::Null) => Ok(vec![]),
                Some(JsonValue::Array(items)) => items
                    .iter()
                    .map(|t| TypeDescriptor::from_normalized_json(t).map_err(anyhow::Error::from))
                    .collect::<Result<_>>()
                    .with_context(|| format!("parsing function {key}")),
                Some(other) => Err(anyhow!("function {key} is not an array: {other}")),
            }
        };
        Ok(Self {
            type_parameter_count: json
                .get("typeParameters")
                .and_then(JsonValue::as_array)
                .map(Vec::len)
                .unwrap_or(0),
            parameters: types("parameters")?,
            returns: types("return")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
}

/// Field layout of a Move struct, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSchema {
    pub type_parameter_count: usize,
    pub fields: Vec<FieldDescriptor>,
}

impl StructSchema {
    /// Parse a JSON-RPC normalized struct (`typeParameters`, `fields[].name/type`).
    pub fn from_normalized_json(json: &JsonValue) -> Result<Self> {
        let fields = json
            .get("fields")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| anyhow!("struct has no fields array"))?
            .iter()
            .map(|field| {
                let name = field
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| anyhow!("field without name"))?;
                let ty = field
                    .get("type")
                    .ok_or_else(|| anyhow!("field {name} without type"))?;
                Ok(FieldDescriptor {
                    name: name.to_string(),
                    ty: TypeDescriptor::from_normalized_json(ty)?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            type_parameter_count: json
                .get("typeParameters")
                .and_then(JsonValue::as_array)
                .map(Vec::len)
                .unwrap_or(0),
            fields,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValue {
    #[serde(with = "sui_relayer_types::encoding::hex_bytes")]
    pub bytes: Vec<u8>,
    pub type_name: String,
}

/// Outputs of one command in a simulated transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutputs {
    pub return_values: Vec<ReturnValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Abort or execution error, verbatim from the ledger.
    pub error: Option<String>,
    /// Per-command outputs, indexed like the transaction's commands.
    pub results: Vec<CommandOutputs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// What came back from a submitted or confirmed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub digest: String,
    pub status: ExecutionStatus,
    /// Whether the node executed the transaction locally before responding.
    pub confirmed_local_execution: bool,
    pub effects: Option<JsonValue>,
    pub object_changes: Option<Vec<ObjectChange>>,
    #[serde(default)]
    pub events: Vec<JsonValue>,
}

/// Chain access used by the relayer.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Address used as sender for simulation and submission.
    fn sender(&self) -> AccountAddress;

    async fn function_signature(&self, target: &Target) -> Result<FunctionSignature>;

    async fn struct_schema(
        &self,
        address: AccountAddress,
        module: &str,
        name: &str,
    ) -> Result<StructSchema>;

    /// Dry-run `tx` as `sender` without committing anything.
    async fn simulate(
        &self,
        tx: &ProgrammableTransaction,
        sender: AccountAddress,
    ) -> Result<SimulationResult>;

    /// Sign and submit `tx`.
    async fn submit(&self, tx: &ProgrammableTransaction) -> Result<ExecutionReceipt>;

    /// Look up a previously submitted transaction.
    async fn confirm(&self, digest: &str) -> Result<ExecutionReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Primitive;
    use serde_json::json;

    #[test]
    fn test_function_signature_from_json() {
        let json = json!({
            "visibility": "Public",
            "isEntry": false,
            "typeParameters": [{"abilities": []}],
            "parameters": [
                {"Reference": {"Struct": {"address": "0x5", "module": "discovery", "name": "RelayerDiscovery", "typeArguments": []}}},
                "Address"
            ],
            "return": [{"Struct": {"address": "0x5", "module": "transaction", "name": "Transaction", "typeArguments": []}}]
        });
        let sig = FunctionSignature::from_normalized_json(&json).unwrap();
        assert_eq!(sig.type_parameter_count, 1);
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[1], TypeDescriptor::Primitive(Primitive::Address));
        assert_eq!(sig.returns.len(), 1);
    }

    #[test]
    fn test_function_signature_rejects_bad_parameter() {
        let json = json!({"parameters": ["U512"], "return": []});
        assert!(FunctionSignature::from_normalized_json(&json).is_err());
    }

    #[test]
    fn test_struct_schema_from_json() {
        let json = json!({
            "abilities": {"abilities": ["Copy", "Drop"]},
            "typeParameters": [],
            "fields": [
                {"name": "amount", "type": "U64"},
                {"name": "memo", "type": {"Vector": "U8"}}
            ]
        });
        let schema = StructSchema::from_normalized_json(&json).unwrap();
        assert_eq!(schema.type_parameter_count, 0);
        assert_eq!(schema.fields[0].name, "amount");
        assert_eq!(
            schema.fields[1].ty,
            TypeDescriptor::vector(TypeDescriptor::Primitive(Primitive::U8))
        );
    }

    #[test]
    fn test_receipt_status_json() {
        let status = ExecutionStatus::Failure {
            error: "MoveAbort".into(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, json!({"status": "failure", "error": "MoveAbort"}));
    }
}
