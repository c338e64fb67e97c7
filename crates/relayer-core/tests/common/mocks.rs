//! Scripted in-memory ledger.
//!
//! Signatures and struct schemas are registered up front; simulation,
//! submission and confirmation answers are popped from queues. Every
//! transaction the relayer hands over is recorded for inspection.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use move_core_types::account_address::AccountAddress;
use parking_lot::Mutex;
use sui_relayer_core::{
    CommandOutputs, ExecutionReceipt, FunctionSignature, LedgerClient, ProgrammableTransaction,
    ReturnValue, SimulationResult, StructSchema, Target,
};
use sui_relayer_types::CallSequence;

/// One scripted answer to `simulate`.
#[derive(Debug, Clone)]
pub enum Simulation {
    /// Return this sequence from the last Move call of the transaction.
    Next(CallSequence),
    /// Abort with this error.
    Revert(String),
    /// Return this result as is.
    Raw(SimulationResult),
}

pub struct MockLedger {
    sender: AccountAddress,
    signatures: Mutex<HashMap<String, FunctionSignature>>,
    schemas: Mutex<HashMap<String, StructSchema>>,
    simulations: Mutex<VecDeque<Simulation>>,
    submissions: Mutex<VecDeque<ExecutionReceipt>>,
    confirmations: Mutex<VecDeque<Result<ExecutionReceipt>>>,

    pub simulated: Mutex<Vec<ProgrammableTransaction>>,
    pub submitted: Mutex<Vec<ProgrammableTransaction>>,
    pub signature_lookups: AtomicUsize,
    pub schema_lookups: AtomicUsize,
    pub confirm_calls: AtomicUsize,
}

fn schema_key(address: AccountAddress, module: &str, name: &str) -> String {
    format!("{}::{}::{}", address.to_hex_literal(), module, name)
}

impl MockLedger {
    pub fn new(sender: AccountAddress) -> Self {
        Self {
            sender,
            signatures: Mutex::new(HashMap::new()),
            schemas: Mutex::new(HashMap::new()),
            simulations: Mutex::new(VecDeque::new()),
            submissions: Mutex::new(VecDeque::new()),
            confirmations: Mutex::new(VecDeque::new()),
            simulated: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            signature_lookups: AtomicUsize::new(0),
            schema_lookups: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_signature(self, target: &str, signature: FunctionSignature) -> Self {
        let target: Target = target.parse().expect("valid target");
        self.signatures.lock().insert(target.to_string(), signature);
        self
    }

    pub fn with_schema(
        self,
        address: AccountAddress,
        module: &str,
        name: &str,
        schema: StructSchema,
    ) -> Self {
        self.schemas
            .lock()
            .insert(schema_key(address, module, name), schema);
        self
    }

    pub fn script_simulation(&self, simulation: Simulation) {
        self.simulations.lock().push_back(simulation);
    }

    pub fn script_submission(&self, receipt: ExecutionReceipt) {
        self.submissions.lock().push_back(receipt);
    }

    pub fn script_confirmation(&self, receipt: Result<ExecutionReceipt>) {
        self.confirmations.lock().push_back(receipt);
    }

    pub fn simulation_count(&self) -> usize {
        self.simulated.lock().len()
    }

    pub fn last_submitted(&self) -> Option<ProgrammableTransaction> {
        self.submitted.lock().last().cloned()
    }
}

fn answer(tx: &ProgrammableTransaction, sequence: &CallSequence) -> Result<SimulationResult> {
    let (last, _) = tx
        .move_calls()
        .last()
        .ok_or_else(|| anyhow!("transaction has no move calls"))?;
    let mut results = vec![CommandOutputs::default(); tx.commands.len()];
    results[last].return_values.push(ReturnValue {
        bytes: sequence.to_bcs()?,
        type_name: "transaction::Transaction".into(),
    });
    Ok(SimulationResult {
        error: None,
        results,
    })
}

#[async_trait::async_trait]
impl LedgerClient for MockLedger {
    fn sender(&self) -> AccountAddress {
        self.sender
    }

    async fn function_signature(&self, target: &Target) -> Result<FunctionSignature> {
        self.signature_lookups.fetch_add(1, Ordering::SeqCst);
        self.signatures
            .lock()
            .get(&target.to_string())
            .cloned()
            .ok_or_else(|| anyhow!("function {} not found", target))
    }

    async fn struct_schema(
        &self,
        address: AccountAddress,
        module: &str,
        name: &str,
    ) -> Result<StructSchema> {
        self.schema_lookups.fetch_add(1, Ordering::SeqCst);
        let key = schema_key(address, module, name);
        self.schemas
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("struct {} not found", key))
    }

    async fn simulate(
        &self,
        tx: &ProgrammableTransaction,
        sender: AccountAddress,
    ) -> Result<SimulationResult> {
        assert_eq!(sender, self.sender, "simulation must use the relayer sender");
        self.simulated.lock().push(tx.clone());
        let next = self
            .simulations
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted simulation left"))?;
        match next {
            Simulation::Next(sequence) => answer(tx, &sequence),
            Simulation::Revert(error) => Ok(SimulationResult {
                error: Some(error),
                results: vec![],
            }),
            Simulation::Raw(result) => Ok(result),
        }
    }

    async fn submit(&self, tx: &ProgrammableTransaction) -> Result<ExecutionReceipt> {
        self.submitted.lock().push(tx.clone());
        self.submissions
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted submission left"))
    }

    async fn confirm(&self, digest: &str) -> Result<ExecutionReceipt> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.confirmations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("transaction {} not found", digest)))
    }
}
