//! Output formatting for the discovery-relayer CLI

use anyhow::Result;
use serde::Serialize;
use sui_relayer_core::{ErrorCode, ExecutionReceipt, ExecutionStatus, ObjectChangeKind, PhaseError};
use sui_relayer_types::encoding::{address_to_string, to_hex};
use sui_relayer_types::{ArgumentSource, CallSequence};

fn describe_argument(raw: &[u8]) -> String {
    match ArgumentSource::decode(raw) {
        Ok(ArgumentSource::Object(id)) => format!("object {}", address_to_string(&id)),
        Ok(ArgumentSource::Pure(bytes)) => format!("pure {}", to_hex(&bytes)),
        Ok(ArgumentSource::Capability) => "approved message".to_string(),
        Ok(ArgumentSource::Payload) => "payload".to_string(),
        Ok(ArgumentSource::PriorResult { call, index }) => {
            format!("result {} of call {}", index, call)
        }
        Err(e) => format!("\x1b[31mmalformed\x1b[0m ({}): {}", e, to_hex(raw)),
    }
}

pub fn format_sequence(sequence: &CallSequence, json_output: bool) -> Result<String> {
    if json_output {
        return Ok(serde_json::to_string_pretty(sequence)?);
    }

    let mut out = format!(
        "\x1b[1m{} sequence\x1b[0m ({} call{})\n",
        if sequence.is_final { "Final" } else { "Intermediate" },
        sequence.calls.len(),
        if sequence.calls.len() == 1 { "" } else { "s" }
    );
    for (i, call) in sequence.calls.iter().enumerate() {
        out.push_str(&format!("  [{}] \x1b[36m{}\x1b[0m", i, call.function));
        if !call.type_arguments.is_empty() {
            out.push_str(&format!("<{}>", call.type_arguments.join(", ")));
        }
        out.push('\n');
        for (j, raw) in call.arguments.iter().enumerate() {
            out.push_str(&format!("        arg {}: {}\n", j, describe_argument(raw)));
        }
    }
    Ok(out.trim_end().to_string())
}

pub fn format_receipt(receipt: &ExecutionReceipt, json_output: bool) -> Result<String> {
    if json_output {
        return Ok(serde_json::to_string_pretty(receipt)?);
    }

    let mut out = match &receipt.status {
        ExecutionStatus::Success => {
            format!("\x1b[32m✓ Executed\x1b[0m {}\n", receipt.digest)
        }
        ExecutionStatus::Failure { error } => {
            format!("\x1b[31m✗ Failed\x1b[0m {}: {}\n", receipt.digest, error)
        }
    };
    if let Some(changes) = &receipt.object_changes {
        for change in changes {
            let label = match change.kind {
                ObjectChangeKind::Published => "published",
                ObjectChangeKind::Transferred => "transferred",
                ObjectChangeKind::Mutated => "mutated",
                ObjectChangeKind::Deleted => "deleted",
                ObjectChangeKind::Wrapped => "wrapped",
                ObjectChangeKind::Created => "created",
            };
            out.push_str(&format!(
                "  {:<11} {} v{}\n",
                label,
                address_to_string(&change.object_id),
                change.version
            ));
        }
    }
    if !receipt.events.is_empty() {
        out.push_str(&format!("Events: {} emitted\n", receipt.events.len()));
    }
    Ok(out.trim_end().to_string())
}

/// Format an error, with its relayer error code when it has one.
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    let phase_error = error.downcast_ref::<PhaseError>();
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            code: Option<&'static str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            phase: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            call_index: Option<usize>,
            #[serde(skip_serializing_if = "Option::is_none")]
            cause: Option<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            code: phase_error.map(|e| e.code()),
            phase: phase_error.map(|e| e.phase.to_string()),
            call_index: phase_error.and_then(|e| e.call_index),
            cause: error.chain().nth(1).map(|e| e.to_string()),
        };
        format!(
            "{}\n",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
        )
    } else {
        let mut out = match phase_error {
            Some(e) => format!("\x1b[31mError [{}]:\x1b[0m {}\n", e.code(), error),
            None => format!("\x1b[31mError:\x1b[0m {}\n", error),
        };
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                out.push_str(&format!("  {}: {}\n", idx + 1, cause));
            }
        }
        out
    }
}
