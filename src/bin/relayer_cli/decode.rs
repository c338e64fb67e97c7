//! Decode command - pretty-print a raw registry response

use anyhow::Result;
use clap::Parser;
use sui_discovery_relayer::input::decode_sequence;

use super::output::format_sequence;

#[derive(Parser, Debug)]
pub struct DecodeSequenceCmd {
    /// BCS-encoded call sequence (hex unless --base64)
    pub encoded: String,

    /// Input is base64 instead of hex
    #[arg(long)]
    pub base64: bool,
}

impl DecodeSequenceCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        let sequence = decode_sequence(&self.encoded, self.base64)?;
        println!("{}", format_sequence(&sequence, json_output)?);
        Ok(())
    }
}
