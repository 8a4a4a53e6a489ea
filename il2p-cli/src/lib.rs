//! Library entry for il2p-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use bytes::Bytes;
use il2p_core::{Address, FrameBuilder};
use serde::{Deserialize, Serialize};

/// One frame to send, as read from the JSON input of `encode` and `modulate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameInput {
    /// Complete AX.25 frame as hex, without FCS
    Raw {
        /// Hex-encoded frame bytes
        raw: String,
    },
    /// UI frame built from text fields
    Ui {
        /// Destination, "CALL" or "CALL-SSID"
        dest: String,
        /// Source, "CALL" or "CALL-SSID"
        source: String,
        /// Digipeater path
        #[serde(default)]
        via: Vec<String>,
        /// Information field
        #[serde(default)]
        info: String,
    },
}

impl FrameInput {
    /// Raw AX.25 bytes for this entry
    pub fn to_ax25(&self) -> Result<Bytes> {
        match self {
            FrameInput::Raw { raw } => {
                let bytes = hex::decode(raw).with_context(|| format!("Invalid hex frame: {}", raw))?;
                Ok(Bytes::from(bytes))
            }
            FrameInput::Ui {
                dest,
                source,
                via,
                info,
            } => {
                let mut builder = FrameBuilder::new(parse_address(dest)?, parse_address(source)?);
                for digi in via {
                    builder = builder.digipeater(parse_address(digi)?);
                }
                Ok(builder.info(info.as_bytes()).build())
            }
        }
    }
}

fn parse_address(text: &str) -> Result<Address> {
    Address::parse_text(text).with_context(|| format!("Invalid address: {}", text))
}
