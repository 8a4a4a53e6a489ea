pub mod demod;
pub mod encode;
pub mod modulate;
pub mod scan;

use crate::FrameInput;
use anyhow::{Context, Result};
use bytes::Bytes;
use il2p_core::{decoder::DecodedFrame, types::Ax25Frame, ModemConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// Read a JSON array of frames and build the raw AX.25 bytes
pub fn load_frames(path: &str) -> Result<Vec<Bytes>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path))?;
    let entries: Vec<FrameInput> =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON input")?;

    info!("Found {} frames in {}", entries.len(), path);

    entries
        .iter()
        .enumerate()
        .map(|(i, e)| e.to_ax25().with_context(|| format!("Frame {} is invalid", i)))
        .collect()
}

/// Modem parameters from a JSON file, or the defaults
pub fn load_config(path: Option<&str>) -> Result<ModemConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => ModemConfig::default(),
    };
    config.validate().with_context(|| "Invalid modem configuration")?;
    Ok(config)
}

/// JSON view of a recovered AX.25 frame
#[derive(Debug, Serialize, Deserialize)]
pub struct RecoveredFrame {
    /// Byte offset (scan) or frame index (demod)
    pub position: usize,
    /// "Type0" or "Type1"
    pub header_type: String,
    /// Payload bytes carried after the header
    pub payload_len: usize,
    /// RS symbols corrected
    pub corrected: usize,
    /// Destination, when the frame parses as AX.25
    pub dest: Option<String>,
    /// Source, when the frame parses as AX.25
    pub source: Option<String>,
    /// Information field, lossily decoded as text
    pub info: Option<String>,
    /// Complete frame as hex
    pub raw: String,
}

impl RecoveredFrame {
    /// Describe a frame decoded from a byte stream
    pub fn from_decoded(position: usize, frame: &DecodedFrame) -> Self {
        let mut recovered = Self::from_packet(position, &frame.packet);
        recovered.header_type = format!("{:?}", frame.header.kind);
        recovered.payload_len = frame.header.payload_len;
        recovered.corrected = frame.corrected;
        recovered
    }

    /// Describe a delivered packet without header details
    pub fn from_packet(position: usize, packet: &[u8]) -> Self {
        let parsed = Ax25Frame::parse(packet).ok();
        Self {
            position,
            header_type: String::new(),
            payload_len: 0,
            corrected: 0,
            dest: parsed.as_ref().map(|f| f.dest.to_string()),
            source: parsed.as_ref().map(|f| f.source.to_string()),
            info: parsed
                .as_ref()
                .map(|f| String::from_utf8_lossy(f.info).to_string()),
            raw: hex::encode(packet),
        }
    }

    /// One line summary
    pub fn summary(&self) -> String {
        match (&self.source, &self.dest) {
            (Some(source), Some(dest)) => format!(
                "{}>{}: {}",
                source,
                dest,
                self.info.as_deref().unwrap_or_default()
            ),
            _ => format!("{} raw bytes", self.raw.len() / 2),
        }
    }
}

/// Write recovered frames as pretty JSON
pub fn write_json(path: &str, frames: &[RecoveredFrame]) -> Result<()> {
    let json = serde_json::to_string_pretty(frames)
        .with_context(|| "Failed to serialize recovered frames")?;
    fs::write(path, json).with_context(|| format!("Failed to write output file: {}", path))?;
    info!("Recovered frames written to: {}", path);
    Ok(())
}
