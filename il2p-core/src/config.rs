//! Modem configuration
//!
//! One parameter set covers every symbol rate and framing mode; derived
//! buffer sizes and timings are computed from it rather than fixed per mode.

use crate::constants::{
    CRC_LENGTH_BYTES, HEADER_LENGTH_BYTES, HEADER_PARITY_BYTES, MAX_PAYLOAD_LENGTH,
    MAX_PAYLOAD_PARITY, RRC_SYMBOL_LENGTH, SYMBOLS_PER_BYTE, SYNC_WORD_LONG, SYNC_WORD_SHORT,
};
use crate::error::Il2pError;
use crate::types::FecLevel;
use alloc::format;
use serde::{Deserialize, Serialize};

/// Which sync word frames are sent and searched with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    /// Six byte, 24 symbol sync
    #[default]
    Long,
    /// Four byte, 16 symbol sync
    Short,
}

impl SyncKind {
    /// Sync bytes as sent on air
    pub fn bytes(self) -> &'static [u8] {
        match self {
            SyncKind::Long => SYNC_WORD_LONG,
            SyncKind::Short => SYNC_WORD_SHORT,
        }
    }
}

/// Parameters read by the receive and transmit paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// Samples per second
    pub sample_rate: u32,
    /// Samples per symbol
    pub symbol_length: usize,
    /// Sync word
    pub sync: SyncKind,
    /// Payload FEC density for transmitted frames
    pub fec: FecLevel,
    /// Send and expect the Hamming-coded CRC trailer
    pub crc: bool,
    /// Preamble length in milliseconds
    pub tx_delay_ms: u32,
    /// Silence after the last frame in milliseconds
    pub tx_tail_ms: u32,
    /// p-persistence, transmit when `p_persist >= rand()`
    pub p_persist: u8,
    /// Channel access slot in milliseconds
    pub slot_time_ms: u32,
    /// Skip channel access arbitration
    pub duplex: bool,
    /// Transmit amplitude, 128 is half scale
    pub tx_level: u8,
    /// Root raised cosine shaping on transmit and matched filtering on receive
    pub pulse_shaping: bool,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            symbol_length: 5,
            sync: SyncKind::Long,
            fec: FecLevel::Normal,
            crc: false,
            tx_delay_ms: 300,
            tx_tail_ms: 50,
            p_persist: 63,
            slot_time_ms: 100,
            duplex: false,
            tx_level: 128,
            pulse_shaping: true,
        }
    }
}

impl ModemConfig {
    /// Plain IL2P with the long sync word
    pub fn il2p() -> Self {
        Self::default()
    }

    /// IL2P with the CRC trailer
    pub fn il2p_crc() -> Self {
        Self {
            crc: true,
            ..Self::default()
        }
    }

    /// Short sync word with the CRC trailer
    pub fn short_sync() -> Self {
        Self {
            sync: SyncKind::Short,
            crc: true,
            ..Self::default()
        }
    }

    /// Reject parameter sets the modem cannot run with
    pub fn validate(&self) -> Result<(), Il2pError> {
        if self.symbol_length == 0 {
            return Err(Il2pError::InvalidConfig("symbol_length must be non-zero".into()));
        }
        if self.sample_rate == 0 {
            return Err(Il2pError::InvalidConfig("sample_rate must be non-zero".into()));
        }
        if self.sample_rate as usize % self.symbol_length != 0 {
            return Err(Il2pError::InvalidConfig(format!(
                "sample_rate {} is not a multiple of symbol_length {}",
                self.sample_rate, self.symbol_length
            )));
        }
        if self.pulse_shaping && self.symbol_length != RRC_SYMBOL_LENGTH {
            return Err(Il2pError::InvalidConfig(format!(
                "pulse shaping needs symbol_length {}, got {}",
                RRC_SYMBOL_LENGTH, self.symbol_length
            )));
        }
        Ok(())
    }

    /// Samples per byte on air
    pub fn samples_per_byte(&self) -> usize {
        self.symbol_length * SYMBOLS_PER_BYTE
    }

    /// Bytes sent in 10 ms
    pub fn bytes_per_10ms(&self) -> usize {
        self.sample_rate as usize / self.samples_per_byte() / 100
    }

    /// Preamble bytes sent before the first frame
    pub fn preamble_bytes(&self) -> usize {
        self.tx_delay_ms as usize / 10 * self.bytes_per_10ms()
    }

    /// Bytes worth of silence after the last frame
    pub fn tail_bytes(&self) -> usize {
        self.tx_tail_ms as usize / 10 * self.bytes_per_10ms()
    }

    /// Samples per channel access slot
    pub fn slot_samples(&self) -> usize {
        ms_to_samples(self.slot_time_ms, self.sample_rate)
    }

    /// Sync length in symbols
    pub fn sync_symbols(&self) -> usize {
        self.sync.bytes().len() * SYMBOLS_PER_BYTE
    }

    /// Samples the receive ring must hold for the largest frame
    pub fn ring_capacity(&self) -> usize {
        let bytes = MAX_PAYLOAD_LENGTH
            + HEADER_LENGTH_BYTES
            + HEADER_PARITY_BYTES
            + MAX_PAYLOAD_PARITY
            + CRC_LENGTH_BYTES
            + self.sync.bytes().len();
        bytes * self.samples_per_byte()
    }
}

fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    (u64::from(ms) * u64::from(sample_rate) / 1000) as usize
}
