//! Four-level symbol mapping for the transmit path
//!
//! Each byte becomes four symbols, most significant dibit first. A plain
//! modulator holds each symbol for `symbol_length` samples; with pulse
//! shaping every symbol level is upsampled through the root raised cosine
//! interpolator instead.

use crate::constants::{LEVEL_A, LEVEL_B, LEVEL_C, LEVEL_D, RRC_TX_TAPS, SYMBOLS_PER_BYTE};
use crate::filter::Interpolator;
use crate::io::SampleOutput;
use alloc::vec;
use alloc::vec::Vec;

/// Byte to sample mapper
#[derive(Debug, Clone)]
pub struct Modulator {
    symbol_length: usize,
    level: i32,
    shaper: Option<Interpolator>,
    scratch: Vec<i16>,
}

impl Modulator {
    /// Mapper holding each symbol for `symbol_length` samples at `tx_level`
    pub fn new(symbol_length: usize, tx_level: u8) -> Self {
        let symbol_length = symbol_length.max(1);
        Self {
            symbol_length,
            level: i32::from(tx_level) * 128,
            shaper: None,
            scratch: vec![0; symbol_length * SYMBOLS_PER_BYTE],
        }
    }

    /// Shape symbols with the root raised cosine taps
    ///
    /// The taps assume five samples per symbol.
    pub fn with_pulse_shaping(mut self) -> Self {
        self.shaper = Some(Interpolator::new(self.symbol_length, &RRC_TX_TAPS));
        self
    }

    /// Samples produced per byte
    pub fn samples_per_byte(&self) -> usize {
        self.scratch.len()
    }

    /// Scaled amplitude for a dibit
    pub fn symbol(&self, dibit: u8) -> i16 {
        let value = match dibit & 0x03 {
            0b11 => LEVEL_A,
            0b10 => LEVEL_B,
            0b00 => LEVEL_C,
            _ => LEVEL_D,
        };
        let scaled = (i32::from(value) * self.level) >> 15;
        scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }

    /// Write one byte worth of symbols
    pub fn write_byte<O: SampleOutput + ?Sized>(&mut self, byte: u8, out: &mut O) {
        let mut levels = [0i16; SYMBOLS_PER_BYTE];
        for (i, level) in levels.iter_mut().enumerate() {
            *level = self.symbol(byte >> (6 - 2 * i));
        }
        self.emit(levels, out);
    }

    /// Write one byte worth of silence
    ///
    /// A shaped modulator keeps ringing out the preceding symbols for the
    /// first eight symbol periods.
    pub fn write_silence<O: SampleOutput + ?Sized>(&mut self, out: &mut O) {
        self.emit([0; SYMBOLS_PER_BYTE], out);
    }

    /// Drop the shaping filter history
    pub fn reset(&mut self) {
        if let Some(shaper) = self.shaper.as_mut() {
            shaper.reset();
        }
    }

    fn emit<O: SampleOutput + ?Sized>(&mut self, levels: [i16; SYMBOLS_PER_BYTE], out: &mut O) {
        let sl = self.symbol_length;
        for (chunk, level) in self.scratch.chunks_exact_mut(sl).zip(levels) {
            match self.shaper.as_mut() {
                Some(shaper) => shaper.push(level, chunk),
                None => chunk.fill(level),
            }
        }
        out.write(&self.scratch);
    }
}
