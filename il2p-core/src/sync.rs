//! Sync word search
//!
//! Two stages: a coarse check of symbol signs per sampling phase, then a
//! signed correlation against the ideal level template over the sample
//! history. A candidate that beats the best score so far is confirmed by
//! slicing it and comparing the bits with the sync bytes.

use crate::bits::{hamming_distance, Bits, BitsMut};
use crate::config::SyncKind;
use crate::constants::{
    MAX_SYNC_BIT_ERRORS, MAX_SYNC_SYMBOL_ERRORS_LONG, MAX_SYNC_SYMBOL_ERRORS_SHORT,
    SYMBOLS_PER_BYTE, SYNC_THRESHOLD_Q15, SYNC_WORD_LONG, SYNC_WORD_SHORT,
};
use crate::ring::{RingPos, SampleRing};
use crate::slicer::Levels;
use alloc::vec;
use alloc::vec::Vec;

/// Longest sync word in bytes
const MAX_SYNC_BYTES: usize = 6;

/// A sync word with its search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWord {
    bytes: &'static [u8],
    sign_pattern: u32,
    mask: u32,
    max_symbol_errors: u32,
}

/// Sign bits of each symbol, set for negative levels, first symbol highest
const fn sign_pattern(bytes: &[u8]) -> u32 {
    let mut pattern = 0u32;
    let mut i = 0;
    while i < bytes.len() * SYMBOLS_PER_BYTE {
        let dibit = (bytes[i / 4] >> (6 - 2 * (i % 4))) & 0x03;
        pattern = (pattern << 1) | ((dibit >> 1) ^ 1) as u32;
        i += 1;
    }
    pattern
}

impl SyncWord {
    /// 24 symbol sync `55 FD DD 57 DF 7F`
    pub const LONG: SyncWord = SyncWord {
        bytes: SYNC_WORD_LONG,
        sign_pattern: sign_pattern(SYNC_WORD_LONG),
        mask: (1 << 24) - 1,
        max_symbol_errors: MAX_SYNC_SYMBOL_ERRORS_LONG,
    };

    /// 16 symbol sync `5D 57 DF 7F`
    pub const SHORT: SyncWord = SyncWord {
        bytes: SYNC_WORD_SHORT,
        sign_pattern: sign_pattern(SYNC_WORD_SHORT),
        mask: (1 << 16) - 1,
        max_symbol_errors: MAX_SYNC_SYMBOL_ERRORS_SHORT,
    };

    /// Sync word for a configured kind
    pub fn of(kind: SyncKind) -> Self {
        match kind {
            SyncKind::Long => Self::LONG,
            SyncKind::Short => Self::SHORT,
        }
    }

    /// Bytes as sent on air
    pub fn bytes(&self) -> &'static [u8] {
        self.bytes
    }

    /// Length in symbols
    pub fn symbols(&self) -> usize {
        self.bytes.len() * SYMBOLS_PER_BYTE
    }

    /// Symbol signs, bit set for a negative level
    pub fn sign_pattern(&self) -> u32 {
        self.sign_pattern
    }

    /// Coarse check of a window of symbol signs
    ///
    /// Returns `Some(inverted)` when the window matches the pattern or its
    /// complement within the symbol error tolerance.
    pub fn coarse_match(&self, signs: u32) -> Option<bool> {
        let signs = signs & self.mask;
        if (signs ^ self.sign_pattern).count_ones() <= self.max_symbol_errors {
            Some(false)
        } else if (signs ^ (!self.sign_pattern & self.mask)).count_ones() <= self.max_symbol_errors {
            Some(true)
        } else {
            None
        }
    }

    /// Confirm sliced sync bytes within the bit error tolerance
    pub fn bits_match(&self, received: &[u8]) -> bool {
        received.len() == self.bytes.len()
            && hamming_distance(received, self.bytes) <= MAX_SYNC_BIT_ERRORS
    }

    /// Ideal relative level (+3, +1, -1, -3) of symbol `index`
    fn template(&self, index: usize) -> i32 {
        match Bits::new(self.bytes).dibit(index) {
            0b11 => 3,
            0b10 => 1,
            0b00 => -1,
            _ => -3,
        }
    }
}

/// An accepted sync candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncMatch {
    /// Position of the sample that completed the sync word
    pub pos: RingPos,
    /// Levels derived from the sync samples
    pub levels: Levels,
    /// Received with inverted polarity
    pub invert: bool,
    /// Correlation score
    pub score: i64,
}

/// Per-phase sync search over the incoming samples
#[derive(Debug, Clone)]
pub struct SyncCorrelator {
    word: SyncWord,
    symbol_length: usize,
    signs: Vec<u32>,
    phase: usize,
    primed: usize,
    max_corr: i64,
}

impl SyncCorrelator {
    /// Search for `word` with `symbol_length` samples per symbol
    pub fn new(word: SyncWord, symbol_length: usize) -> Self {
        let symbol_length = symbol_length.max(1);
        Self {
            word,
            symbol_length,
            signs: vec![0; symbol_length],
            phase: 0,
            primed: 0,
            max_corr: 0,
        }
    }

    /// Sync word being searched for
    pub fn word(&self) -> &SyncWord {
        &self.word
    }

    /// Best score accepted since the last reset
    pub fn max_corr(&self) -> i64 {
        self.max_corr
    }

    /// Start a new search; the sign history is kept
    pub fn reset(&mut self) {
        self.max_corr = 0;
    }

    /// Feed the sample just stored at `pos`
    ///
    /// Returns a match when the candidate ending at this sample beats the
    /// best score of the current search and passes the bit check.
    pub fn push(&mut self, ring: &SampleRing, pos: RingPos, sample: i16) -> Option<SyncMatch> {
        let window = self.track(sample)?;
        self.word.coarse_match(window)?;
        self.correlate(ring, pos)
    }

    /// Record the sign of a sample without searching
    ///
    /// Keeps the per-phase history aligned while a frame is being received.
    /// Returns the sign window for this phase once it is full.
    pub fn track(&mut self, sample: i16) -> Option<u32> {
        let signs = &mut self.signs[self.phase];
        *signs = (*signs << 1) | u32::from(sample < 0);
        let window = *signs;
        self.phase = (self.phase + 1) % self.symbol_length;

        let needed = self.word.symbols() * self.symbol_length;
        if self.primed < needed {
            self.primed += 1;
            return None;
        }
        Some(window)
    }

    /// Full correlation of the candidate ending at `pos`
    fn correlate(&mut self, ring: &SampleRing, pos: RingPos) -> Option<SyncMatch> {
        let symbols = self.word.symbols();
        let start = ring.rewind(pos, (symbols - 1) * self.symbol_length);

        let mut corr = 0i64;
        let mut max = i16::MIN;
        let mut min = i16::MAX;
        for (i, s) in ring.strided(start, symbols, self.symbol_length).enumerate() {
            corr += i64::from(s) * i64::from(self.word.template(i));
            max = max.max(s);
            min = min.min(s);
        }

        let invert = corr < 0;
        let score = corr.abs();
        if score <= self.max_corr {
            return None;
        }

        let centre = (i32::from(max) + i32::from(min)) >> 1;
        let threshold = ((i32::from(max) - centre) * SYNC_THRESHOLD_Q15) >> 15;
        let levels = Levels::new(centre as i16, threshold as i16);

        let mut bytes = [0u8; MAX_SYNC_BYTES];
        let received = &mut bytes[..self.word.bytes().len()];
        let mut bits = BitsMut::new(received);
        for (i, s) in ring.strided(start, symbols, self.symbol_length).enumerate() {
            bits.set_dibit(i, levels.dibit(s, invert));
        }
        if !self.word.bits_match(received) {
            return None;
        }

        self.max_corr = score;
        Some(SyncMatch {
            pos,
            levels,
            invert,
            score,
        })
    }
}
