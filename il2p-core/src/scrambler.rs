//! Self-synchronizing scrambler applied to header and payload blocks
//!
//! The transmit side runs five bits ahead of its output: the first five
//! outputs are dropped and five zero bits are clocked in after the data, so a
//! scrambled block has exactly the length of the plain block. Blocks are
//! processed in place.

use crate::bits::BitsMut;
use crate::constants::{
    DESCRAMBLE_SEED, DESCRAMBLE_TAPS, SCRAMBLE_DELAY_BITS, SCRAMBLE_SEED, SCRAMBLE_TAPS,
};

/// Register bit where transmit data enters
const INPUT_BIT: u16 = 0x0100;

/// Transmit-side shift register
#[derive(Debug, Clone)]
pub struct Scrambler {
    state: u16,
}

impl Scrambler {
    /// Register loaded with the per-frame seed
    pub fn new() -> Self {
        Self {
            state: SCRAMBLE_SEED,
        }
    }

    /// Clock one bit through the register
    #[inline]
    pub fn step(&mut self, bit: bool) -> bool {
        let out = ((self.state >> 4) ^ self.state) & 1 != 0;
        let feedback = if self.state & 1 != 0 { SCRAMBLE_TAPS } else { 0 };
        let input = if bit { INPUT_BIT } else { 0 };
        self.state = (self.state >> 1) ^ feedback ^ input;
        out
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive-side shift register
#[derive(Debug, Clone)]
pub struct Descrambler {
    state: u16,
}

impl Descrambler {
    /// Register loaded with the per-frame seed
    pub fn new() -> Self {
        Self {
            state: DESCRAMBLE_SEED,
        }
    }

    /// Clock one bit through the register
    #[inline]
    pub fn step(&mut self, bit: bool) -> bool {
        if bit {
            self.state ^= DESCRAMBLE_TAPS;
        }
        let out = self.state & 1 != 0;
        self.state >>= 1;
        out
    }
}

impl Default for Descrambler {
    fn default() -> Self {
        Self::new()
    }
}

/// Scramble a block in place with a freshly seeded register
pub fn scramble(block: &mut [u8]) {
    if block.is_empty() {
        return;
    }
    let mut bits = BitsMut::new(block);
    let n = bits.len();
    let mut reg = Scrambler::new();

    // Output lags input by the delay, so writes never overtake reads.
    for i in 0..n {
        let out = reg.step(bits.get(i));
        if i >= SCRAMBLE_DELAY_BITS {
            bits.set(i - SCRAMBLE_DELAY_BITS, out);
        }
    }
    for i in n - SCRAMBLE_DELAY_BITS..n {
        let out = reg.step(false);
        bits.set(i, out);
    }
}

/// Descramble a block in place with a freshly seeded register
pub fn descramble(block: &mut [u8]) {
    let mut bits = BitsMut::new(block);
    let mut reg = Descrambler::new();
    for i in 0..bits.len() {
        let out = reg.step(bits.get(i));
        bits.set(i, out);
    }
}
