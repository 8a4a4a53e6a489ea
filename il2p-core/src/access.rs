//! p-persistent channel access
//!
//! The channel is evaluated once per slot. While a frame is being decoded
//! transmission is inhibited; once the channel is quiet a coin flip against
//! `p_persist` decides whether the next slot may carry a transmission.

/// Non-cryptographic 8-bit "X ABC" generator
///
/// Four bytes of state, one increment, three XORs and two additions per
/// output. Every operation wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XabcRng {
    x: u8,
    a: u8,
    b: u8,
    c: u8,
}

impl XabcRng {
    /// Generator in its fixed initial state
    pub fn new() -> Self {
        let mut rng = Self {
            x: 1,
            a: 0xB7,
            b: 0x73,
            c: 0xF6,
        };
        rng.mix();
        rng
    }

    fn mix(&mut self) {
        self.a ^= self.c ^ self.x;
        self.b = self.b.wrapping_add(self.a);
        self.c = self.c.wrapping_add((self.b >> 1) ^ self.a);
    }

    /// Next byte
    pub fn next_u8(&mut self) -> u8 {
        self.x = self.x.wrapping_add(1);
        self.mix();
        self.c
    }
}

impl Default for XabcRng {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot timer and transmit permission
#[derive(Debug, Clone)]
pub struct ChannelAccess {
    p_persist: u8,
    slot_samples: usize,
    slot_count: usize,
    dcd: bool,
    can_tx: bool,
    rng: XabcRng,
}

impl ChannelAccess {
    /// Slots of `slot_samples` samples, persistence `p_persist`
    pub fn new(p_persist: u8, slot_samples: usize) -> Self {
        Self {
            p_persist,
            slot_samples,
            slot_count: 0,
            dcd: false,
            can_tx: false,
            rng: XabcRng::new(),
        }
    }

    /// Count `samples` toward the current slot and decide at its end
    pub fn tick(&mut self, samples: usize) {
        self.slot_count += samples;
        if self.slot_count >= self.slot_samples {
            self.slot_count = 0;
            self.can_tx = !self.dcd && self.p_persist >= self.rng.next_u8();
        }
    }

    /// Report whether a frame is being decoded
    pub fn set_dcd(&mut self, dcd: bool) {
        self.dcd = dcd;
    }

    /// Carrier detect
    pub fn dcd(&self) -> bool {
        self.dcd
    }

    /// Transmission allowed in the current slot
    pub fn can_tx(&self) -> bool {
        self.can_tx
    }

    /// Back to the power-on state, keeping the generator running
    pub fn reset(&mut self) {
        self.slot_count = 0;
        self.dcd = false;
        self.can_tx = false;
    }
}
