//! Fixed-capacity sample history
//!
//! Positions are only produced by the ring itself, so a [`RingPos`] is always
//! a valid slot index. Arithmetic on positions wraps modulo the capacity.

use alloc::vec;
use alloc::vec::Vec;

/// A slot index into a [`SampleRing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingPos(usize);

impl RingPos {
    /// Raw slot index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Circular buffer of received samples
#[derive(Debug, Clone)]
pub struct SampleRing {
    samples: Vec<i16>,
}

impl SampleRing {
    /// Allocate a zeroed ring holding `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity.max(1)],
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Position of slot zero
    pub fn origin(&self) -> RingPos {
        RingPos(0)
    }

    /// Position `n` samples after `pos`
    #[inline]
    pub fn advance(&self, pos: RingPos, n: usize) -> RingPos {
        RingPos((pos.0 + n % self.capacity()) % self.capacity())
    }

    /// Position `n` samples before `pos`
    #[inline]
    pub fn rewind(&self, pos: RingPos, n: usize) -> RingPos {
        let cap = self.capacity();
        RingPos((pos.0 + cap - n % cap) % cap)
    }

    /// Samples from `from` forward to `to`, exclusive
    pub fn distance(&self, from: RingPos, to: RingPos) -> usize {
        let cap = self.capacity();
        (to.0 + cap - from.0) % cap
    }

    /// Sample stored at `pos`
    #[inline]
    pub fn get(&self, pos: RingPos) -> i16 {
        self.samples[pos.0]
    }

    /// Store `sample` at `pos`
    #[inline]
    pub fn put(&mut self, pos: RingPos, sample: i16) {
        self.samples[pos.0] = sample;
    }

    /// `count` samples spaced `step` apart, starting at `start`
    pub fn strided(&self, start: RingPos, count: usize, step: usize) -> Strided<'_> {
        Strided {
            ring: self,
            pos: start,
            remaining: count,
            step,
        }
    }

    /// Zero every slot
    pub fn clear(&mut self) {
        self.samples.iter_mut().for_each(|s| *s = 0);
    }
}

/// Iterator over evenly spaced ring samples
#[derive(Debug, Clone)]
pub struct Strided<'a> {
    ring: &'a SampleRing,
    pos: RingPos,
    remaining: usize,
    step: usize,
}

impl Iterator for Strided<'_> {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.remaining == 0 {
            return None;
        }
        let sample = self.ring.get(self.pos);
        self.pos = self.ring.advance(self.pos, self.step);
        self.remaining -= 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Strided<'_> {}
