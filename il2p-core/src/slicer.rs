//! Adaptive four-level slicer
//!
//! Every block of a frame is measured before it is sliced: the midpoints
//! between the outer and inner levels on each side give a fresh centre and
//! threshold, which are averaged over the last sixteen measurements.

use crate::bits::BitsMut;
use crate::constants::LEVEL_HISTORY;
use crate::ring::{RingPos, SampleRing};

/// Decision levels for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Levels {
    /// DC offset of the received signal
    pub centre: i16,
    /// Distance from the centre to the outer/inner decision points
    pub threshold: i16,
}

impl Levels {
    /// Levels from a centre and threshold
    pub fn new(centre: i16, threshold: i16) -> Self {
        Self { centre, threshold }
    }

    /// Slice one sample into a dibit
    ///
    /// `invert` negates the de-meaned sample for frames received with
    /// inverted polarity.
    #[inline]
    pub fn dibit(&self, sample: i16, invert: bool) -> u8 {
        let mut v = i32::from(sample) - i32::from(self.centre);
        if invert {
            v = -v;
        }
        let threshold = i32::from(self.threshold);
        if v < -threshold {
            0b01
        } else if v < 0 {
            0b00
        } else if v < threshold {
            0b10
        } else {
            0b11
        }
    }

    /// Measure levels from symbol samples
    ///
    /// Samples above `centre` feed the positive side and the rest the
    /// negative side. Returns `None` unless both sides saw a sample.
    pub fn measure<I>(samples: I, centre: i16) -> Option<Levels>
    where
        I: IntoIterator<Item = i16>,
    {
        let mut max_pos = -16000i32;
        let mut min_pos = 16000i32;
        let mut max_neg = 16000i32;
        let mut min_neg = -16000i32;
        let mut seen = (false, false);

        for s in samples {
            let s = i32::from(s);
            if s > i32::from(centre) {
                max_pos = max_pos.max(s);
                min_pos = min_pos.min(s);
                seen.0 = true;
            } else {
                max_neg = max_neg.min(s);
                min_neg = min_neg.max(s);
                seen.1 = true;
            }
        }
        if !(seen.0 && seen.1) {
            return None;
        }

        let pos_thresh = (max_pos + min_pos) >> 1;
        let neg_thresh = (max_neg + min_neg) >> 1;
        let centre = (pos_thresh + neg_thresh) >> 1;
        Some(Levels::new(centre as i16, (pos_thresh - centre) as i16))
    }
}

/// Running centre/threshold average for the frame being received
#[derive(Debug, Clone)]
pub struct AdaptiveSlicer {
    history: [Levels; LEVEL_HISTORY],
    next: usize,
    seeded: bool,
    current: Levels,
    invert: bool,
}

impl AdaptiveSlicer {
    /// Idle slicer with zero levels
    pub fn new() -> Self {
        Self {
            history: [Levels::default(); LEVEL_HISTORY],
            next: 0,
            seeded: false,
            current: Levels::default(),
            invert: false,
        }
    }

    /// Start a frame with the levels found during sync
    pub fn start(&mut self, levels: Levels, invert: bool) {
        self.current = levels;
        self.invert = invert;
        self.seeded = false;
        self.next = 0;
    }

    /// Levels in force
    pub fn levels(&self) -> Levels {
        self.current
    }

    /// Polarity of the current frame
    pub fn inverted(&self) -> bool {
        self.invert
    }

    /// Fold a measurement into the history
    ///
    /// The first measurement of a frame fills every slot.
    pub fn update(&mut self, measured: Levels) {
        if self.seeded {
            self.history[self.next] = measured;
            self.next = (self.next + 1) % LEVEL_HISTORY;
        } else {
            self.history = [measured; LEVEL_HISTORY];
            self.next = 1;
            self.seeded = true;
        }

        let (centre, threshold) = self
            .history
            .iter()
            .fold((0i32, 0i32), |(c, t), l| (c + i32::from(l.centre), t + i32::from(l.threshold)));
        let n = LEVEL_HISTORY as i32;
        self.current = Levels::new((centre / n) as i16, (threshold / n) as i16);
    }

    /// Measure `count` symbols starting at `start` and fold the result in
    pub fn measure(&mut self, ring: &SampleRing, start: RingPos, count: usize, step: usize) {
        let centre = self.current.centre;
        if let Some(measured) = Levels::measure(ring.strided(start, count, step), centre) {
            self.update(measured);
        }
    }

    /// Slice one sample with the current levels
    #[inline]
    pub fn dibit(&self, sample: i16) -> u8 {
        self.current.dibit(sample, self.invert)
    }

    /// Slice `count` symbols starting at `start` into `out`, MSB first
    pub fn slice_into(
        &self,
        ring: &SampleRing,
        start: RingPos,
        count: usize,
        step: usize,
        out: &mut [u8],
    ) {
        let mut bits = BitsMut::new(out);
        for (i, s) in ring.strided(start, count, step).enumerate() {
            bits.set_dibit(i, self.dibit(s));
        }
    }
}

impl Default for AdaptiveSlicer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{LEVEL_A, LEVEL_B, LEVEL_C, LEVEL_D};

    #[test]
    fn test_dibit_regions() {
        let l = Levels::new(100, 900);
        assert_eq!(l.dibit(100 + 1362, false), 0b11);
        assert_eq!(l.dibit(100 + 454, false), 0b10);
        assert_eq!(l.dibit(100 - 454, false), 0b00);
        assert_eq!(l.dibit(100 - 1362, false), 0b01);
        // Boundaries
        assert_eq!(l.dibit(100, false), 0b10);
        assert_eq!(l.dibit(1000, false), 0b11);
        assert_eq!(l.dibit(-800, false), 0b00);
        assert_eq!(l.dibit(-801, false), 0b01);
    }

    #[test]
    fn test_dibit_inverted() {
        let l = Levels::new(0, 900);
        assert_eq!(l.dibit(LEVEL_D, true), 0b11);
        assert_eq!(l.dibit(LEVEL_C, true), 0b10);
        assert_eq!(l.dibit(LEVEL_B, true), 0b00);
        assert_eq!(l.dibit(LEVEL_A, true), 0b01);
    }

    #[test]
    fn test_measure_ideal_levels() {
        let samples = [LEVEL_A, LEVEL_B, LEVEL_C, LEVEL_D, LEVEL_B, LEVEL_C];
        let l = Levels::measure(samples, 0).unwrap();
        assert_eq!(l.centre, 0);
        assert_eq!(l.threshold, 908);
    }

    #[test]
    fn test_measure_with_offset() {
        let samples = [LEVEL_A, LEVEL_B, LEVEL_C, LEVEL_D].map(|s| s + 250);
        let l = Levels::measure(samples, 200).unwrap();
        assert_eq!(l.centre, 250);
        assert_eq!(l.threshold, 908);
    }

    #[test]
    fn test_measure_one_sided() {
        assert_eq!(Levels::measure([LEVEL_A, LEVEL_B], 0), None);
        assert_eq!(Levels::measure(core::iter::empty(), 0), None);
    }

    #[test]
    fn test_first_update_seeds_history() {
        let mut slicer = AdaptiveSlicer::new();
        slicer.start(Levels::new(0, 700), false);
        slicer.update(Levels::new(160, 800));
        assert_eq!(slicer.levels(), Levels::new(160, 800));
        slicer.update(Levels::new(0, 800));
        assert_eq!(slicer.levels(), Levels::new(150, 800));
    }

    #[test]
    fn test_history_rotates() {
        let mut slicer = AdaptiveSlicer::new();
        slicer.start(Levels::default(), false);
        slicer.update(Levels::new(0, 800));
        for _ in 0..LEVEL_HISTORY {
            slicer.update(Levels::new(32, 960));
        }
        assert_eq!(slicer.levels(), Levels::new(32, 960));
    }

    #[test]
    fn test_start_reseeds() {
        let mut slicer = AdaptiveSlicer::new();
        slicer.start(Levels::default(), false);
        slicer.update(Levels::new(500, 800));
        slicer.start(Levels::new(0, 700), true);
        assert!(slicer.inverted());
        slicer.update(Levels::new(-16, 900));
        assert_eq!(slicer.levels(), Levels::new(-16, 900));
    }

    #[test]
    fn test_slice_into() {
        let mut ring = SampleRing::new(64);
        let mut pos = ring.origin();
        // 0xB4 = 10 11 01 00, two samples per symbol
        for s in [LEVEL_B, LEVEL_A, LEVEL_D, LEVEL_C] {
            for _ in 0..2 {
                ring.put(pos, s);
                pos = ring.advance(pos, 1);
            }
        }
        let mut slicer = AdaptiveSlicer::new();
        slicer.start(Levels::new(0, 908), false);
        let mut out = [0u8; 1];
        slicer.slice_into(&ring, ring.origin(), 4, 2, &mut out);
        assert_eq!(out, [0xB4]);
    }
}
