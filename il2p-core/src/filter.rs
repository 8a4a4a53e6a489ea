//! Q15 FIR filters for pulse shaping
//!
//! The transmit path upsamples each symbol level through a polyphase
//! [`Interpolator`]; the receive path runs every incoming sample through a
//! matched [`FirFilter`]. Both accumulate in 64 bits, shift right by 15 and
//! saturate to `i16`.

use alloc::vec;
use alloc::vec::Vec;

fn q15(acc: i64) -> i16 {
    (acc >> 15).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Stateful single-rate FIR filter
///
/// Computes `y[n] = sum(h[k] * x[n-k]) >> 15` over a circular delay line.
#[derive(Debug, Clone)]
pub struct FirFilter {
    taps: Vec<i16>,
    delay_line: Vec<i16>,
    write_pos: usize,
}

impl FirFilter {
    /// Filter where `taps[k]` weights the input `k` samples back
    pub fn new(taps: &[i16]) -> Self {
        let taps = if taps.is_empty() { vec![0] } else { taps.to_vec() };
        Self {
            delay_line: vec![0; taps.len()],
            taps,
            write_pos: 0,
        }
    }

    /// Filter one sample
    pub fn push(&mut self, x: i16) -> i16 {
        let n = self.delay_line.len();
        self.delay_line[self.write_pos] = x;

        let mut acc = 0i64;
        for (k, &h) in self.taps.iter().enumerate() {
            let idx = (self.write_pos + n - k) % n;
            acc += i64::from(h) * i64::from(self.delay_line[idx]);
        }

        self.write_pos = (self.write_pos + 1) % n;
        q15(acc)
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.delay_line.fill(0);
        self.write_pos = 0;
    }
}

/// Polyphase interpolating FIR filter
///
/// Each input produces `factor` outputs. Arm `j` holds taps
/// `h[j], h[j + factor], ...` and yields output phase `j`.
#[derive(Debug, Clone)]
pub struct Interpolator {
    factor: usize,
    arms: Vec<Vec<i16>>,
    delay_line: Vec<i16>,
    write_pos: usize,
}

impl Interpolator {
    /// Interpolate by `factor` through prototype `taps`
    pub fn new(factor: usize, taps: &[i16]) -> Self {
        let factor = factor.max(1);
        let per_arm = ((taps.len() + factor - 1) / factor).max(1);

        let mut arms = vec![vec![0; per_arm]; factor];
        for (i, &t) in taps.iter().enumerate() {
            arms[i % factor][i / factor] = t;
        }

        Self {
            factor,
            arms,
            delay_line: vec![0; per_arm],
            write_pos: 0,
        }
    }

    /// Outputs produced per input
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Push one input and write `factor` outputs into `out`
    pub fn push(&mut self, x: i16, out: &mut [i16]) {
        let n = self.delay_line.len();
        self.delay_line[self.write_pos] = x;

        for (arm, y) in self.arms.iter().zip(out.iter_mut()) {
            let mut acc = 0i64;
            for (k, &h) in arm.iter().enumerate() {
                let idx = (self.write_pos + n - k) % n;
                acc += i64::from(h) * i64::from(self.delay_line[idx]);
            }
            *y = q15(acc);
        }

        self.write_pos = (self.write_pos + 1) % n;
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.delay_line.fill(0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{RRC_RX_TAPS, RRC_SYMBOL_LENGTH, RRC_TX_TAPS};

    #[test]
    fn test_fir_impulse_response() {
        let mut fir = FirFilter::new(&RRC_RX_TAPS);
        let mut response = vec![fir.push(i16::MAX)];
        response.extend((1..RRC_RX_TAPS.len()).map(|_| fir.push(0)));
        for (y, h) in response.iter().zip(RRC_RX_TAPS.iter()) {
            assert!((y - h).abs() <= 1, "{} vs {}", y, h);
        }
        // Delay line flushed
        assert_eq!(fir.push(0), 0);
    }

    #[test]
    fn test_fir_dc_gain() {
        let mut fir = FirFilter::new(&RRC_RX_TAPS);
        let mut last = 0;
        for _ in 0..100 {
            last = fir.push(200);
        }
        assert_eq!(last, 442);
    }

    #[test]
    fn test_fir_saturates() {
        let mut fir = FirFilter::new(&[i16::MAX, i16::MAX, i16::MAX]);
        fir.push(i16::MAX);
        fir.push(i16::MAX);
        assert_eq!(fir.push(i16::MAX), i16::MAX);
        fir.reset();
        assert_eq!(fir.push(i16::MIN), i16::MIN + 1);
    }

    #[test]
    fn test_interpolator_impulse_response() {
        let mut interp = Interpolator::new(RRC_SYMBOL_LENGTH, &RRC_TX_TAPS);
        let mut response = Vec::new();
        let mut chunk = [0i16; RRC_SYMBOL_LENGTH];
        interp.push(i16::MAX, &mut chunk);
        response.extend_from_slice(&chunk);
        for _ in 0..RRC_TX_TAPS.len() / RRC_SYMBOL_LENGTH {
            interp.push(0, &mut chunk);
            response.extend_from_slice(&chunk);
        }
        for (y, h) in response.iter().zip(RRC_TX_TAPS.iter()) {
            assert!((y - h).abs() <= 1, "{} vs {}", y, h);
        }
        assert!(response[RRC_TX_TAPS.len()..].iter().all(|&y| y == 0));
    }

    #[test]
    fn test_shaped_and_matched_levels() {
        // Pseudo-random symbols at half scale through both filters
        let levels = [681i16, 227, -227, -681];
        let mut state = 0x1234_5678u32;
        let symbols: Vec<i16> = (0..400)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                levels[(state & 3) as usize]
            })
            .collect();

        let mut interp = Interpolator::new(RRC_SYMBOL_LENGTH, &RRC_TX_TAPS);
        let mut fir = FirFilter::new(&RRC_RX_TAPS);
        let mut rx = Vec::new();
        let mut chunk = [0i16; RRC_SYMBOL_LENGTH];
        for &s in &symbols {
            interp.push(s, &mut chunk);
            rx.extend(chunk.iter().map(|&x| fir.push(x)));
        }

        // Each symbol peaks eight symbols after it was sent
        let delay = 8 * RRC_SYMBOL_LENGTH;
        for (i, &s) in symbols.iter().enumerate().skip(20).take(360) {
            let y = rx[i * RRC_SYMBOL_LENGTH + delay];
            match s {
                681 => assert!((1300..1600).contains(&y), "{}", y),
                227 => assert!((350..650).contains(&y), "{}", y),
                -227 => assert!((-650..-350).contains(&y), "{}", y),
                _ => assert!((-1600..-1300).contains(&y), "{}", y),
            }
        }
    }
}
