//! Bit-addressable views over byte buffers
//!
//! Bit 0 is the most significant bit of the first byte, matching the order
//! in which bits go on air.

/// Read-only bit view
#[derive(Debug, Clone, Copy)]
pub struct Bits<'a> {
    bytes: &'a [u8],
}

impl<'a> Bits<'a> {
    /// Wrap a byte slice
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Number of addressable bits
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// True when the view holds no bits
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bit at `index`
    ///
    /// # Panics
    /// If `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        (self.bytes[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// Symbol `index` as a dibit (two bits, first bit in the high position)
    #[inline]
    pub fn dibit(&self, index: usize) -> u8 {
        let byte = self.bytes[index >> 2];
        (byte >> (6 - 2 * (index & 3))) & 0x03
    }

    /// Iterate bits in transmission order
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        let bytes = self.bytes;
        (0..bytes.len() * 8).map(move |i| (bytes[i >> 3] >> (7 - (i & 7))) & 1 != 0)
    }
}

/// Mutable bit view
#[derive(Debug)]
pub struct BitsMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> BitsMut<'a> {
    /// Wrap a mutable byte slice
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Number of addressable bits
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// True when the view holds no bits
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bit at `index`
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        (self.bytes[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// Set bit `index` to `value`
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        let mask = 0x80u8 >> (index & 7);
        if value {
            self.bytes[index >> 3] |= mask;
        } else {
            self.bytes[index >> 3] &= !mask;
        }
    }

    /// Store a dibit at symbol position `index`
    #[inline]
    pub fn set_dibit(&mut self, index: usize, dibit: u8) {
        let shift = 6 - 2 * (index & 3);
        let byte = &mut self.bytes[index >> 2];
        *byte = (*byte & !(0x03 << shift)) | ((dibit & 0x03) << shift);
    }
}

/// Number of differing bits between two equal-length byte strings
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}
