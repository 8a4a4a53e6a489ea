//! Reed-Solomon block codec
//!
//! IL2P uses the systematic RS code over GF(2^8) with field polynomial 0x11d,
//! first consecutive root 0 and primitive element 2. Shortened blocks are
//! treated as full 255 symbol codewords with leading zeros.

use crate::constants::{MAX_NROOTS, RS_BLOCK_LENGTH};
use core::fmt;
use reed_solomon::{Decoder, Encoder};

/// Why a block could not be corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// More symbol errors than the parity can fix
    Uncorrectable,
    /// A correction landed in the zero-extended region at this index
    SpuriousCorrection(usize),
    /// Block length does not fit a codeword with this parity
    BadLength(usize),
}

/// Symbols a decoder changed in one codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Corrections {
    count: usize,
    positions: [u8; MAX_NROOTS],
}

impl Corrections {
    fn push(&mut self, position: usize) {
        if self.count < MAX_NROOTS {
            self.positions[self.count] = position as u8;
        }
        self.count += 1;
    }

    /// Number of corrected symbols
    pub fn count(&self) -> usize {
        self.count
    }

    /// Codeword indices that were corrected
    pub fn positions(&self) -> &[u8] {
        &self.positions[..self.count.min(MAX_NROOTS)]
    }
}

/// A systematic block code
pub trait BlockCodec {
    /// Parity symbols appended to each block
    fn nroots(&self) -> usize;

    /// Compute parity for `data` into `parity` (`parity.len() == nroots`)
    fn encode(&self, data: &[u8], parity: &mut [u8]);

    /// Correct a codeword in place, returning the corrected positions
    fn decode(&self, codeword: &mut [u8]) -> Result<Corrections, BlockError>;
}

/// Reed-Solomon codec with a fixed number of roots
pub struct RsCodec {
    nroots: usize,
    encoder: Encoder,
    decoder: Decoder,
}

impl RsCodec {
    /// Build a codec with `nroots` parity symbols
    pub fn new(nroots: usize) -> Self {
        Self {
            nroots,
            encoder: Encoder::new(nroots),
            decoder: Decoder::new(nroots),
        }
    }
}

impl fmt::Debug for RsCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsCodec").field("nroots", &self.nroots).finish()
    }
}

impl BlockCodec for RsCodec {
    fn nroots(&self) -> usize {
        self.nroots
    }

    fn encode(&self, data: &[u8], parity: &mut [u8]) {
        let buffer = self.encoder.encode(data);
        parity.copy_from_slice(buffer.ecc());
    }

    fn decode(&self, codeword: &mut [u8]) -> Result<Corrections, BlockError> {
        let len = codeword.len();
        if len > RS_BLOCK_LENGTH || len <= self.nroots {
            return Err(BlockError::BadLength(len));
        }
        let data_len = len - self.nroots;
        let mut received = [0u8; RS_BLOCK_LENGTH];
        received[..len].copy_from_slice(codeword);

        let corrected = self
            .decoder
            .correct(&mut *codeword, None)
            .map_err(|_| BlockError::Uncorrectable)?;

        let mut corrections = Corrections::default();
        let fixed = corrected.data().iter().chain(corrected.ecc().iter());
        for (i, (&old, &new)) in received[..len].iter().zip(fixed).enumerate() {
            if old != new {
                corrections.push(i);
            }
        }
        if corrections.count() > self.nroots / 2 {
            return Err(BlockError::Uncorrectable);
        }

        codeword[..data_len].copy_from_slice(corrected.data());
        codeword[data_len..].copy_from_slice(corrected.ecc());
        Ok(corrections)
    }
}

/// One codec per parity count, built once
pub struct CodecBank {
    codecs: [RsCodec; MAX_NROOTS],
}

impl CodecBank {
    /// Build codecs for 1 through 16 roots
    pub fn new() -> Self {
        Self {
            codecs: core::array::from_fn(|i| RsCodec::new(i + 1)),
        }
    }

    /// Codec with `nroots` parity symbols
    pub fn get(&self, nroots: usize) -> Option<&RsCodec> {
        nroots.checked_sub(1).and_then(|i| self.codecs.get(i))
    }
}

impl Default for CodecBank {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecBank").field("codecs", &MAX_NROOTS).finish()
    }
}

/// Correct a shortened block in place
///
/// `block` holds data followed by parity. The block is zero-extended to a
/// full codeword before decoding; a correction that lands in the extension
/// is rejected as [`BlockError::SpuriousCorrection`]. Returns the number of
/// corrected symbols.
pub fn correct_block<C: BlockCodec + ?Sized>(
    codec: &C,
    block: &mut [u8],
) -> Result<usize, BlockError> {
    if block.len() > RS_BLOCK_LENGTH || block.len() <= codec.nroots() {
        return Err(BlockError::BadLength(block.len()));
    }

    let pad = RS_BLOCK_LENGTH - block.len();
    let mut codeword = [0u8; RS_BLOCK_LENGTH];
    codeword[pad..].copy_from_slice(block);

    let corrections = codec.decode(&mut codeword)?;
    if let Some(&p) = corrections.positions().iter().find(|&&p| (p as usize) < pad) {
        return Err(BlockError::SpuriousCorrection(p as usize));
    }

    block.copy_from_slice(&codeword[pad..]);
    Ok(corrections.count())
}
