//! Payload block partitioning and per-block scrambling + FEC
//!
//! A payload of `L` bytes is split into `ceil(L / D)` blocks whose sizes
//! differ by at most one byte; the larger blocks go first. Every block is
//! scrambled and then RS-encoded on transmit, and corrected then descrambled
//! on receive.

use crate::constants::{
    MAX_FEC_BLOCK_DATA, MAX_NROOTS, NORMAL_FEC_BLOCK_DATA, RS_BLOCK_LENGTH,
};
use crate::error::Il2pError;
use crate::fec::{correct_block, BlockCodec, BlockError, CodecBank};
use crate::scrambler::{descramble, scramble};
use crate::types::FecLevel;
use bytes::{BufMut, BytesMut};

#[cfg(feature = "logging")]
use tracing::trace;

/// Block layout for one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockPlan {
    /// Payload bytes covered by the plan
    pub payload_len: usize,
    /// Total blocks
    pub block_count: usize,
    /// Data bytes in a small block
    pub small_block_size: usize,
    /// Data bytes in a large block
    pub large_block_size: usize,
    /// Number of large blocks (sent first)
    pub large_block_count: usize,
    /// Number of small blocks
    pub small_block_count: usize,
    /// Parity symbols appended to every block
    pub parity_per_block: usize,
}

impl BlockPlan {
    /// Partition `payload_len` bytes for the given FEC density
    pub fn new(payload_len: usize, fec: FecLevel) -> Self {
        if payload_len == 0 {
            return Self::default();
        }
        let divisor = match fec {
            FecLevel::Max => MAX_FEC_BLOCK_DATA,
            FecLevel::Normal => NORMAL_FEC_BLOCK_DATA,
        };
        let block_count = payload_len.div_ceil(divisor);
        let small_block_size = payload_len / block_count;
        let large_block_size = small_block_size + 1;
        let large_block_count = payload_len - block_count * small_block_size;
        let small_block_count = block_count - large_block_count;

        let parity_per_block = match fec {
            FecLevel::Max => MAX_NROOTS,
            FecLevel::Normal => {
                // The longest block must still fit a 255 symbol codeword.
                let longest = if large_block_count > 0 {
                    large_block_size
                } else {
                    small_block_size
                };
                (small_block_size / 32 + 2).min(RS_BLOCK_LENGTH - longest)
            }
        };

        Self {
            payload_len,
            block_count,
            small_block_size,
            large_block_size,
            large_block_count,
            small_block_count,
            parity_per_block,
        }
    }

    /// Data size of each block in transmission order
    pub fn block_sizes(&self) -> impl Iterator<Item = usize> {
        let large = core::iter::repeat(self.large_block_size).take(self.large_block_count);
        let small = core::iter::repeat(self.small_block_size).take(self.small_block_count);
        large.chain(small)
    }

    /// Total parity bytes
    pub fn parity_len(&self) -> usize {
        self.block_count * self.parity_per_block
    }

    /// Bytes on the wire for the whole payload
    pub fn encoded_len(&self) -> usize {
        self.payload_len + self.parity_len()
    }
}

/// Scramble and FEC-encode a payload, appending blocks to `out`
pub fn encode_payload(
    codecs: &CodecBank,
    plan: &BlockPlan,
    payload: &[u8],
    out: &mut BytesMut,
) -> Result<(), Il2pError> {
    if payload.len() != plan.payload_len {
        return Err(Il2pError::IncompleteFrame {
            expected: plan.payload_len,
            actual: payload.len(),
        });
    }
    if plan.block_count == 0 {
        return Ok(());
    }
    let codec = codecs
        .get(plan.parity_per_block)
        .ok_or(Il2pError::HeaderSemanticInvalid("unsupported parity count"))?;

    let mut block = [0u8; RS_BLOCK_LENGTH];
    let mut parity = [0u8; MAX_NROOTS];
    let mut offset = 0;
    for size in plan.block_sizes() {
        let data = &mut block[..size];
        data.copy_from_slice(&payload[offset..offset + size]);
        scramble(data);
        codec.encode(data, &mut parity[..plan.parity_per_block]);
        out.put_slice(data);
        out.put_slice(&parity[..plan.parity_per_block]);
        offset += size;
    }
    Ok(())
}

/// Correct and descramble a payload
///
/// `wire` holds the encoded blocks (`plan.encoded_len()` bytes); the payload
/// is written to `out[..plan.payload_len]`. Returns the total number of
/// corrected symbols.
pub fn decode_payload(
    codecs: &CodecBank,
    plan: &BlockPlan,
    wire: &[u8],
    out: &mut [u8],
) -> Result<usize, Il2pError> {
    if wire.len() < plan.encoded_len() || out.len() < plan.payload_len {
        return Err(Il2pError::IncompleteFrame {
            expected: plan.encoded_len(),
            actual: wire.len(),
        });
    }
    if plan.block_count == 0 {
        return Ok(0);
    }
    let codec = codecs
        .get(plan.parity_per_block)
        .ok_or(Il2pError::HeaderSemanticInvalid("unsupported parity count"))?;

    let mut codeword = [0u8; RS_BLOCK_LENGTH];
    let mut read = 0;
    let mut written = 0;
    let mut corrected = 0;
    for (index, size) in plan.block_sizes().enumerate() {
        let len = size + plan.parity_per_block;
        let block = &mut codeword[..len];
        block.copy_from_slice(&wire[read..read + len]);

        let fixed = correct_block(codec, block).map_err(|e| match e {
            BlockError::SpuriousCorrection(p) => Il2pError::SpuriousCorrection(p),
            BlockError::Uncorrectable | BlockError::BadLength(_) => {
                Il2pError::PayloadFecFailure(index)
            }
        })?;
        #[cfg(feature = "logging")]
        if fixed > 0 {
            trace!("Block {}: corrected {} symbols", index, fixed);
        }
        corrected += fixed;

        let data = &mut block[..size];
        descramble(data);
        out[written..written + size].copy_from_slice(data);
        read += len;
        written += size;
    }
    Ok(corrected)
}
