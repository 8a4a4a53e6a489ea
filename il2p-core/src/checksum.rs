//! Trailing CRC for IL2P+CRC mode
//!
//! The CRC is the AX.25 frame check sequence (CRC-16/X.25) of the complete
//! AX.25 frame. Each of its four nibbles is sent as a Hamming(7,4) codeword,
//! most significant nibble first. The trailer is not scrambled and carries no
//! RS parity.

use crate::constants::CRC_LENGTH_BYTES;
use crate::error::Il2pError;
use crc::{Crc, CRC_16_IBM_SDLC};

const AX25_FCS: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Hamming(7,4) codewords indexed by data nibble
const HAMMING_ENCODE: [u8; 16] = [
    0x00, 0x71, 0x62, 0x13, 0x54, 0x25, 0x36, 0x47, 0x38, 0x49, 0x5a, 0x2b, 0x6c, 0x1d, 0x0e,
    0x7f,
];

/// AX.25 FCS of a frame
pub fn frame_crc(frame: &[u8]) -> u16 {
    AX25_FCS.checksum(frame)
}

/// Hamming-coded trailer for a frame
pub fn encode_trailer(frame: &[u8]) -> [u8; CRC_LENGTH_BYTES] {
    let crc = frame_crc(frame);
    let mut out = [0u8; CRC_LENGTH_BYTES];
    for (i, o) in out.iter_mut().enumerate() {
        let nibble = (crc >> (12 - 4 * i)) & 0x0F;
        *o = HAMMING_ENCODE[nibble as usize];
    }
    out
}

/// Nearest nibble for a received codeword, allowing one bit error
fn hamming_decode(byte: u8) -> Option<u8> {
    let received = byte & 0x7F;
    HAMMING_ENCODE
        .iter()
        .position(|&cw| (cw ^ received).count_ones() <= 1)
        .map(|n| n as u8)
}

/// Recover the CRC carried in a trailer
pub fn decode_trailer(trailer: &[u8]) -> Result<u16, Il2pError> {
    if trailer.len() < CRC_LENGTH_BYTES {
        return Err(Il2pError::IncompleteFrame {
            expected: CRC_LENGTH_BYTES,
            actual: trailer.len(),
        });
    }
    trailer[..CRC_LENGTH_BYTES].iter().try_fold(0u16, |acc, &b| {
        let nibble = hamming_decode(b).ok_or(Il2pError::ChecksumMismatch {
            expected: acc,
            actual: 0,
        })?;
        Ok(acc << 4 | u16::from(nibble))
    })
}

/// Check a decoded frame against its trailer
pub fn verify_trailer(frame: &[u8], trailer: &[u8]) -> Result<(), Il2pError> {
    let expected = decode_trailer(trailer)?;
    let actual = frame_crc(frame);
    if expected != actual {
        return Err(Il2pError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
