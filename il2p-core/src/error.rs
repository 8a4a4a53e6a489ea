//! Error types for IL2P operations

use alloc::string::String;

/// Errors that can occur while coding or decoding IL2P frames
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum Il2pError {
    /// The header codeword could not be corrected
    #[cfg_attr(feature = "std", error("Header FEC failure"))]
    HeaderFecFailure,

    /// The header decoded cleanly but describes an impossible frame
    #[cfg_attr(feature = "std", error("Invalid header: {0}"))]
    HeaderSemanticInvalid(&'static str),

    /// A payload block could not be corrected
    #[cfg_attr(feature = "std", error("Payload FEC failure in block {0}"))]
    PayloadFecFailure(usize),

    /// The decoder "corrected" a symbol inside the zero padding
    #[cfg_attr(feature = "std", error("Spurious correction at padded symbol {0}"))]
    SpuriousCorrection(usize),

    /// Payload does not fit in the 10-bit length field
    #[cfg_attr(feature = "std", error("Payload size {0} exceeds maximum {1}"))]
    PayloadTooLarge(usize, usize),

    /// Not enough bytes to hold the frame
    #[cfg_attr(feature = "std", error("Incomplete frame: expected {expected} bytes, got {actual}"))]
    IncompleteFrame {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Trailing CRC does not match the decoded frame
    #[cfg_attr(feature = "std", error("Checksum mismatch: expected {expected:04x}, got {actual:04x}"))]
    ChecksumMismatch {
        /// The CRC carried in the trailer.
        expected: u16,
        /// The CRC computed over the decoded frame.
        actual: u16,
    },

    /// Callsign cannot be represented in an AX.25 address
    #[cfg_attr(feature = "std", error("Invalid callsign: {0}"))]
    InvalidCallsign(String),

    /// Bytes do not form a parseable AX.25 frame
    #[cfg_attr(feature = "std", error("Malformed AX.25 frame: {0}"))]
    MalformedAx25(&'static str),

    /// Modem parameters are inconsistent
    #[cfg_attr(feature = "std", error("Invalid configuration: {0}"))]
    InvalidConfig(String),

    /// Transmit FIFO cannot take the frame
    #[cfg_attr(feature = "std", error("TX FIFO full: need {needed} bytes, {available} available"))]
    FifoFull {
        /// Bytes the frame needs, including sync and spacer.
        needed: usize,
        /// Free bytes left in the FIFO.
        available: usize,
    },

    /// IO error during read/write
    #[cfg_attr(feature = "std", error("IO error: {0}"))]
    Io(String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Il2pError {
    fn from(err: std::io::Error) -> Self {
        Il2pError::Io(err.to_string())
    }
}
