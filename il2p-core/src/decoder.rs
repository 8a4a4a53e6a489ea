//! Frame decoding
//!
//! The inverse of [`crate::encoder`]: correct and descramble the header,
//! then the payload blocks, then check the optional CRC trailer. The sample
//! receiver drives the stages one at a time; the byte-domain helpers at the
//! bottom run them back to back.

use crate::checksum::verify_trailer;
use crate::constants::{CRC_LENGTH_BYTES, HEADER_LENGTH_BYTES, HEADER_PARITY_BYTES, HEADER_WIRE_BYTES};
use crate::error::Il2pError;
use crate::fec::{correct_block, BlockError, CodecBank};
use crate::framer::{decode_payload, BlockPlan};
use crate::header::{self, DecodedHeader, HeaderBytes};
use crate::scrambler::descramble;
use bytes::Bytes;
#[cfg(feature = "std")]
use std::io::Read;

#[cfg(feature = "logging")]
use tracing::trace;

/// A fully decoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Header fields
    pub header: DecodedHeader,

    /// Reconstructed AX.25 frame (header merged with payload)
    pub packet: Bytes,

    /// Symbols corrected across header and payload
    pub corrected: usize,

    /// Bytes the frame occupied after the sync word
    pub wire_len: usize,
}

/// Frame decoder holding the RS codecs
#[derive(Debug, Default)]
pub struct Decoder {
    codecs: CodecBank,
    crc: bool,
}

impl Decoder {
    /// Create a decoder; `crc` expects a trailer after the payload
    pub fn new(crc: bool) -> Self {
        Self {
            codecs: CodecBank::new(),
            crc,
        }
    }

    /// Whether a CRC trailer is expected
    pub fn crc_enabled(&self) -> bool {
        self.crc
    }

    /// Correct, descramble and translate the 15 header bytes
    ///
    /// Returns the header and the number of corrected symbols.
    pub fn decode_header(&self, wire: &[u8]) -> Result<(DecodedHeader, usize), Il2pError> {
        if wire.len() < HEADER_WIRE_BYTES {
            return Err(Il2pError::IncompleteFrame {
                expected: HEADER_WIRE_BYTES,
                actual: wire.len(),
            });
        }
        let codec = self
            .codecs
            .get(HEADER_PARITY_BYTES)
            .ok_or(Il2pError::HeaderFecFailure)?;

        let mut block = [0u8; HEADER_WIRE_BYTES];
        block.copy_from_slice(&wire[..HEADER_WIRE_BYTES]);
        let corrected = correct_block(codec, &mut block).map_err(|e| match e {
            BlockError::SpuriousCorrection(p) => Il2pError::SpuriousCorrection(p),
            BlockError::Uncorrectable | BlockError::BadLength(_) => Il2pError::HeaderFecFailure,
        })?;

        let mut raw: HeaderBytes = [0u8; HEADER_LENGTH_BYTES];
        raw.copy_from_slice(&block[..HEADER_LENGTH_BYTES]);
        descramble(&mut raw);
        let decoded = header::decode(&raw)?;

        #[cfg(feature = "logging")]
        trace!(
            "Header {:?}: {} payload bytes, {:?} FEC, {} corrected",
            decoded.kind,
            decoded.payload_len,
            decoded.fec,
            corrected
        );

        Ok((decoded, corrected))
    }

    /// Block layout of the payload that follows `header`
    pub fn plan(&self, header: &DecodedHeader) -> BlockPlan {
        BlockPlan::new(header.payload_len, header.fec)
    }

    /// Wire bytes after the header: payload blocks plus the trailer
    pub fn body_len(&self, header: &DecodedHeader) -> usize {
        let trailer = if self.crc { CRC_LENGTH_BYTES } else { 0 };
        self.plan(header).encoded_len() + trailer
    }

    /// Decode the payload blocks into `packet`
    ///
    /// `packet` receives the reconstructed AX.25 header followed by the
    /// payload. Returns the number of corrected symbols.
    pub fn decode_payload(
        &self,
        header: &DecodedHeader,
        wire: &[u8],
        packet: &mut [u8],
    ) -> Result<usize, Il2pError> {
        let ax25 = header.ax25_header();
        if packet.len() < header.packet_len() {
            return Err(Il2pError::IncompleteFrame {
                expected: header.packet_len(),
                actual: packet.len(),
            });
        }
        packet[..ax25.len()].copy_from_slice(ax25);
        let plan = self.plan(header);
        decode_payload(&self.codecs, &plan, wire, &mut packet[ax25.len()..])
    }

    /// Check a merged packet against its trailer
    pub fn check_trailer(&self, packet: &[u8], trailer: &[u8]) -> Result<(), Il2pError> {
        verify_trailer(packet, trailer)
    }

    /// Decode a complete frame from the bytes following a sync word
    pub fn decode_frame_from_bytes(&self, wire: &[u8]) -> Result<DecodedFrame, Il2pError> {
        let (header, header_fixed) = self.decode_header(wire)?;
        let body = &wire[HEADER_WIRE_BYTES..];
        let body_len = self.body_len(&header);
        if body.len() < body_len {
            return Err(Il2pError::IncompleteFrame {
                expected: HEADER_WIRE_BYTES + body_len,
                actual: wire.len(),
            });
        }

        let mut packet = alloc::vec![0u8; header.packet_len()];
        let payload_fixed = self.decode_payload(&header, body, &mut packet)?;
        if self.crc {
            let encoded = self.plan(&header).encoded_len();
            self.check_trailer(&packet, &body[encoded..encoded + CRC_LENGTH_BYTES])?;
        }

        Ok(DecodedFrame {
            header,
            packet: Bytes::from(packet),
            corrected: header_fixed + payload_fixed,
            wire_len: HEADER_WIRE_BYTES + body_len,
        })
    }

    /// Decode a complete frame from a reader positioned after a sync word
    #[cfg(feature = "std")]
    pub fn decode_frame<R: Read>(&self, reader: &mut R) -> Result<DecodedFrame, Il2pError> {
        let mut wire = alloc::vec![0u8; HEADER_WIRE_BYTES];
        reader.read_exact(&mut wire)?;
        let (header, _) = self.decode_header(&wire)?;
        wire.resize(HEADER_WIRE_BYTES + self.body_len(&header), 0);
        reader.read_exact(&mut wire[HEADER_WIRE_BYTES..])?;
        self.decode_frame_from_bytes(&wire)
    }
}

/// Decode one frame with a throwaway decoder
pub fn decode_frame_from_bytes(wire: &[u8], crc: bool) -> Result<DecodedFrame, Il2pError> {
    Decoder::new(crc).decode_frame_from_bytes(wire)
}
