//! IL2P frame encoding
//!
//! Turns an AX.25 frame (without FCS) into the bytes that follow the sync
//! word: the FEC-protected header, the payload blocks and, optionally, the
//! CRC trailer.

use crate::checksum::encode_trailer;
use crate::constants::{CRC_LENGTH_BYTES, HEADER_PARITY_BYTES, HEADER_WIRE_BYTES};
use crate::error::Il2pError;
use crate::fec::{BlockCodec, CodecBank};
use crate::framer::{encode_payload, BlockPlan};
use crate::header::{self, HeaderBytes};
use crate::scrambler::scramble;
use crate::types::{FecLevel, HeaderType};
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::trace;

/// Options that shape an encoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Payload FEC density
    pub fec: FecLevel,
    /// Append the Hamming-coded CRC trailer
    pub crc: bool,
}

/// Frame encoder holding the RS codecs
#[derive(Debug, Default)]
pub struct Encoder {
    codecs: CodecBank,
    options: EncodeOptions,
}

impl Encoder {
    /// Create an encoder
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            codecs: CodecBank::new(),
            options,
        }
    }

    /// Options in use
    pub fn options(&self) -> EncodeOptions {
        self.options
    }

    /// Encode a frame into a new buffer
    pub fn encode(&self, ax25: &[u8]) -> Result<Bytes, Il2pError> {
        let mut out = BytesMut::with_capacity(self.encoded_len_hint(ax25.len()));
        self.encode_into(ax25, &mut out)?;
        Ok(out.freeze())
    }

    /// Encode a frame, appending to `out`; returns the bytes written
    pub fn encode_into(&self, ax25: &[u8], out: &mut BytesMut) -> Result<usize, Il2pError> {
        let start = out.len();
        let transcoded = header::encode(ax25, self.options.fec)?;
        let plan = BlockPlan::new(transcoded.payload.len(), self.options.fec);

        #[cfg(feature = "logging")]
        trace!(
            "Encoding {:?} frame: payload {} bytes in {} blocks",
            transcoded.kind,
            plan.payload_len,
            plan.block_count
        );

        encode_header(&self.codecs, &transcoded.header, out)?;
        encode_payload(&self.codecs, &plan, transcoded.payload, out)?;
        if self.options.crc {
            out.put_slice(&encode_trailer(ax25));
        }
        Ok(out.len() - start)
    }

    /// Variant a frame would be sent as
    pub fn header_type(&self, ax25: &[u8]) -> Result<HeaderType, Il2pError> {
        Ok(header::encode(ax25, self.options.fec)?.kind)
    }

    fn encoded_len_hint(&self, ax25_len: usize) -> usize {
        let plan = BlockPlan::new(ax25_len, self.options.fec);
        HEADER_WIRE_BYTES + plan.encoded_len() + CRC_LENGTH_BYTES
    }
}

/// Scramble and FEC-protect a transcoded header, appending 15 bytes to `out`
pub fn encode_header(
    codecs: &CodecBank,
    header: &HeaderBytes,
    out: &mut BytesMut,
) -> Result<(), Il2pError> {
    let codec = codecs
        .get(HEADER_PARITY_BYTES)
        .ok_or(Il2pError::HeaderSemanticInvalid("unsupported parity count"))?;
    let mut scrambled = *header;
    scramble(&mut scrambled);
    let mut parity = [0u8; HEADER_PARITY_BYTES];
    codec.encode(&scrambled, &mut parity);
    out.put_slice(&scrambled);
    out.put_slice(&parity);
    Ok(())
}

/// Encode one frame with a throwaway encoder
pub fn encode_frame(ax25: &[u8], options: EncodeOptions) -> Result<Bytes, Il2pError> {
    Encoder::new(options).encode(ax25)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, FrameBuilder};

    #[test]
    fn test_encode_published_rr() {
        let ax25 = hex::decode("968264888aaee4969668908a946fb1").unwrap();
        let wire = encode_frame(&ax25, EncodeOptions::default()).unwrap();
        assert_eq!(
            hex::encode(&wire),
            "26574d57f196cc8542e724f72e8a97"
        );
    }

    #[test]
    fn test_encoded_length() {
        let ax25 = FrameBuilder::new(
            Address::parse_text("APRS").unwrap(),
            Address::parse_text("N0CALL").unwrap(),
        )
        .info(&[0x55; 500])
        .build();
        let encoder = Encoder::new(EncodeOptions {
            fec: FecLevel::Max,
            crc: true,
        });
        let wire = encoder.encode(&ax25).unwrap();
        // 3 blocks of 16 parity, plus header and trailer
        assert_eq!(wire.len(), 15 + 500 + 48 + 4);
    }

    #[test]
    fn test_type0_carries_whole_frame() {
        let ax25 = [0xAB; 30];
        let encoder = Encoder::new(EncodeOptions::default());
        assert_eq!(encoder.header_type(&ax25).unwrap(), HeaderType::Type0);
        let wire = encoder.encode(&ax25).unwrap();
        // 30 bytes: one block, 30/32 + 2 = 2 parity
        assert_eq!(wire.len(), 15 + 30 + 2);
    }

    #[test]
    fn test_encode_into_appends() {
        let encoder = Encoder::new(EncodeOptions::default());
        let mut out = BytesMut::from(&b"prefix"[..]);
        let n = encoder.encode_into(&[0x01, 0x02], &mut out).unwrap();
        assert_eq!(out.len(), 6 + n);
        assert_eq!(&out[..6], b"prefix");
    }
}
