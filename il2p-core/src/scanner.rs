//! Byte-domain scanner for captured IL2P streams
//!
//! Works on already sliced, byte-aligned data such as a demodulator dump or
//! the output of [`crate::encoder`]. Sync words are located with up to
//! [`MAX_SYNC_BIT_ERRORS`] bit errors and a frame decode is attempted after
//! each one.

use crate::bits::hamming_distance;
use crate::config::SyncKind;
use crate::constants::MAX_SYNC_BIT_ERRORS;
use crate::decoder::{DecodedFrame, Decoder};
use crate::error::Il2pError;
use alloc::vec::Vec;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// A frame found at a specific offset in the stream
#[derive(Debug, Clone)]
pub struct LocatedFrame {
    /// Byte offset of the sync word
    pub offset: usize,

    /// The decoded frame
    pub frame: DecodedFrame,

    /// Sync word plus frame, in bytes
    pub size: usize,
}

/// What to look for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Frames carry the CRC trailer
    pub crc: bool,
    /// Sync word preceding each frame
    pub sync: SyncKind,
}

/// Scan statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanStats {
    /// Total bytes scanned
    pub bytes_scanned: usize,

    /// Number of valid frames found
    pub frames_found: usize,

    /// Number of sync words found
    pub syncs_found: usize,

    /// Number of decode failures
    pub decode_failures: usize,

    /// Total bytes recovered (sum of all valid frame sizes)
    pub bytes_recovered: usize,

    /// RS symbols corrected across all recovered frames
    pub corrected_symbols: usize,
}

impl ScanStats {
    /// Calculate recovery rate as a percentage
    pub fn recovery_rate(&self) -> f64 {
        if self.bytes_scanned == 0 {
            0.0
        } else {
            (self.bytes_recovered as f64 / self.bytes_scanned as f64) * 100.0
        }
    }
}

/// Scan a byte stream for IL2P frames
pub fn scan_stream(data: &[u8], options: &ScanOptions) -> Vec<LocatedFrame> {
    scan_stream_with_stats(data, options).0
}

/// Scan stream with statistics
pub fn scan_stream_with_stats(data: &[u8], options: &ScanOptions) -> (Vec<LocatedFrame>, ScanStats) {
    let sync = options.sync.bytes();
    let decoder = Decoder::new(options.crc);
    let mut stats = ScanStats {
        bytes_scanned: data.len(),
        ..Default::default()
    };
    let mut results = Vec::new();
    let mut pos = 0;

    #[cfg(feature = "logging")]
    debug!("Starting stream scan of {} bytes", data.len());

    while let Some(rel) = find_sync(&data[pos..], sync) {
        let at = pos + rel;
        stats.syncs_found += 1;

        match try_decode_at_offset(&decoder, data, at, sync.len()) {
            Ok(located) => {
                #[cfg(feature = "logging")]
                debug!(
                    "Decoded frame at offset {} ({} bytes, {} corrected)",
                    located.offset, located.size, located.frame.corrected
                );
                stats.bytes_recovered += located.size;
                stats.corrected_symbols += located.frame.corrected;
                pos = at + located.size;
                results.push(located);
            }
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!("Failed to decode frame at offset {}: {:?}", at, _e);
                stats.decode_failures += 1;
                pos = at + 1;
            }
        }
    }

    stats.frames_found = results.len();

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: {} frames from {} sync words in {} bytes",
        stats.frames_found, stats.syncs_found, stats.bytes_scanned
    );

    (results, stats)
}

/// Offset of the first window within [`MAX_SYNC_BIT_ERRORS`] of `sync`
pub fn find_sync(data: &[u8], sync: &[u8]) -> Option<usize> {
    if data.len() < sync.len() {
        return None;
    }
    // Exact hits are the common case; only the prefix before one needs the
    // slower tolerant search.
    let exact = memchr::memmem::find(data, sync);
    let limit = exact.unwrap_or(data.len() - sync.len() + 1);
    data[..limit + sync.len() - 1]
        .windows(sync.len())
        .position(|window| hamming_distance(window, sync) <= MAX_SYNC_BIT_ERRORS)
        .or(exact)
}

fn try_decode_at_offset(
    decoder: &Decoder,
    data: &[u8],
    offset: usize,
    sync_len: usize,
) -> Result<LocatedFrame, Il2pError> {
    let frame = decoder.decode_frame_from_bytes(&data[offset + sync_len..])?;
    Ok(LocatedFrame {
        offset,
        size: sync_len + frame.wire_len,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PREAMBLE_BYTE, SYNC_WORD_LONG, SYNC_WORD_SHORT};
    use crate::encoder::{EncodeOptions, Encoder};
    use crate::types::{Address, FrameBuilder};
    use bytes::Bytes;

    fn frame(info: &[u8]) -> Bytes {
        FrameBuilder::new(
            Address::parse_text("CQ").unwrap(),
            Address::parse_text("N0CALL").unwrap(),
        )
        .info(info)
        .build()
    }

    fn on_air(frames: &[&[u8]], crc: bool, sync: &[u8]) -> Vec<u8> {
        let encoder = Encoder::new(EncodeOptions {
            crc,
            ..Default::default()
        });
        let mut stream = vec![PREAMBLE_BYTE; 8];
        for f in frames {
            stream.extend_from_slice(sync);
            stream.extend_from_slice(&encoder.encode(f).unwrap());
            stream.extend_from_slice(&[PREAMBLE_BYTE; 10]);
        }
        stream
    }

    #[test]
    fn test_scan_clean_stream() {
        let (a, b, c) = (frame(b"frame 1"), frame(b"frame 2"), frame(b"frame 3"));
        let stream = on_air(&[&a, &b, &c], false, SYNC_WORD_LONG);

        let results = scan_stream(&stream, &ScanOptions::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].offset, 8);
        assert_eq!(results[0].frame.packet, a);
        assert_eq!(results[1].frame.packet, b);
        assert_eq!(results[2].frame.packet, c);
    }

    #[test]
    fn test_scan_with_garbage_between() {
        let (a, b) = (frame(b"first"), frame(b"second"));
        let mut stream = on_air(&[&a], false, SYNC_WORD_LONG);
        stream.extend_from_slice(b"GARBAGE DATA HERE!!!");
        stream.extend_from_slice(&on_air(&[&b], false, SYNC_WORD_LONG));

        let results = scan_stream(&stream, &ScanOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].frame.packet, b);
    }

    #[test]
    fn test_sync_with_bit_errors() {
        let a = frame(b"noisy sync");
        let mut stream = on_air(&[&a], false, SYNC_WORD_LONG);
        stream[8] ^= 0x40;
        stream[12] ^= 0x01;
        let results = scan_stream(&stream, &ScanOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].offset, 8);

        stream[10] ^= 0x10;
        assert!(scan_stream(&stream, &ScanOptions::default()).is_empty());
    }

    #[test]
    fn test_find_sync_prefers_earlier_tolerant_hit() {
        let mut data = vec![0u8; 4];
        let mut damaged = SYNC_WORD_SHORT.to_vec();
        damaged[0] ^= 0x01;
        data.extend_from_slice(&damaged);
        data.extend_from_slice(SYNC_WORD_SHORT);
        assert_eq!(find_sync(&data, SYNC_WORD_SHORT), Some(4));
        assert_eq!(find_sync(&data[..3], SYNC_WORD_SHORT), None);
    }

    #[test]
    fn test_short_sync_with_crc() {
        let a = frame(&[0x5A; 300]);
        let stream = on_air(&[&a], true, SYNC_WORD_SHORT);
        let options = ScanOptions {
            crc: true,
            sync: SyncKind::Short,
        };
        let (results, stats) = scan_stream_with_stats(&stream, &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].frame.packet, a);
        assert_eq!(stats.bytes_recovered, results[0].size);
    }

    #[test]
    fn test_scan_stats() {
        let a = frame(b"test");
        let stream = on_air(&[&a], false, SYNC_WORD_LONG);
        let (results, stats) = scan_stream_with_stats(&stream, &ScanOptions::default());

        assert_eq!(results.len(), 1);
        assert_eq!(stats.frames_found, 1);
        assert_eq!(stats.syncs_found, 1);
        assert_eq!(stats.decode_failures, 0);
        assert_eq!(stats.bytes_scanned, stream.len());
        assert!(stats.recovery_rate() > 50.0);
    }

    #[test]
    fn test_truncated_frame_counts_failure() {
        let a = frame(&[0x11; 200]);
        let stream = on_air(&[&a], false, SYNC_WORD_LONG);
        let cut = &stream[..stream.len() - 60];
        let (results, stats) = scan_stream_with_stats(cut, &ScanOptions::default());
        assert!(results.is_empty());
        assert!(stats.decode_failures >= 1);
    }
}
