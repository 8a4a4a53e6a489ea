//! Fuzzing entry points for il2p-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Call one of these from a target, e.g. `cargo fuzz run fuzz_receiver`

use il2p_core::{
    constants::HEADER_WIRE_BYTES, decoder::Decoder, scanner::ScanOptions, Context,
    FrameCollector, ModemConfig, Receiver, SyncKind,
};

/// Correct and translate the first 15 bytes as a header
pub fn fuzz_header(data: &[u8]) {
    if data.len() < HEADER_WIRE_BYTES {
        return;
    }
    let decoder = Decoder::new(false);
    if let Ok((header, _)) = decoder.decode_header(data) {
        // Any header that decodes must describe a frame the buffers can hold
        let _ = decoder.body_len(&header);
        let _ = header.packet_len();
    }
}

/// Decode a whole frame with and without the CRC trailer
pub fn fuzz_decode(data: &[u8]) {
    for crc in [false, true] {
        let _ = Decoder::new(crc).decode_frame_from_bytes(data);
    }
}

/// Scan for both sync words
pub fn fuzz_scan(data: &[u8]) {
    for sync in [SyncKind::Long, SyncKind::Short] {
        let options = ScanOptions { crc: false, sync };
        let _ = il2p_core::scanner::scan_stream(data, &options);
    }
}

/// Feed the bytes to a receiver as little-endian samples
pub fn fuzz_receiver(data: &[u8]) {
    let samples: Vec<i16> = data
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    for config in [ModemConfig::il2p(), ModemConfig::short_sync()] {
        let Ok(mut ctx) = Context::new(config.clone()) else {
            return;
        };
        let mut rx = Receiver::new(&config);
        let mut sink = FrameCollector::new();
        for block in samples.chunks(61) {
            rx.push_samples(&mut ctx, block, &mut sink);
        }
    }
}
