//! Integration tests for the complete transmit → channel → receive flow

use bytes::Bytes;
use il2p_core::{
    constants::PREAMBLE_BYTE,
    encoder::encode_frame,
    modulator::Modulator,
    Address, Context, EncodeOptions, FecLevel, FrameBuilder, FrameCollector, HeaderType,
    ModemConfig, Receiver, RxState, RxStats, SampleBuffer, Transmitter,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn ui(info: &[u8]) -> Bytes {
    FrameBuilder::new(
        Address::parse_text("APRS").unwrap(),
        Address::parse_text("N0CALL-9").unwrap(),
    )
    .digipeater(Address::parse_text("WIDE1-1").unwrap())
    .info(info)
    .build()
}

/// Key up, send every frame in one transmission, return the samples
fn transmit(config: &ModemConfig, frames: &[Bytes]) -> Vec<i16> {
    let config = ModemConfig {
        duplex: true,
        ..config.clone()
    };
    let mut ctx = Context::new(config.clone()).unwrap();
    let mut tx = Transmitter::new(&config);
    for f in frames {
        tx.write_frame(&ctx, f).unwrap();
    }

    let mut out = SampleBuffer::new();
    while !tx.is_idle() {
        tx.process(&mut ctx, &mut out);
    }
    assert!(!ctx.transmitting);
    out.drain()
}

fn receive(config: &ModemConfig, samples: &[i16]) -> (Vec<Bytes>, RxStats) {
    let mut ctx = Context::new(config.clone()).unwrap();
    let mut rx = Receiver::new(config);
    let mut sink = FrameCollector::new();
    // Odd block size so frame boundaries never line up with blocks
    for block in samples.chunks(97) {
        rx.push_samples(&mut ctx, block, &mut sink);
    }
    assert_eq!(rx.state(), RxState::Searching);
    (sink.frames, rx.stats())
}

/// Add seeded white Gaussian noise, then enough silence to flush the receiver
fn add_noise(config: &ModemConfig, samples: &[i16], sigma: f64, seed: u64) -> Vec<i16> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).unwrap();
    let mut noisy: Vec<i16> = samples
        .iter()
        .map(|&s| {
            let v = f64::from(s) + normal.sample(&mut rng);
            v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
        })
        .collect();
    noisy.resize(noisy.len() + config.ring_capacity(), 0);
    noisy
}

fn random_info(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn options(config: &ModemConfig) -> EncodeOptions {
    EncodeOptions {
        fec: config.fec,
        crc: config.crc,
    }
}

fn header_bytes(config: &ModemConfig) -> usize {
    config.preamble_bytes() + config.sync.bytes().len()
}

#[test]
fn test_loopback_back_to_back_frames() {
    let config = ModemConfig::default();
    let frames = vec![ui(b"first"), ui(&[0x42; 600]), ui(b"")];

    let (received, stats) = receive(&config, &transmit(&config, &frames));

    assert_eq!(received, frames);
    assert_eq!(stats.syncs, 3);
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.dropped(), 0);
    assert_eq!(stats.corrected_symbols, 0);
}

#[test]
fn test_loopback_every_preset() {
    for config in [ModemConfig::il2p(), ModemConfig::il2p_crc(), ModemConfig::short_sync()] {
        let frames = vec![ui(b"preset"), ui(&[0xC3; 300])];
        let (received, _) = receive(&config, &transmit(&config, &frames));
        assert_eq!(received, frames, "{:?}", config);
    }
}

#[test]
fn test_loopback_max_fec() {
    let config = ModemConfig {
        fec: FecLevel::Max,
        crc: true,
        ..ModemConfig::default()
    };
    let frames = vec![ui(&[0x99; 1000])];
    let (received, _) = receive(&config, &transmit(&config, &frames));
    assert_eq!(received, frames);
}

#[test]
fn test_inverted_polarity() {
    let config = ModemConfig::default();
    let frames = vec![ui(b"upside down")];
    let samples: Vec<i16> = transmit(&config, &frames).iter().map(|&s| -s).collect();

    let (received, _) = receive(&config, &samples);
    assert_eq!(received, frames);
}

#[test]
fn test_uniform_noise() {
    let config = ModemConfig::default();
    let frames = vec![ui(b"through the noise"), ui(&[0x0F; 250])];
    let mut rng = StdRng::seed_from_u64(0x11_2024);
    let samples: Vec<i16> = transmit(&config, &frames)
        .iter()
        .map(|&s| s + rng.gen_range(-60..=60))
        .collect();

    let (received, stats) = receive(&config, &samples);
    assert_eq!(received, frames);
    assert_eq!(stats.dropped(), 0);
}

#[test]
fn test_dc_offset() {
    let config = ModemConfig::il2p_crc();
    let frames = vec![ui(b"offset")];
    let samples: Vec<i16> = transmit(&config, &frames).iter().map(|&s| s + 200).collect();

    let (received, _) = receive(&config, &samples);
    assert_eq!(received, frames);
}

#[test]
fn test_symbol_errors_are_corrected() {
    let config = ModemConfig::default();
    let frame = ui(&[0x24; 120]);
    let mut wire = encode_frame(&frame, options(&config)).unwrap().to_vec();

    // One byte in the header, one in the payload
    wire[3] ^= 0x30;
    wire[15 + 40] ^= 0x30;

    let mut on_air = vec![PREAMBLE_BYTE; 40];
    on_air.extend_from_slice(config.sync.bytes());
    on_air.extend_from_slice(&wire);
    on_air.extend_from_slice(&[PREAMBLE_BYTE; 10]);

    let mut modulator = Modulator::new(config.symbol_length, config.tx_level).with_pulse_shaping();
    let mut out = SampleBuffer::new();
    for byte in on_air {
        modulator.write_byte(byte, &mut out);
    }

    let (received, stats) = receive(&config, &out.drain());
    assert_eq!(received, vec![frame]);
    assert_eq!(stats.corrected_symbols, 2);
}

#[test]
fn test_gaussian_noise_is_corrected() {
    let config = ModemConfig {
        fec: FecLevel::Max,
        crc: true,
        ..ModemConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0x5EED_0140);
    let frames: Vec<Bytes> = (0..8).map(|_| ui(&random_info(&mut rng, 200))).collect();

    let samples = add_noise(&config, &transmit(&config, &frames), 140.0, 0x140);
    let (received, stats) = receive(&config, &samples);

    // Whatever arrives is exact and in order
    let mut sent = frames.iter();
    for frame in &received {
        assert!(sent.any(|f| f == frame));
    }
    assert!(received.len() >= 6, "{:?}", stats);
    assert_eq!(stats.frames, received.len());
    assert!(stats.corrected_symbols > 0, "{:?}", stats);
}

#[test]
fn test_heavy_noise_drops_rather_than_corrupts() {
    let config = ModemConfig::il2p_crc();
    let mut rng = StdRng::seed_from_u64(0x5EED_0180);
    let frames: Vec<Bytes> = (0..4).map(|_| ui(&random_info(&mut rng, 800))).collect();

    let samples = add_noise(&config, &transmit(&config, &frames), 180.0, 0x180);
    let (received, stats) = receive(&config, &samples);

    for frame in &received {
        assert!(frames.contains(frame));
    }
    assert!(stats.syncs > stats.frames);
    assert!(
        stats.payload_failures + stats.spurious_corrections + stats.crc_failures > 0,
        "{:?}",
        stats
    );
}

#[test]
fn test_no_digipeater_frames_every_preset() {
    let frame = FrameBuilder::new(
        Address::parse_text("CQ").unwrap(),
        Address::parse_text("KB1XYZ-3").unwrap(),
    )
    .info(b"direct")
    .build();
    let header = il2p_core::header::encode(&frame, FecLevel::Normal).unwrap();
    assert_eq!(header.kind, HeaderType::Type1);

    for config in [ModemConfig::il2p(), ModemConfig::il2p_crc(), ModemConfig::short_sync()] {
        let frames = vec![frame.clone(), ui(b"relayed"), frame.clone()];
        let (received, stats) = receive(&config, &transmit(&config, &frames));
        assert_eq!(received, frames, "{:?}", config);
        assert_eq!(stats.dropped(), 0);
    }
}

#[test]
fn test_loopback_with_and_without_shaping() {
    for pulse_shaping in [true, false] {
        let config = ModemConfig {
            pulse_shaping,
            ..ModemConfig::il2p_crc()
        };
        let frames = vec![ui(b"shaped?"), ui(&[0xE1; 400])];
        let (received, stats) = receive(&config, &transmit(&config, &frames));
        assert_eq!(received, frames, "pulse_shaping {}", pulse_shaping);
        assert_eq!(stats.corrected_symbols, 0);
    }
}

#[test]
fn test_damaged_frame_does_not_block_the_next() {
    let config = ModemConfig::default();
    let frames = vec![ui(&[0x55; 100]), ui(b"survivor")];
    let mut samples = transmit(&config, &frames);
    let spb = config.samples_per_byte();

    let start = (header_bytes(&config) + 15 + 10) * spb;
    samples[start..start + 40 * spb].fill(0);

    let (received, stats) = receive(&config, &samples);
    assert_eq!(received, vec![frames[1].clone()]);
    assert_eq!(stats.syncs, 2);
    assert_eq!(stats.dropped(), 1);
}

#[test]
fn test_transmission_timing() {
    let config = ModemConfig::default();
    let frame = ui(b"timing");
    let samples = transmit(&config, &[frame.clone()]);

    let encoded = encode_frame(&frame, options(&config)).unwrap();
    let bytes = header_bytes(&config) + encoded.len() + 10 + config.tail_bytes();
    assert_eq!(samples.len(), bytes * config.samples_per_byte());

    // The shaping filter rings out over the first two tail bytes
    let tail = (config.tail_bytes() - 2) * config.samples_per_byte();
    assert!(samples[samples.len() - tail..].iter().all(|&s| s == 0));
    assert!(samples[samples.len() - tail - 40..samples.len() - tail].iter().any(|&s| s != 0));
}
