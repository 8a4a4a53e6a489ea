//! Sample-domain receive state machine
//!
//! ```text
//! Searching --sync--> Header --len>0--> Payload --crc--> Crc
//!     ^                 |  len==0         |                |
//!     +-----------------+-----------------+----------------+
//! ```
//!
//! Every transition happens when the write position reaches an end position
//! computed in advance, so a frame stays anchored to the sample at which its
//! sync word ended. Failures are never returned to the caller: they are
//! counted in [`RxStats`], logged, and the receiver goes back to searching.

use crate::config::ModemConfig;
use crate::constants::{
    CRC_LENGTH_BYTES, HEADER_WIRE_BYTES, MAX_PACKET_LENGTH, MAX_PAYLOAD_LENGTH,
    MAX_PAYLOAD_PARITY, RRC_RX_TAPS, SYMBOLS_PER_BYTE, SYNC_COUNTDOWN,
};
use crate::context::Context;
use crate::decoder::Decoder;
use crate::error::Il2pError;
use crate::filter::FirFilter;
use crate::header::DecodedHeader;
use crate::io::FrameSink;
use crate::ring::{RingPos, SampleRing};
use crate::slicer::AdaptiveSlicer;
use crate::sync::{SyncCorrelator, SyncMatch, SyncWord};
use alloc::vec;
use alloc::vec::Vec;
use serde::Serialize;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Receiver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Looking for a sync word
    Searching,
    /// Waiting for the header to arrive
    Header,
    /// Waiting for the payload blocks to arrive
    Payload,
    /// Waiting for the CRC trailer to arrive
    Crc,
}

/// Outcome counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RxStats {
    /// Sync words that started a frame
    pub syncs: usize,
    /// Frames delivered
    pub frames: usize,
    /// Headers that failed FEC or translation
    pub header_failures: usize,
    /// Payloads with an uncorrectable block
    pub payload_failures: usize,
    /// Corrections rejected because they hit the zero padding
    pub spurious_corrections: usize,
    /// Frames whose trailer did not match
    pub crc_failures: usize,
    /// Symbols corrected in delivered frames
    pub corrected_symbols: usize,
}

impl RxStats {
    /// Frames dropped after a sync
    pub fn dropped(&self) -> usize {
        self.header_failures + self.payload_failures + self.spurious_corrections + self.crc_failures
    }

    fn record(&mut self, err: &Il2pError) {
        match err {
            Il2pError::HeaderFecFailure | Il2pError::HeaderSemanticInvalid(_) => {
                self.header_failures += 1
            }
            Il2pError::SpuriousCorrection(_) => self.spurious_corrections += 1,
            Il2pError::ChecksumMismatch { .. } => self.crc_failures += 1,
            _ => self.payload_failures += 1,
        }
    }
}

/// IL2P receiver fed with baseband samples
#[derive(Debug)]
pub struct Receiver {
    filter: Option<FirFilter>,
    ring: SampleRing,
    pos: RingPos,
    correlator: SyncCorrelator,
    slicer: AdaptiveSlicer,
    decoder: Decoder,
    symbol_length: usize,

    state: RxState,
    countdown: u8,
    pending: Option<SyncMatch>,
    start: RingPos,
    end: RingPos,

    header: Option<DecodedHeader>,
    wire: Vec<u8>,
    packet: Vec<u8>,
    packet_len: usize,
    corrected: usize,

    stats: RxStats,
}

impl Receiver {
    /// Receiver for the sync word, symbol length and CRC mode in `config`
    pub fn new(config: &ModemConfig) -> Self {
        let symbol_length = config.symbol_length.max(1);
        let ring = SampleRing::new(config.ring_capacity());
        let origin = ring.origin();
        Self {
            filter: config.pulse_shaping.then(|| FirFilter::new(&RRC_RX_TAPS)),
            ring,
            pos: origin,
            correlator: SyncCorrelator::new(SyncWord::of(config.sync), symbol_length),
            slicer: AdaptiveSlicer::new(),
            decoder: Decoder::new(config.crc),
            symbol_length,
            state: RxState::Searching,
            countdown: 0,
            pending: None,
            start: origin,
            end: origin,
            header: None,
            wire: vec![0; MAX_PAYLOAD_LENGTH + MAX_PAYLOAD_PARITY],
            packet: vec![0; MAX_PACKET_LENGTH],
            packet_len: 0,
            corrected: 0,
            stats: RxStats::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Counters since creation or the last [`Receiver::reset_stats`]
    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// Zero the counters
    pub fn reset_stats(&mut self) {
        self.stats = RxStats::default();
    }

    /// Abandon any frame in progress and clear the sample history
    pub fn reset(&mut self, ctx: &mut Context) {
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
        self.ring.clear();
        self.pos = self.ring.origin();
        self.return_to_search(ctx);
    }

    /// Feed a block of samples
    ///
    /// Samples pass through the matched filter, when pulse shaping is on,
    /// before they reach the ring. Decoded frames go to `sink`. The block
    /// length also advances the channel access slot timer.
    pub fn push_samples<S: FrameSink + ?Sized>(
        &mut self,
        ctx: &mut Context,
        samples: &[i16],
        sink: &mut S,
    ) {
        for &raw in samples {
            let sample = match self.filter.as_mut() {
                Some(filter) => filter.push(raw),
                None => raw,
            };
            self.ring.put(self.pos, sample);
            match self.state {
                RxState::Searching => self.search(ctx, sample),
                RxState::Header => {
                    self.correlator.track(sample);
                    if self.pos == self.end {
                        self.process_header(ctx, sink);
                    }
                }
                RxState::Payload => {
                    self.correlator.track(sample);
                    if self.pos == self.end {
                        self.process_payload(ctx, sink);
                    }
                }
                RxState::Crc => {
                    self.correlator.track(sample);
                    if self.pos == self.end {
                        self.process_crc(ctx, sink);
                    }
                }
            }
            self.pos = self.ring.advance(self.pos, 1);
        }
        ctx.channel.tick(samples.len());
    }

    /// Samples covering `bytes` bytes on air
    fn span(&self, bytes: usize) -> usize {
        bytes * SYMBOLS_PER_BYTE * self.symbol_length
    }

    fn search(&mut self, ctx: &mut Context, sample: i16) {
        if let Some(found) = self.correlator.push(&self.ring, self.pos, sample) {
            if self.countdown == 0 {
                ctx.channel.set_dcd(true);
                self.countdown = SYNC_COUNTDOWN;
            }
            self.pending = Some(found);
        }

        if self.countdown > 0 {
            self.countdown -= 1;
        }
        if self.countdown == 1 {
            self.countdown = 0;
            if let Some(found) = self.pending.take() {
                #[cfg(feature = "logging")]
                debug!(
                    "Sync at {}: score {}, centre {}, threshold {}, inverted {}",
                    found.pos.index(),
                    found.score,
                    found.levels.centre,
                    found.levels.threshold,
                    found.invert
                );

                self.stats.syncs += 1;
                self.slicer.start(found.levels, found.invert);
                self.start = self.ring.advance(found.pos, self.symbol_length);
                self.end = self.ring.advance(self.start, self.span(HEADER_WIRE_BYTES));
                self.state = RxState::Header;
            }
        }
    }

    fn process_header<S: FrameSink + ?Sized>(&mut self, ctx: &mut Context, sink: &mut S) {
        let symbols = HEADER_WIRE_BYTES * SYMBOLS_PER_BYTE;
        self.slicer.measure(&self.ring, self.start, symbols, self.symbol_length);
        let mut wire = [0u8; HEADER_WIRE_BYTES];
        self.slicer
            .slice_into(&self.ring, self.start, symbols, self.symbol_length, &mut wire);

        let (header, corrected) = match self.decoder.decode_header(&wire) {
            Ok(decoded) => decoded,
            Err(e) => return self.fail(ctx, e),
        };
        self.header = Some(header);
        self.corrected = corrected;

        if header.payload_len > 0 {
            let encoded = self.decoder.plan(&header).encoded_len();
            self.start = self.end;
            self.end = self.ring.advance(self.start, self.span(encoded));
            self.state = RxState::Payload;
            return;
        }

        let ax25 = header.ax25_header();
        self.packet[..ax25.len()].copy_from_slice(ax25);
        self.packet_len = ax25.len();
        self.finish_frame(ctx, sink);
    }

    fn process_payload<S: FrameSink + ?Sized>(&mut self, ctx: &mut Context, sink: &mut S) {
        let Some(header) = self.header else {
            return self.fail(ctx, Il2pError::HeaderFecFailure);
        };
        let plan = self.decoder.plan(&header);

        let mut block_start = self.start;
        let mut offset = 0;
        for size in plan.block_sizes() {
            let len = size + plan.parity_per_block;
            let symbols = len * SYMBOLS_PER_BYTE;
            self.slicer
                .measure(&self.ring, block_start, symbols, self.symbol_length);
            self.slicer.slice_into(
                &self.ring,
                block_start,
                symbols,
                self.symbol_length,
                &mut self.wire[offset..offset + len],
            );
            block_start = self.ring.advance(block_start, self.span(len));
            offset += len;
        }

        match self
            .decoder
            .decode_payload(&header, &self.wire[..offset], &mut self.packet)
        {
            Ok(corrected) => {
                self.corrected += corrected;
                self.packet_len = header.packet_len();
                self.finish_frame(ctx, sink);
            }
            Err(e) => self.fail(ctx, e),
        }
    }

    fn process_crc<S: FrameSink + ?Sized>(&mut self, ctx: &mut Context, sink: &mut S) {
        let mut trailer = [0u8; CRC_LENGTH_BYTES];
        self.slicer.slice_into(
            &self.ring,
            self.start,
            CRC_LENGTH_BYTES * SYMBOLS_PER_BYTE,
            self.symbol_length,
            &mut trailer,
        );
        match self
            .decoder
            .check_trailer(&self.packet[..self.packet_len], &trailer)
        {
            Ok(()) => self.deliver(ctx, sink),
            Err(e) => self.fail(ctx, e),
        }
    }

    /// Header and payload are in; either wait for the trailer or deliver
    fn finish_frame<S: FrameSink + ?Sized>(&mut self, ctx: &mut Context, sink: &mut S) {
        if self.decoder.crc_enabled() {
            self.start = self.end;
            self.end = self.ring.advance(self.start, self.span(CRC_LENGTH_BYTES));
            self.state = RxState::Crc;
        } else {
            self.deliver(ctx, sink);
        }
    }

    fn deliver<S: FrameSink + ?Sized>(&mut self, ctx: &mut Context, sink: &mut S) {
        if self.packet_len > 0 {
            #[cfg(feature = "logging")]
            debug!(
                "Frame delivered: {} bytes, {} symbols corrected",
                self.packet_len, self.corrected
            );

            sink.deliver(&self.packet[..self.packet_len]);
            self.stats.frames += 1;
            self.stats.corrected_symbols += self.corrected;
        }
        self.return_to_search(ctx);
    }

    fn fail(&mut self, ctx: &mut Context, err: Il2pError) {
        #[cfg(feature = "logging")]
        debug!("Frame dropped in {:?}: {:?}", self.state, err);

        self.stats.record(&err);
        self.return_to_search(ctx);
    }

    fn return_to_search(&mut self, ctx: &mut Context) {
        #[cfg(feature = "logging")]
        {
            if self.state != RxState::Searching {
                trace!("Returning to search");
            }
        }

        self.state = RxState::Searching;
        self.countdown = 0;
        self.pending = None;
        self.header = None;
        self.packet_len = 0;
        self.corrected = 0;
        self.correlator.reset();
        ctx.channel.set_dcd(false);
    }
}
