//! Collaborator seams: where decoded frames go and where samples are written

use alloc::vec::Vec;
use bytes::Bytes;

/// Receives every successfully decoded packet
pub trait FrameSink {
    /// Deliver one reconstructed AX.25 frame
    fn deliver(&mut self, packet: &[u8]);
}

impl<F: FnMut(&[u8])> FrameSink for F {
    fn deliver(&mut self, packet: &[u8]) {
        self(packet)
    }
}

/// Sink that keeps every delivered frame
#[derive(Debug, Clone, Default)]
pub struct FrameCollector {
    /// Frames in delivery order
    pub frames: Vec<Bytes>,
}

impl FrameCollector {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for FrameCollector {
    fn deliver(&mut self, packet: &[u8]) {
        self.frames.push(Bytes::copy_from_slice(packet));
    }
}

/// Destination for modulated samples
pub trait SampleOutput {
    /// Samples that can be written without blocking
    fn space(&self) -> usize;

    /// Append samples
    fn write(&mut self, samples: &[i16]);
}

/// Growable sample buffer with an optional space limit
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    limit: Option<usize>,
}

impl SampleBuffer {
    /// Unbounded buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer that reports no space beyond `limit` queued samples
    pub fn with_limit(limit: usize) -> Self {
        Self {
            samples: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    /// Queued samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Take the queued samples, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<i16> {
        core::mem::take(&mut self.samples)
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleOutput for SampleBuffer {
    fn space(&self) -> usize {
        match self.limit {
            Some(limit) => limit.saturating_sub(self.samples.len()),
            None => usize::MAX,
        }
    }

    fn write(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }
}
