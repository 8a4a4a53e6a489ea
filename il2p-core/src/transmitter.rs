//! Transmit path: byte FIFO, keying and modulation
//!
//! Frames are encoded when queued. The FIFO then holds exactly the bytes to
//! send: preamble (only ahead of the first frame of a transmission), sync
//! word, encoded frame and a short idle spacer. `process` drains it into the
//! modulator while the output has room and follows the last byte with the
//! configured tail of silence. A frame queued during the tail cuts the tail
//! short and goes out with a fresh preamble without dropping the key.

use crate::config::ModemConfig;
use crate::constants::{FRAME_SPACER_BYTES, PREAMBLE_BYTE, TX_FIFO_BYTES};
use crate::context::Context;
use crate::encoder::{EncodeOptions, Encoder};
use crate::error::Il2pError;
use crate::io::SampleOutput;
use crate::modulator::Modulator;
use bytes::{Buf, BufMut, BytesMut};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// IL2P transmitter
#[derive(Debug)]
pub struct Transmitter {
    fifo: BytesMut,
    encoder: Encoder,
    modulator: Modulator,
    sync: &'static [u8],
    preamble_bytes: usize,
    tail_bytes: usize,
    play_out: usize,
}

impl Transmitter {
    /// Transmitter using the framing and timing in `config`
    pub fn new(config: &ModemConfig) -> Self {
        let mut modulator = Modulator::new(config.symbol_length, config.tx_level);
        if config.pulse_shaping {
            modulator = modulator.with_pulse_shaping();
        }
        Self {
            fifo: BytesMut::with_capacity(TX_FIFO_BYTES),
            encoder: Encoder::new(EncodeOptions {
                fec: config.fec,
                crc: config.crc,
            }),
            modulator,
            sync: config.sync.bytes(),
            preamble_bytes: config.preamble_bytes(),
            tail_bytes: config.tail_bytes(),
            play_out: 0,
        }
    }

    /// Free FIFO bytes
    pub fn space(&self) -> usize {
        TX_FIFO_BYTES.saturating_sub(self.fifo.len())
    }

    /// Bytes waiting to be modulated
    pub fn queued(&self) -> usize {
        self.fifo.len()
    }

    /// Nothing queued and no tail pending
    pub fn is_idle(&self) -> bool {
        self.fifo.is_empty() && self.play_out == 0
    }

    /// Encode and queue one AX.25 frame
    ///
    /// Returns the number of bytes queued. A frame that does not fit is
    /// refused whole.
    pub fn write_frame(&mut self, ctx: &Context, ax25: &[u8]) -> Result<usize, Il2pError> {
        let encoded = self.encoder.encode(ax25)?;
        let in_tail = self.play_out > 0;
        let preamble = if self.fifo.is_empty() && (!ctx.transmitting || in_tail) {
            self.preamble_bytes
        } else {
            0
        };

        let needed = preamble + self.sync.len() + encoded.len() + FRAME_SPACER_BYTES;
        let available = self.space();
        if needed > available {
            #[cfg(feature = "logging")]
            warn!("TX FIFO full: need {} bytes, {} available", needed, available);
            return Err(Il2pError::FifoFull { needed, available });
        }

        self.fifo.put_bytes(PREAMBLE_BYTE, preamble);
        self.fifo.put_slice(self.sync);
        self.fifo.put_slice(&encoded);
        self.fifo.put_bytes(PREAMBLE_BYTE, FRAME_SPACER_BYTES);
        if in_tail {
            #[cfg(feature = "logging")]
            debug!("Frame queued during tail, staying keyed");
            self.play_out = 0;
        }
        Ok(needed)
    }

    /// Modulate queued bytes into `out`
    ///
    /// Does nothing while idle. In half duplex a transmission only starts
    /// in a slot where channel access allows it.
    pub fn process<O: SampleOutput + ?Sized>(&mut self, ctx: &mut Context, out: &mut O) {
        if !ctx.transmitting && !self.fifo.is_empty() {
            if !ctx.can_transmit() {
                return;
            }
            #[cfg(feature = "logging")]
            debug!("Key up, {} bytes queued", self.fifo.len());
            ctx.transmitting = true;
        }

        let chunk = self.modulator.samples_per_byte();

        if self.play_out > 0 {
            while out.space() > chunk {
                self.modulator.write_silence(out);
                self.play_out -= 1;
                if self.play_out == 0 {
                    self.key_down(ctx);
                    break;
                }
            }
            return;
        }

        while !self.fifo.is_empty() && out.space() > chunk {
            let byte = self.fifo.get_u8();
            self.modulator.write_byte(byte, out);
            if self.fifo.is_empty() {
                self.play_out = self.tail_bytes;
                if self.play_out == 0 {
                    self.key_down(ctx);
                }
            }
        }
    }

    fn key_down(&mut self, ctx: &mut Context) {
        #[cfg(feature = "logging")]
        debug!("Key down");
        ctx.transmitting = false;
        self.modulator.reset();
    }
}
