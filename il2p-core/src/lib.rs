//! # IL2P Core
//!
//! Link coding for a 4-level FSK packet radio modem running Improved Layer 2
//! Protocol: sync search, adaptive slicing, header transcoding,
//! Reed-Solomon framing and the channel access rules of the transmitter.
//!
//! ## Modules
//!
//! - `constants`: Frame format constants and limits
//! - `config`: Modem parameters and presets
//! - `types`: AX.25 addresses, frame kinds and builders
//! - `header`: AX.25 to IL2P header transcoding
//! - `fec`: Reed-Solomon block codecs
//! - `framer`: Payload block layout
//! - `encoder` / `decoder`: Whole-frame coding in the byte domain
//! - `filter`: Pulse shaping and matched filtering
//! - `sync`, `slicer`, `receiver`: Sample-domain receive path
//! - `modulator`, `transmitter`, `access`: Sample-domain transmit path
//! - `scanner`: Frame recovery from captured byte streams

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod access;
pub mod bits;
pub mod checksum;
pub mod config;
pub mod constants;
pub mod context;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fec;
pub mod filter;
pub mod framer;
pub mod header;
pub mod io;
pub mod modulator;
pub mod receiver;
pub mod ring;
pub mod scanner;
pub mod scrambler;
pub mod slicer;
pub mod sync;
pub mod transmitter;
pub mod types;

// Re-export commonly used types
pub use config::{ModemConfig, SyncKind};
pub use context::Context;
pub use decoder::{DecodedFrame, Decoder};
pub use encoder::{EncodeOptions, Encoder};
pub use error::Il2pError;
pub use io::{FrameCollector, FrameSink, SampleBuffer, SampleOutput};
pub use receiver::{Receiver, RxState, RxStats};
pub use transmitter::Transmitter;
pub use types::{Address, FecLevel, FrameBuilder, HeaderType};

/// Result type alias for IL2P operations
pub type Result<T> = core::result::Result<T, Il2pError>;
