//! Core types: FEC density, header variants and the AX.25 frame model

use crate::constants::{
    AX25_ADDRESS_LEN, AX25_MAX_ADDRESSES, AX25_MIN_ADDRESS_FIELD, CONTROL_PF, CONTROL_UI,
    PID_NO_LAYER3,
};
use crate::error::Il2pError;
use alloc::string::ToString;
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Payload FEC density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FecLevel {
    /// Block size up to 247, parity scaled with block size
    #[default]
    Normal,
    /// Block size up to 239, 16 parity symbols per block
    Max,
}

/// Header variant carried in the type bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderType {
    /// Length only; the AX.25 header travels inside the payload
    Type0,
    /// Full address, control and PID translation
    Type1,
}

/// Classification of an AX.25 control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Information frame
    Information,
    /// Supervisory frame (RR, RNR, REJ, SREJ)
    Supervisory,
    /// Unnumbered frame other than UI
    Unnumbered,
    /// Unnumbered information
    UnnumberedInformation,
}

impl FrameKind {
    /// Classify a control byte
    pub fn of(control: u8) -> Self {
        if control & 0x01 == 0 {
            FrameKind::Information
        } else if control & 0x03 == 0x01 {
            FrameKind::Supervisory
        } else if control & !CONTROL_PF == CONTROL_UI {
            FrameKind::UnnumberedInformation
        } else {
            FrameKind::Unnumbered
        }
    }

    /// Frames of this kind carry a PID byte
    pub fn has_pid(self) -> bool {
        matches!(
            self,
            FrameKind::Information | FrameKind::UnnumberedInformation
        )
    }
}

/// An AX.25 station address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Callsign in ASCII, space padded
    pub callsign: [u8; 6],

    /// Secondary station identifier (0-15)
    pub ssid: u8,

    /// Command/response (or has-been-repeated) bit
    pub c_bit: bool,

    /// The two reserved bits, right aligned
    pub reserved: u8,
}

impl Address {
    /// Build an address from text, with both reserved bits set
    pub fn new(callsign: &str, ssid: u8) -> Result<Self, Il2pError> {
        let raw = callsign.as_bytes();
        if raw.is_empty() || raw.len() > 6 || ssid > 15 {
            return Err(Il2pError::InvalidCallsign(callsign.to_string()));
        }
        if !raw.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            return Err(Il2pError::InvalidCallsign(callsign.to_string()));
        }
        let mut padded = [b' '; 6];
        padded[..raw.len()].copy_from_slice(raw);
        Ok(Self {
            callsign: padded,
            ssid,
            c_bit: false,
            reserved: 0x03,
        })
    }

    /// Parse "CALL" or "CALL-SSID"
    pub fn parse_text(text: &str) -> Result<Self, Il2pError> {
        match text.split_once('-') {
            Some((call, ssid)) => {
                let ssid = ssid
                    .parse::<u8>()
                    .map_err(|_| Il2pError::InvalidCallsign(text.to_string()))?;
                Self::new(call, ssid)
            }
            None => Self::new(text, 0),
        }
    }

    /// Decode the 7 on-air bytes of an address
    pub fn from_bytes(bytes: &[u8; AX25_ADDRESS_LEN]) -> Self {
        let mut callsign = [b' '; 6];
        for (c, b) in callsign.iter_mut().zip(bytes.iter()) {
            *c = b >> 1;
        }
        let ssid_byte = bytes[6];
        Self {
            callsign,
            ssid: (ssid_byte >> 1) & 0x0F,
            c_bit: ssid_byte & 0x80 != 0,
            reserved: (ssid_byte >> 5) & 0x03,
        }
    }

    /// Encode into 7 on-air bytes; `last` sets the address extension bit
    pub fn to_bytes(&self, last: bool) -> [u8; AX25_ADDRESS_LEN] {
        let mut out = [0u8; AX25_ADDRESS_LEN];
        for (o, c) in out.iter_mut().zip(self.callsign.iter()) {
            *o = c << 1;
        }
        let c_bit = if self.c_bit { 0x80 } else { 0 };
        out[6] = (self.ssid & 0x0F) << 1 | (self.reserved & 0x03) << 5 | c_bit | u8::from(last);
        out
    }

    /// Callsign without padding
    pub fn call(&self) -> &str {
        let end = self
            .callsign
            .iter()
            .rposition(|&c| c != b' ')
            .map_or(0, |p| p + 1);
        core::str::from_utf8(&self.callsign[..end]).unwrap_or("")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid == 0 {
            write!(f, "{}", self.call())
        } else {
            write!(f, "{}-{}", self.call(), self.ssid)
        }
    }
}

/// Borrowed view of a raw AX.25 frame (without FCS)
#[derive(Debug, Clone, PartialEq)]
pub struct Ax25Frame<'a> {
    /// Destination address
    pub dest: Address,

    /// Source address
    pub source: Address,

    /// Number of digipeater addresses after the source
    pub digipeaters: usize,

    /// Control byte
    pub control: u8,

    /// Protocol identifier for I and UI frames
    pub pid: Option<u8>,

    /// Information field
    pub info: &'a [u8],
}

impl<'a> Ax25Frame<'a> {
    /// Parse a raw frame
    pub fn parse(raw: &'a [u8]) -> Result<Self, Il2pError> {
        let address_len = raw
            .iter()
            .enumerate()
            .skip(AX25_ADDRESS_LEN - 1)
            .step_by(AX25_ADDRESS_LEN)
            .take(AX25_MAX_ADDRESSES)
            .find(|(_, &b)| b & 0x01 != 0)
            .map(|(i, _)| i + 1)
            .ok_or(Il2pError::MalformedAx25("unterminated address field"))?;
        if address_len < AX25_MIN_ADDRESS_FIELD {
            return Err(Il2pError::MalformedAx25("missing source address"));
        }
        let control = *raw
            .get(address_len)
            .ok_or(Il2pError::MalformedAx25("missing control byte"))?;

        let mut header_len = address_len + 1;
        let pid = if FrameKind::of(control).has_pid() {
            let pid = *raw
                .get(header_len)
                .ok_or(Il2pError::MalformedAx25("missing PID"))?;
            header_len += 1;
            Some(pid)
        } else {
            None
        };

        let mut dest = [0u8; AX25_ADDRESS_LEN];
        dest.copy_from_slice(&raw[..AX25_ADDRESS_LEN]);
        let mut source = [0u8; AX25_ADDRESS_LEN];
        source.copy_from_slice(&raw[AX25_ADDRESS_LEN..AX25_MIN_ADDRESS_FIELD]);

        Ok(Self {
            dest: Address::from_bytes(&dest),
            source: Address::from_bytes(&source),
            digipeaters: (address_len - AX25_MIN_ADDRESS_FIELD) / AX25_ADDRESS_LEN,
            control,
            pid,
            info: &raw[header_len..],
        })
    }

    /// Frame class
    pub fn kind(&self) -> FrameKind {
        FrameKind::of(self.control)
    }

    /// Destination C set and source C clear
    pub fn is_command(&self) -> bool {
        self.dest.c_bit && !self.source.c_bit
    }
}

/// Builder for raw AX.25 frames
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    dest: Address,
    source: Address,
    digipeaters: Vec<Address>,
    control: u8,
    pid: Option<u8>,
    info: Vec<u8>,
    command: bool,
}

impl FrameBuilder {
    /// Start a UI command frame with no layer 3 protocol
    pub fn new(dest: Address, source: Address) -> Self {
        Self {
            dest,
            source,
            digipeaters: Vec::new(),
            control: CONTROL_UI,
            pid: Some(PID_NO_LAYER3),
            info: Vec::new(),
            command: true,
        }
    }

    /// Set the control byte; the PID is kept only for I and UI frames
    pub fn control(mut self, control: u8) -> Self {
        self.control = control;
        if !FrameKind::of(control).has_pid() {
            self.pid = None;
        } else if self.pid.is_none() {
            self.pid = Some(PID_NO_LAYER3);
        }
        self
    }

    /// Back to a UI frame, keeping the PID
    pub fn ui(self) -> Self {
        self.control(CONTROL_UI)
    }

    /// Set the protocol identifier
    pub fn pid(mut self, pid: u8) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Mark as a command (destination C bit)
    pub fn command(mut self) -> Self {
        self.command = true;
        self
    }

    /// Mark as a response (source C bit)
    pub fn response(mut self) -> Self {
        self.command = false;
        self
    }

    /// Append a digipeater
    pub fn digipeater(mut self, digi: Address) -> Self {
        self.digipeaters.push(digi);
        self
    }

    /// Set the information field
    pub fn info(mut self, info: &[u8]) -> Self {
        self.info = info.to_vec();
        self
    }

    /// Serialize the frame
    pub fn build(self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            AX25_MIN_ADDRESS_FIELD
                + self.digipeaters.len() * AX25_ADDRESS_LEN
                + 2
                + self.info.len(),
        );

        let mut dest = self.dest;
        dest.c_bit = self.command;
        let mut source = self.source;
        source.c_bit = !self.command;

        buf.put_slice(&dest.to_bytes(false));
        buf.put_slice(&source.to_bytes(self.digipeaters.is_empty()));
        let count = self.digipeaters.len();
        for (i, digi) in self.digipeaters.iter().enumerate() {
            buf.put_slice(&digi.to_bytes(i + 1 == count));
        }
        buf.put_u8(self.control);
        if let Some(pid) = self.pid {
            if FrameKind::of(self.control).has_pid() {
                buf.put_u8(pid);
            }
        }
        buf.put_slice(&self.info);
        buf.freeze()
    }
}
