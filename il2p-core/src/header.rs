//! AX.25 ↔ IL2P header transcoding
//!
//! The 13-byte IL2P header packs two SIXBIT callsigns into the low six bits
//! of bytes 0-11 and spreads the remaining fields over the top two bits:
//!
//! ```text
//! byte    bit 7            bit 6
//!  0      max-FEC flag     UI flag
//!  1      type 1 flag      PID nibble (MSB)
//!  2-4    length (MSB..)   PID nibble
//!  5-11   length (..LSB)   control, 7 bits (MSB first)
//!  12     dest SSID << 4 | source SSID
//! ```
//!
//! A type 0 header only fills in the FEC flag and the length; the complete
//! AX.25 frame then travels as payload.

use crate::constants::{
    AX25_ADDRESS_LEN, AX25_MIN_ADDRESS_FIELD, CONTROL_PF, HEADER_LENGTH_BYTES, MAX_AX25_HEADER,
    MAX_PAYLOAD_LENGTH,
};
use crate::error::Il2pError;
use crate::types::{Ax25Frame, FecLevel, FrameKind, HeaderType};

#[cfg(feature = "logging")]
use tracing::trace;

/// Transcoder-domain header bytes
pub type HeaderBytes = [u8; HEADER_LENGTH_BYTES];

const FLAG_MAX_FEC: u8 = 0x80;
const FLAG_UI: u8 = 0x40;
const FLAG_TYPE1: u8 = 0x80;

const LENGTH_FIELD: Field = Field { first: 2, bits: 10, mask: 0x80 };
const PID_FIELD: Field = Field { first: 1, bits: 4, mask: 0x40 };
const CONTROL_FIELD: Field = Field { first: 5, bits: 7, mask: 0x40 };

/// Compact PID nibble ↔ AX.25 PID byte
const PID_TABLE: [(u8, u8); 9] = [
    (0x3, 0x01), // ISO 8208 / X.25 PLP
    (0x4, 0x06), // compressed TCP/IP
    (0x5, 0x07), // uncompressed TCP/IP
    (0x6, 0x08), // segmentation fragment
    (0xB, 0xCC), // ARPA IP
    (0xC, 0xCD), // ARPA ARP
    (0xD, 0xCE), // FlexNet
    (0xE, 0xCF), // NET/ROM
    (0xF, 0xF0), // no layer 3
];

/// PID nibble marking a supervisory frame
const NIBBLE_S_FRAME: u8 = 0x0;
/// PID nibble marking an unnumbered (non-UI) frame
const NIBBLE_U_FRAME: u8 = 0x1;

/// Unnumbered opcode (control bits 5-3) ↔ AX.25 control byte without P/F.
/// Opcode 5 would be UI, which has its own flag.
const U_OPCODES: [Option<u8>; 8] = [
    Some(0x2F), // SABM
    Some(0x43), // DISC
    Some(0x0F), // DM
    Some(0x63), // UA
    Some(0x87), // FRMR
    None,
    Some(0xAF), // XID
    Some(0xE3), // TEST
];

/// Unnumbered opcodes that may carry an information field
fn u_opcode_has_data(opcode: u8) -> bool {
    matches!(opcode, 4 | 6 | 7)
}

/// An MSB-first field spread one bit per byte
struct Field {
    first: usize,
    bits: usize,
    mask: u8,
}

impl Field {
    fn put(&self, hdr: &mut HeaderBytes, value: u16) {
        for i in 0..self.bits {
            let bit = (value >> (self.bits - 1 - i)) & 1 != 0;
            if bit {
                hdr[self.first + i] |= self.mask;
            } else {
                hdr[self.first + i] &= !self.mask;
            }
        }
    }

    fn get(&self, hdr: &HeaderBytes) -> u16 {
        (0..self.bits).fold(0u16, |acc, i| {
            (acc << 1) | u16::from(hdr[self.first + i] & self.mask != 0)
        })
    }
}

fn pid_to_nibble(pid: u8) -> Option<u8> {
    PID_TABLE.iter().find(|(_, p)| *p == pid).map(|(n, _)| *n)
}

fn nibble_to_pid(nibble: u8) -> Option<u8> {
    PID_TABLE.iter().find(|(n, _)| *n == nibble).map(|(_, p)| *p)
}

fn u_control_to_opcode(control: u8) -> Option<u8> {
    let base = control & !CONTROL_PF;
    U_OPCODES
        .iter()
        .position(|c| *c == Some(base))
        .map(|i| i as u8)
}

/// Result of translating an outgoing AX.25 frame
#[derive(Debug, Clone, PartialEq)]
pub struct Transcoded<'a> {
    /// Header bytes before scrambling and FEC
    pub header: HeaderBytes,

    /// Which variant was chosen
    pub kind: HeaderType,

    /// Bytes to send as payload
    pub payload: &'a [u8],
}

/// Result of translating a received IL2P header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeader {
    /// Header variant
    pub kind: HeaderType,

    /// FEC density of the payload blocks
    pub fec: FecLevel,

    /// Payload length in bytes
    pub payload_len: usize,

    ax25: [u8; MAX_AX25_HEADER],
    ax25_len: usize,
}

impl DecodedHeader {
    /// Reconstructed AX.25 header (empty for type 0)
    pub fn ax25_header(&self) -> &[u8] {
        &self.ax25[..self.ax25_len]
    }

    /// Length of the packet once header and payload are merged
    pub fn packet_len(&self) -> usize {
        self.ax25_len + self.payload_len
    }
}

/// Type 1 fields derived from an AX.25 frame
struct Compact {
    ui: bool,
    pid_nibble: u8,
    control: u8,
}

/// Check every condition for a lossless type 1 translation
fn compact(raw: &[u8], frame: &Ax25Frame<'_>) -> Result<Compact, &'static str> {
    if frame.digipeaters != 0 {
        return Err("digipeaters present");
    }
    for &b in raw[..AX25_ADDRESS_LEN - 1]
        .iter()
        .chain(&raw[AX25_ADDRESS_LEN..AX25_MIN_ADDRESS_FIELD - 1])
    {
        if b & 0x01 != 0 || !(0x20..=0x5F).contains(&(b >> 1)) {
            return Err("callsign outside SIXBIT range");
        }
    }
    if frame.dest.c_bit == frame.source.c_bit {
        return Err("ambiguous command/response bits");
    }
    if frame.dest.reserved != 0x03 || frame.source.reserved != 0x03 {
        return Err("reserved SSID bits not set");
    }

    let control = frame.control;
    let pf = (control & CONTROL_PF) >> 4;
    let c = u8::from(frame.is_command());
    let nr = control >> 5;

    let (compact, has_data) = match frame.kind() {
        FrameKind::Information => {
            if !frame.is_command() {
                return Err("I-frame response");
            }
            let nibble = frame
                .pid
                .and_then(pid_to_nibble)
                .ok_or("untranslatable PID")?;
            let ns = (control >> 1) & 0x07;
            let compact = Compact {
                ui: false,
                pid_nibble: nibble,
                control: pf << 6 | nr << 3 | ns,
            };
            (compact, true)
        }
        FrameKind::Supervisory => {
            let ss = (control >> 2) & 0x03;
            let compact = Compact {
                ui: false,
                pid_nibble: NIBBLE_S_FRAME,
                control: pf << 6 | nr << 3 | c << 2 | ss,
            };
            (compact, false)
        }
        FrameKind::UnnumberedInformation => {
            let nibble = frame
                .pid
                .and_then(pid_to_nibble)
                .ok_or("untranslatable PID")?;
            let compact = Compact {
                ui: true,
                pid_nibble: nibble,
                control: pf << 6 | c << 2,
            };
            (compact, true)
        }
        FrameKind::Unnumbered => {
            let opcode = u_control_to_opcode(control).ok_or("untranslatable control")?;
            let compact = Compact {
                ui: false,
                pid_nibble: NIBBLE_U_FRAME,
                control: pf << 6 | opcode << 3 | c << 2,
            };
            (compact, u_opcode_has_data(opcode))
        }
    };

    if !has_data && !frame.info.is_empty() {
        return Err("information field on a frame type without data");
    }
    Ok(compact)
}

/// Translate an outgoing AX.25 frame into an IL2P header
///
/// Frames that allow a lossless compact translation get a type 1 header and
/// send only their information field; anything else falls back to type 0.
pub fn encode(raw: &[u8], fec: FecLevel) -> Result<Transcoded<'_>, Il2pError> {
    let mut header = [0u8; HEADER_LENGTH_BYTES];
    if fec == FecLevel::Max {
        header[0] |= FLAG_MAX_FEC;
    }

    let parsed = Ax25Frame::parse(raw);
    let type1 = match &parsed {
        Ok(frame) => compact(raw, frame).map(|c| (frame, c)),
        Err(_) => Err("not a parseable AX.25 frame"),
    };

    match type1 {
        Ok((frame, c)) if frame.info.len() <= MAX_PAYLOAD_LENGTH => {
            for i in 0..6 {
                header[i] |= (frame.dest.callsign[i] - 0x20) & 0x3F;
                header[i + 6] |= (frame.source.callsign[i] - 0x20) & 0x3F;
            }
            header[12] = frame.dest.ssid << 4 | frame.source.ssid;
            header[1] |= FLAG_TYPE1;
            if c.ui {
                header[0] |= FLAG_UI;
            }
            PID_FIELD.put(&mut header, u16::from(c.pid_nibble));
            CONTROL_FIELD.put(&mut header, u16::from(c.control));
            LENGTH_FIELD.put(&mut header, frame.info.len() as u16);
            Ok(Transcoded {
                header,
                kind: HeaderType::Type1,
                payload: frame.info,
            })
        }
        _reason => {
            #[cfg(feature = "logging")]
            if let Err(reason) = _reason {
                trace!("Type 0 header: {}", reason);
            }
            if raw.len() > MAX_PAYLOAD_LENGTH {
                return Err(Il2pError::PayloadTooLarge(raw.len(), MAX_PAYLOAD_LENGTH));
            }
            LENGTH_FIELD.put(&mut header, raw.len() as u16);
            Ok(Transcoded {
                header,
                kind: HeaderType::Type0,
                payload: raw,
            })
        }
    }
}

/// Translate a received (descrambled, corrected) IL2P header
pub fn decode(header: &HeaderBytes) -> Result<DecodedHeader, Il2pError> {
    let fec = if header[0] & FLAG_MAX_FEC != 0 {
        FecLevel::Max
    } else {
        FecLevel::Normal
    };
    let length = LENGTH_FIELD.get(header) as usize;
    if length > MAX_PAYLOAD_LENGTH {
        return Err(Il2pError::HeaderSemanticInvalid("payload length out of range"));
    }

    let mut out = DecodedHeader {
        kind: HeaderType::Type0,
        fec,
        payload_len: length,
        ax25: [0u8; MAX_AX25_HEADER],
        ax25_len: 0,
    };
    if header[1] & FLAG_TYPE1 == 0 {
        return Ok(out);
    }
    out.kind = HeaderType::Type1;

    let nibble = PID_FIELD.get(header) as u8;
    let ctrl = CONTROL_FIELD.get(header) as u8;
    let pf = (ctrl >> 6) & 0x01;
    let nr = (ctrl >> 3) & 0x07;
    let c_flag = ctrl & 0x04 != 0;

    let (control, pid, command, has_data) = if header[0] & FLAG_UI != 0 {
        let pid = nibble_to_pid(nibble)
            .ok_or(Il2pError::HeaderSemanticInvalid("unknown PID"))?;
        (0x03 | pf << 4, Some(pid), c_flag, true)
    } else {
        match nibble {
            NIBBLE_S_FRAME => {
                let ss = ctrl & 0x03;
                (nr << 5 | pf << 4 | ss << 2 | 0x01, None, c_flag, false)
            }
            NIBBLE_U_FRAME => {
                let base = U_OPCODES[nr as usize]
                    .ok_or(Il2pError::HeaderSemanticInvalid("UI opcode without UI flag"))?;
                (base | pf << 4, None, c_flag, u_opcode_has_data(nr))
            }
            _ => {
                let pid = nibble_to_pid(nibble)
                    .ok_or(Il2pError::HeaderSemanticInvalid("unknown PID"))?;
                let ns = ctrl & 0x07;
                (nr << 5 | pf << 4 | ns << 1, Some(pid), true, true)
            }
        }
    };

    for i in 0..6 {
        out.ax25[i] = ((header[i] & 0x3F) + 0x20) << 1;
        out.ax25[i + 7] = ((header[i + 6] & 0x3F) + 0x20) << 1;
    }
    let dest_ssid = header[12] >> 4;
    let src_ssid = header[12] & 0x0F;
    let c_bit = if command { 0x80 } else { 0 };
    out.ax25[6] = 0x60 | dest_ssid << 1 | c_bit;
    out.ax25[13] = 0x60 | src_ssid << 1 | (c_bit ^ 0x80) | 0x01;
    out.ax25[14] = control;
    out.ax25_len = AX25_MIN_ADDRESS_FIELD + 1;
    if let Some(pid) = pid {
        out.ax25[15] = pid;
        out.ax25_len += 1;
    }
    if !has_data {
        out.payload_len = 0;
    }
    Ok(out)
}
