//! Constants and limits for the IL2P link coding

/// Symbols (dibits) per byte
pub const SYMBOLS_PER_BYTE: usize = 4;

/// Transcoded header size before FEC
pub const HEADER_LENGTH_BYTES: usize = 13;

/// Parity symbols protecting the header
pub const HEADER_PARITY_BYTES: usize = 2;

/// Header size on the wire
pub const HEADER_WIRE_BYTES: usize = HEADER_LENGTH_BYTES + HEADER_PARITY_BYTES;

/// Largest payload the 10-bit length field can describe
pub const MAX_PAYLOAD_LENGTH: usize = 1023;

/// Upper bound on payload parity: 5 blocks of 16 symbols
pub const MAX_PAYLOAD_PARITY: usize = 80;

/// Length of the Hamming-coded CRC trailer
pub const CRC_LENGTH_BYTES: usize = 4;

/// Largest IL2P frame after the sync word
pub const MAX_FRAME_BYTES: usize =
    HEADER_WIRE_BYTES + MAX_PAYLOAD_LENGTH + MAX_PAYLOAD_PARITY + CRC_LENGTH_BYTES;

/// Largest AX.25 header a type 1 header expands to (addresses, control, PID)
pub const MAX_AX25_HEADER: usize = 16;

/// Largest packet handed to a frame sink
pub const MAX_PACKET_LENGTH: usize = MAX_AX25_HEADER + MAX_PAYLOAD_LENGTH;

/// Reed-Solomon codeword length over GF(256)
pub const RS_BLOCK_LENGTH: usize = 255;

/// Most parity symbols any block uses
pub const MAX_NROOTS: usize = 16;

/// Block data limit with maximum FEC
pub const MAX_FEC_BLOCK_DATA: usize = 239;

/// Block data limit with normal FEC
pub const NORMAL_FEC_BLOCK_DATA: usize = 247;

/// Long (24 symbol) sync word
pub const SYNC_WORD_LONG: &[u8; 6] = &[0x55, 0xFD, 0xDD, 0x57, 0xDF, 0x7F];

/// Short (16 symbol) sync word
pub const SYNC_WORD_SHORT: &[u8; 4] = &[0x5D, 0x57, 0xDF, 0x7F];

/// Bit errors tolerated when confirming a sync word
pub const MAX_SYNC_BIT_ERRORS: u32 = 2;

/// Symbol sign errors tolerated by the coarse search, long sync
pub const MAX_SYNC_SYMBOL_ERRORS_LONG: u32 = 3;

/// Symbol sign errors tolerated by the coarse search, short sync
pub const MAX_SYNC_SYMBOL_ERRORS_SHORT: u32 = 2;

/// Samples between the first sync acceptance and leaving the search state
pub const SYNC_COUNTDOWN: u8 = 5;

/// Q15 fraction of the sync peak used as the initial slicing threshold (0.55)
pub const SYNC_THRESHOLD_Q15: i32 = 18750;

/// Depth of the centre/threshold averaging window
pub const LEVEL_HISTORY: usize = 16;

/// Ideal amplitude for the four symbol levels, outermost first
pub const LEVEL_A: i16 = 1362;
/// Inner positive level
pub const LEVEL_B: i16 = 454;
/// Inner negative level
pub const LEVEL_C: i16 = -454;
/// Outer negative level
pub const LEVEL_D: i16 = -1362;

/// Samples per symbol the pulse shaping taps are designed for
pub const RRC_SYMBOL_LENGTH: usize = 5;

/// Root raised cosine transmit taps, roll-off 0.2 over 8 symbols, in time order
///
/// Padded to a multiple of the interpolation factor.
#[rustfmt::skip]
pub const RRC_TX_TAPS: [i16; 45] = [
    850, 219, -720, -1548, -1795, -1172, 237, 1927, 3120, 3073,
    1447, -1431, -4544, -6442, -5735, -1633, 5651, 14822, 23810, 30367,
    32767, 30367, 23810, 14822, 5651, -1633, -5735, -6442, -4544, -1431,
    1447, 3073, 3120, 1927, 237, -1172, -1795, -1548, -720, 219,
    850, 0, 0, 0, 0,
];

/// Root raised cosine matched filter taps for the receive path
#[rustfmt::skip]
pub const RRC_RX_TAPS: [i16; 42] = [
    401, 104, -340, -731, -847, -553, 112, 909, 1472, 1450,
    683, -675, -2144, -3040, -2706, -770, 2667, 6995, 11237, 14331,
    15464, 14331, 11237, 6995, 2667, -770, -2706, -3040, -2144, -675,
    683, 1450, 1472, 909, 112, -553, -847, -731, -340, 104,
    401, 0,
];

/// Idle pattern sent as preamble and between frames
pub const PREAMBLE_BYTE: u8 = 0x77;

/// Idle bytes appended after every frame in the TX FIFO
pub const FRAME_SPACER_BYTES: usize = 10;

/// Capacity of the transmit byte FIFO
pub const TX_FIFO_BYTES: usize = 3000;

/// Scrambler seed used on transmit
pub const SCRAMBLE_SEED: u16 = 0x000F;

/// Scrambler feedback taps
pub const SCRAMBLE_TAPS: u16 = 0x0108;

/// Descrambler seed used on receive
pub const DESCRAMBLE_SEED: u16 = 0x01F0;

/// Descrambler feedback taps
pub const DESCRAMBLE_TAPS: u16 = 0x0211;

/// Scrambler output bits discarded while priming
pub const SCRAMBLE_DELAY_BITS: usize = 5;

/// AX.25 poll/final bit in the control field
pub const CONTROL_PF: u8 = 0x10;

/// AX.25 unnumbered-information control byte
pub const CONTROL_UI: u8 = 0x03;

/// AX.25 "no layer 3" protocol identifier
pub const PID_NO_LAYER3: u8 = 0xF0;

/// AX.25 address length (callsign plus SSID byte)
pub const AX25_ADDRESS_LEN: usize = 7;

/// Destination plus source address
pub const AX25_MIN_ADDRESS_FIELD: usize = 2 * AX25_ADDRESS_LEN;

/// Destination, source and at most eight digipeaters
pub const AX25_MAX_ADDRESSES: usize = 10;
