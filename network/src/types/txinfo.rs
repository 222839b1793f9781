//! TXINFO word prepended to every bulk-out transfer.
//!
//! # Transfer layout
//! ```text
//! |   4B   | xfer len |      pad       |  4B  |
//! | TXINFO | pkt/cmd  | zero pad to 4B | zero |
//! ```
//!
//! The TXINFO length field holds `xfer len` rounded up to 4.

use bitflags::bitflags;

/// TXINFO word length.
pub const TXINFO_LEN: usize = 4;

/// Zero trailer closing every transfer.
pub const TX_TRAILER_LEN: usize = 4;

bitflags! {
    /// Flag bits of the TXINFO word. Multi-bit fields are packed by
    /// [`TxInfo::pack`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TxInfo: u32 {
        const NEXT_VLD = 1 << 16;
        const TX_BURST = 1 << 17;
        /// Payload is an 802.11 frame.
        const PKT_80211 = 1 << 19;
        const TSO = 1 << 20;
        const CSO = 1 << 21;
        /// Wireless info valid: no hardware key, the TXWI carries the IV.
        const WIV = 1 << 24;
    }
}

const LEN_MASK: u32 = 0xffff;
const QSEL_SHIFT: u32 = 25;
const QSEL_MASK: u32 = 0x3 << QSEL_SHIFT;
const D_PORT_SHIFT: u32 = 27;
const D_PORT_MASK: u32 = 0x7 << D_PORT_SHIFT;
const TYPE_SHIFT: u32 = 30;
const TYPE_MASK: u32 = 0x3 << TYPE_SHIFT;

/// Destination port inside the device.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaPort {
    Wlan = 0,
    Cpu = 2,
}

/// Transfer content type.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoType {
    Packet = 0,
    Command = 1,
}

/// Hardware queue selector in the DMA engine.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qsel {
    Mgmt = 0,
    Hcca = 1,
    Edca = 2,
    Edca2 = 3,
}

impl TxInfo {
    /// Build the full TXINFO word.
    pub fn pack(self, xfer_len: usize, qsel: Qsel, port: DmaPort, ty: InfoType) -> u32 {
        self.bits()
            | (round_up4(xfer_len) as u32 & LEN_MASK)
            | ((qsel as u32) << QSEL_SHIFT) & QSEL_MASK
            | ((port as u32) << D_PORT_SHIFT) & D_PORT_MASK
            | ((ty as u32) << TYPE_SHIFT) & TYPE_MASK
    }

    /// Length field of a packed word.
    pub fn len_of(word: u32) -> usize {
        (word & LEN_MASK) as usize
    }

    /// Queue selector field of a packed word.
    pub fn qsel_of(word: u32) -> u8 {
        ((word & QSEL_MASK) >> QSEL_SHIFT) as u8
    }
}

#[inline]
pub const fn round_up4(len: usize) -> usize {
    (len + 3) & !3
}
