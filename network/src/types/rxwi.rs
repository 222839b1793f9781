//! RX descriptor records found inside every DMA segment.
//!
//! # Segment layout
//! ```text
//! | DMA hdr | RXWI     | payload ...            | FCE info |
//! |   4B    |   24B    | dma_len - 24           |    4B    |
//! ```
//!
//! The DMA header only carries the segment length; the rest of the
//! descriptor lives in the FCE info word at the segment tail.

use bitflags::bitflags;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

// ═══════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// DMA header in front of every segment.
pub const DMA_HDR_LEN: usize = 4;

/// RX info word the device reports with every segment.
pub const RX_INFO_LEN: usize = 4;

/// FCE info word at the tail of every segment.
pub const FCE_INFO_LEN: usize = 4;

/// Bytes of a segment not covered by its DMA length field.
pub const DMA_HDRS: usize = DMA_HDR_LEN + FCE_INFO_LEN;

/// Size of the receive wireless info record.
pub const RXWI_LEN: usize = 24;

/// Smallest buffer remainder that can still hold a segment.
pub const MIN_SEG_LEN: usize = DMA_HDR_LEN + RX_INFO_LEN + RXWI_LEN + FCE_INFO_LEN;

/// FCE info `TYPE` field, bits 31:30. Zero means packet data.
pub const FCE_INFO_TYPE_SHIFT: u32 = 30;
pub const FCE_INFO_TYPE_MASK: u32 = 0x3 << FCE_INFO_TYPE_SHIFT;
/// FCE info `LEN` field, bits 13:0.
pub const FCE_INFO_LEN_MASK: u32 = 0x3fff;

/// RXWI `ctl` MPDU length, bits 27:16.
const RXWI_CTL_MPDU_LEN_SHIFT: u32 = 16;
const RXWI_CTL_MPDU_LEN_MASK: u32 = 0xfff << RXWI_CTL_MPDU_LEN_SHIFT;

bitflags! {
    /// RXWI `rxinfo` word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RxInfo: u32 {
        const BA        = 1 << 0;
        const DATA      = 1 << 1;
        const NULL      = 1 << 2;
        const FRAG      = 1 << 3;
        const U2M       = 1 << 4;
        const MULTICAST = 1 << 5;
        const BROADCAST = 1 << 6;
        const MYBSS     = 1 << 7;
        const CRCERR    = 1 << 8;
        const ICVERR    = 1 << 9;
        const MICERR    = 1 << 10;
        const AMSDU     = 1 << 11;
        const HTC       = 1 << 12;
        const RSSI      = 1 << 13;
        /// Two padding bytes follow the 802.11 header.
        const L2PAD     = 1 << 14;
        const AMPDU     = 1 << 15;
        const DECRYPT   = 1 << 16;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RXWI
// ═══════════════════════════════════════════════════════════════════════════

/// Receive wireless info, little-endian on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromZeroes, FromBytes, AsBytes, Unaligned)]
pub struct Rxwi {
    pub rxinfo: U32,
    pub ctl: U32,
    pub tid_sn: U16,
    pub rate: U16,
    pub unknown: u8,
    /// Must be zero.
    pub zero: [u8; 3],
    pub snr: [u8; 2],
    pub ant: u8,
    pub gain: u8,
    pub freq_off: u8,
    pub resv2: u8,
    pub expert_ant: u8,
    pub resv3: u8,
}

const _: () = assert!(core::mem::size_of::<Rxwi>() == RXWI_LEN);

impl Rxwi {
    /// Read an RXWI from the front of `bytes`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        Self::read_from_prefix(bytes)
    }

    pub fn rx_info(&self) -> RxInfo {
        RxInfo::from_bits_retain(self.rxinfo.get())
    }

    /// Hardware inserted 2 bytes of L2 padding after the MAC header.
    pub fn has_l2pad(&self) -> bool {
        self.rx_info().contains(RxInfo::L2PAD)
    }

    /// Any of the must-be-zero bytes set.
    pub fn zero_fields_set(&self) -> bool {
        self.zero.iter().any(|&b| b != 0)
    }

    pub fn mpdu_len(&self) -> u16 {
        ((self.ctl.get() & RXWI_CTL_MPDU_LEN_MASK) >> RXWI_CTL_MPDU_LEN_SHIFT) as u16
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FCE INFO
// ═══════════════════════════════════════════════════════════════════════════

/// Descriptor word read from the last 4 bytes of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FceInfo(pub u32);

impl FceInfo {
    pub fn info_type(&self) -> u8 {
        ((self.0 & FCE_INFO_TYPE_MASK) >> FCE_INFO_TYPE_SHIFT) as u8
    }

    /// Segment carries an 802.11 packet (not a command response or event).
    pub fn is_packet(&self) -> bool {
        self.info_type() == 0
    }

    pub fn info_len(&self) -> u16 {
        (self.0 & FCE_INFO_LEN_MASK) as u16
    }
}
