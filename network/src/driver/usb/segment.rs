//! Segment walker for aggregated RX buffers.
//!
//! The device packs several frames into one bulk-in transfer:
//! ```text
//! | hdr | RXWI | payload | FCE | hdr | RXWI | payload | FCE | ...
//! |<-------- seg 0 --------->|<-------- seg 1 --------->|
//! ```
//! Each segment length is `DMA_HDRS + dma_len`, where `dma_len` is the
//! little-endian u16 at the front of the segment.
//!
//! [`Segments`] is a cursor over the reported bytes of one buffer. A bad
//! length field yields one error and ends the walk; a remainder too short
//! for any segment ends it silently.

use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::error::{DmaError, Result};
use crate::sync::Warn;
use crate::types::ieee80211::hdrlen_from_buf;
use crate::types::{FceInfo, Rxwi, DMA_HDRS, DMA_HDR_LEN, FCE_INFO_LEN, MIN_SEG_LEN, RXWI_LEN};

/// L2 padding inserted between the MAC header and the body.
pub const L2PAD_LEN: usize = 2;

/// Bad length field. Ends the walk over the current buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError {
    /// Length field is zero.
    ZeroLength,
    /// Segment would run past the reported transfer length.
    Overrun { dma_len: usize, remaining: usize },
    /// Length is not a multiple of 4.
    Misaligned(usize),
    /// Length cannot even hold the RXWI.
    TooShort(usize),
}

impl SegmentError {
    pub(crate) fn warn_kind(&self) -> Warn {
        match self {
            SegmentError::ZeroLength => Warn::SEG_LEN_ZERO,
            SegmentError::Overrun { .. } => Warn::SEG_OVERRUN,
            SegmentError::Misaligned(_) => Warn::SEG_MISALIGNED,
            SegmentError::TooShort(_) => Warn::SEG_SHORT,
        }
    }
}

/// Well-framed segment whose descriptor says it must not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentReject {
    /// Must-be-zero RXWI bytes are set.
    RxwiZero,
    /// FCE info type is not "packet".
    NonPacket(u8),
}

impl SegmentReject {
    pub(crate) fn warn_kind(&self) -> Warn {
        match self {
            SegmentReject::RxwiZero => Warn::RXWI_ZERO,
            SegmentReject::NonPacket(_) => Warn::NON_PKT,
        }
    }
}

/// One segment of an RX buffer.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub rxwi: Rxwi,
    pub fce: FceInfo,
    /// Bytes between the RXWI and the FCE info.
    pub payload: &'a [u8],
}

impl Segment<'_> {
    /// Descriptor sanity checks.
    pub fn check(&self) -> core::result::Result<(), SegmentReject> {
        if self.rxwi.zero_fields_set() {
            return Err(SegmentReject::RxwiZero);
        }
        if !self.fce.is_packet() {
            return Err(SegmentReject::NonPacket(self.fce.info_type()));
        }
        Ok(())
    }

    /// Copy the frame out, dropping L2 padding if the RXWI flags it.
    pub fn to_frame(&self) -> Result<Vec<u8>> {
        extract_frame(&self.rxwi, self.payload)
    }
}

/// Cursor over the segments of one RX buffer.
pub struct Segments<'a> {
    rest: &'a [u8],
    walked: usize,
    done: bool,
}

impl<'a> Segments<'a> {
    /// Walk `data`, the bytes the device reported for one transfer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            rest: data,
            walked: 0,
            done: false,
        }
    }

    /// Segments yielded so far.
    pub fn walked(&self) -> usize {
        self.walked
    }

    /// Validate the length field at the cursor, returning the segment length.
    fn next_seg_len(&self) -> Option<core::result::Result<usize, SegmentError>> {
        let data = self.rest;
        if data.len() < MIN_SEG_LEN {
            return None;
        }

        let dma_len = u16::from_le_bytes([data[0], data[1]]) as usize;
        let err = if dma_len == 0 {
            SegmentError::ZeroLength
        } else if dma_len + DMA_HDRS > data.len() {
            SegmentError::Overrun {
                dma_len,
                remaining: data.len(),
            }
        } else if dma_len & 0x3 != 0 {
            SegmentError::Misaligned(dma_len)
        } else if dma_len < RXWI_LEN {
            SegmentError::TooShort(dma_len)
        } else {
            return Some(Ok(DMA_HDRS + dma_len));
        };
        Some(Err(err))
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = core::result::Result<Segment<'a>, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let seg_len = match self.next_seg_len() {
            Some(Ok(len)) => len,
            Some(Err(e)) => {
                self.done = true;
                return Some(Err(e));
            }
            None => {
                self.done = true;
                return None;
            }
        };

        let (seg, rest) = self.rest.split_at(seg_len);
        self.rest = rest;
        self.walked += 1;

        // The FCE info carries what the DMA header leaves out.
        let tail = &seg[seg_len - FCE_INFO_LEN..];
        let fce = FceInfo(u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]));

        let body = &seg[DMA_HDR_LEN..seg_len - FCE_INFO_LEN];
        let rxwi = Rxwi::parse(body)?;

        Some(Ok(Segment {
            rxwi,
            fce,
            payload: &body[RXWI_LEN..],
        }))
    }
}

impl FusedIterator for Segments<'_> {}

/// Build the logical frame from a segment payload.
///
/// With L2 padding flagged the MAC header is copied, the 2 pad bytes are
/// skipped and the body follows. The header length comes from the frame
/// control field and is taken as 0 when it cannot be trusted.
pub fn extract_frame(rxwi: &Rxwi, payload: &[u8]) -> Result<Vec<u8>> {
    let mut frame = Vec::new();

    if !rxwi.has_l2pad() {
        frame
            .try_reserve_exact(payload.len())
            .map_err(|_| DmaError::OutOfMemory)?;
        frame.extend_from_slice(payload);
        return Ok(frame);
    }

    let len = payload.len().saturating_sub(L2PAD_LEN);
    let hdr_len = hdrlen_from_buf(&payload[..len]);
    let body = payload.get(hdr_len + L2PAD_LEN..).unwrap_or(&[]);

    frame
        .try_reserve_exact(len)
        .map_err(|_| DmaError::OutOfMemory)?;
    frame.extend_from_slice(&payload[..hdr_len]);
    frame.extend_from_slice(body);
    Ok(frame)
}
