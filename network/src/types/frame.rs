//! Outbound frame owned by the TX path while a transfer is in flight.

use alloc::vec::Vec;

use crate::error::{DmaError, Result};
use super::txinfo::{round_up4, DmaPort, InfoType, Qsel, TxInfo, TXINFO_LEN, TX_TRAILER_LEN};

/// Outbound 802.11 frame plus the metadata the TX path needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFrame {
    /// Transfer bytes. Equal to the frame until [`TxFrame::wrap_pkt`] runs.
    data: Vec<u8>,
    /// Upper-layer queue the frame came from. Used for stop/wake.
    queue: u8,
    /// Frame length before TXINFO wrapping.
    frame_len: usize,
    wrapped: bool,
}

impl TxFrame {
    pub fn new(data: Vec<u8>, queue: u8) -> Self {
        let frame_len = data.len();
        Self {
            data,
            queue,
            frame_len,
            wrapped: false,
        }
    }

    /// Upper-layer queue mapping.
    pub fn queue(&self) -> u8 {
        self.queue
    }

    /// Bytes handed to the transport.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Transfer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The original frame, without TXINFO and padding.
    pub fn payload(&self) -> &[u8] {
        if self.wrapped {
            &self.data[TXINFO_LEN..TXINFO_LEN + self.frame_len]
        } else {
            &self.data
        }
    }

    /// Raw TXINFO word, if wrapped.
    pub fn txinfo(&self) -> Option<u32> {
        if !self.wrapped {
            return None;
        }
        let mut word = [0u8; TXINFO_LEN];
        word.copy_from_slice(&self.data[..TXINFO_LEN]);
        Some(u32::from_le_bytes(word))
    }

    /// Prepend the TXINFO word for a WLAN packet and pad the transfer.
    ///
    /// Fails with `OutOfMemory` if the buffer cannot grow; the frame is left
    /// untouched in that case.
    pub fn wrap_pkt(&mut self, qsel: Qsel, flags: TxInfo) -> Result<()> {
        debug_assert!(!self.wrapped, "frame wrapped twice");

        let padded = round_up4(self.frame_len);
        let total = TXINFO_LEN + padded + TX_TRAILER_LEN;
        let mut out = Vec::new();
        out.try_reserve_exact(total).map_err(|_| DmaError::OutOfMemory)?;

        let info = flags.pack(self.frame_len, qsel, DmaPort::Wlan, InfoType::Packet);
        out.extend_from_slice(&info.to_le_bytes());
        out.extend_from_slice(&self.data);
        out.resize(total, 0);

        self.data = out;
        self.wrapped = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_wrap_layout() {
        let mut frame = TxFrame::new(vec![0xaa; 30], 2);
        frame.wrap_pkt(Qsel::Edca, TxInfo::PKT_80211).unwrap();

        assert_eq!(frame.len(), 4 + 32 + 4);
        assert_eq!(frame.payload(), &[0xaa; 30][..]);
        assert_eq!(TxInfo::len_of(frame.txinfo().unwrap()), 32);
        assert_eq!(&frame.as_bytes()[34..], &[0u8; 6][..]);
        assert_eq!(frame.queue(), 2);
    }

    #[test]
    fn test_unwrapped_payload_is_whole_frame() {
        let frame = TxFrame::new(vec![1, 2, 3], 0);
        assert_eq!(frame.payload(), &[1, 2, 3][..]);
        assert_eq!(frame.txinfo(), None);
    }
}
