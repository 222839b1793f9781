use usbnet_dma::types::{RxInfo, RXWI_LEN};

/// Builds RX buffers the way the device lays them out.
pub struct SegmentBuilder {
    data: Vec<u8>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Plain packet segment carrying `payload`.
    pub fn packet(self, payload: &[u8]) -> Self {
        self.segment(payload, 0, 0, [0; 3])
    }

    /// Packet segment with L2 padding flagged.
    pub fn padded(self, payload: &[u8]) -> Self {
        self.segment(payload, RxInfo::L2PAD.bits(), 0, [0; 3])
    }

    /// Segment whose FCE info type is `ty` (non-zero is not a packet).
    pub fn typed(self, payload: &[u8], ty: u32) -> Self {
        self.segment(payload, 0, ty << 30, [0; 3])
    }

    /// Segment with must-be-zero RXWI bytes set.
    pub fn dirty_rxwi(self, payload: &[u8]) -> Self {
        self.segment(payload, 0, 0, [0, 0xff, 0])
    }

    /// Raw bytes, for malformed length fields.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn segment(mut self, payload: &[u8], rxinfo: u32, fce: u32, zero: [u8; 3]) -> Self {
        assert_eq!(payload.len() % 4, 0, "payload must keep segments aligned");
        let dma_len = RXWI_LEN + payload.len();

        self.data.extend_from_slice(&(dma_len as u16).to_le_bytes());
        self.data.extend_from_slice(&[0, 0]);

        let mut rxwi = [0u8; RXWI_LEN];
        rxwi[0..4].copy_from_slice(&rxinfo.to_le_bytes());
        rxwi[13..16].copy_from_slice(&zero);
        self.data.extend_from_slice(&rxwi);

        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(&fce.to_le_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// 24-byte data frame header followed by `body`.
pub fn data_frame(body: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 24];
    frame[0] = 0x08;
    frame[4..10].copy_from_slice(&[0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
    frame.extend_from_slice(body);
    frame
}
