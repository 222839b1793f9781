//! USB DMA configuration.

use core::time::Duration;

use crate::dma::{MT_RX_URB_SIZE, N_OUT_EPS};
use crate::error::{DmaError, Result};
use crate::types::{Qsel, MIN_SEG_LEN};

/// Default bulk-in endpoint for packet data.
pub const DEFAULT_IN_EP: u8 = 0x84;

/// Default bulk-out endpoints. Index 0 carries in-band commands and is never
/// used for data.
pub const DEFAULT_OUT_EPS: [u8; N_OUT_EPS] = [0x08, 0x04, 0x05, 0x06, 0x07, 0x09];

/// Endpoint index served by the management queue selector.
pub const MGMT_EP_INDEX: usize = 5;

/// Delay before the first statistics read after a TX completion.
pub const STATS_DELAY: Duration = Duration::from_millis(10);

/// Delay before a statistics refresh reruns itself.
pub const STATS_REQUEUE_DELAY: Duration = Duration::from_millis(20);

/// DMA engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmaConfig {
    /// Bulk-in endpoint address RX buffers are posted to.
    pub in_ep: u8,
    /// Bulk-out endpoint addresses, one TX ring each.
    pub out_eps: [u8; N_OUT_EPS],
    /// Bytes per RX buffer.
    pub rx_urb_size: usize,
    /// First statistics refresh delay.
    pub stats_delay: Duration,
    /// Statistics refresh requeue delay.
    pub stats_requeue_delay: Duration,
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self {
            in_ep: DEFAULT_IN_EP,
            out_eps: DEFAULT_OUT_EPS,
            rx_urb_size: MT_RX_URB_SIZE,
            stats_delay: STATS_DELAY,
            stats_requeue_delay: STATS_REQUEUE_DELAY,
        }
    }
}

impl DmaConfig {
    /// Reject sizes the segment walker cannot work with, and endpoint sets
    /// that would not route completions back to a single ring.
    pub fn validate(&self) -> Result<()> {
        if self.rx_urb_size < MIN_SEG_LEN || self.rx_urb_size & 0x3 != 0 {
            return Err(DmaError::InvalidConfig);
        }
        for (i, ep) in self.out_eps.iter().enumerate() {
            if self.out_eps[i + 1..].contains(ep) {
                return Err(DmaError::InvalidConfig);
            }
        }
        Ok(())
    }

    /// Output endpoint index for hardware queue `hw_q`.
    pub fn q2ep(hw_q: u8) -> Result<usize> {
        let ep = hw_q as usize + 1;
        if ep >= N_OUT_EPS {
            return Err(DmaError::InvalidQueue(hw_q));
        }
        Ok(ep)
    }

    /// Queue selector the device applies to traffic on endpoint `ep`.
    pub fn ep2qsel(ep: usize) -> Qsel {
        if ep == MGMT_EP_INDEX {
            Qsel::Mgmt
        } else {
            Qsel::Edca
        }
    }
}
