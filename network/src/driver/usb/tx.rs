//! USB TX path.
//!
//! # Flow control
//! A ring at full occupancy stops the frame's upper queue; the completion
//! that brings occupancy down through `entries - entries / 8` wakes it.

use log::error;

use crate::driver::traits::{MacLayer, Softirq, TxUrb, UsbTransport};
use crate::driver::urb::Urb;
use crate::error::{DmaError, Result};
use crate::sync::Warn;
use crate::types::{TxFrame, TxInfo};
use crate::warn_once;
use super::config::DmaConfig;
use super::driver::UsbDma;

/// `hw_key_idx` value meaning no hardware key is installed.
pub const NO_HW_KEY: u8 = 0xff;

/// Occupancy at which a completion wakes the upper queue.
#[inline]
pub const fn wake_watermark(entries: usize) -> usize {
    entries - entries / 8
}

impl<T: UsbTransport, M: MacLayer, S: Softirq> UsbDma<T, M, S> {
    /// Wrap `frame` for hardware queue `hw_q` and submit it.
    ///
    /// `hw_key_idx` is the installed hardware key slot, or [`NO_HW_KEY`].
    /// On error the frame is dropped.
    pub fn enqueue_tx(&self, mut frame: TxFrame, hw_key_idx: u8, hw_q: u8) -> Result<()> {
        if !self.state.accepts_tx() {
            return Err(DmaError::NotReady);
        }

        let ep = DmaConfig::q2ep(hw_q)?;
        let mut flags = TxInfo::PKT_80211;
        if hw_key_idx == NO_HW_KEY {
            flags |= TxInfo::WIV;
        }
        frame.wrap_pkt(DmaConfig::ep2qsel(ep), flags)?;

        self.submit_tx(ep, frame)
    }

    /// Submit a wrapped frame on output endpoint index `ep`.
    ///
    /// The submission happens under the ring lock: the reserved slot is not
    /// published until the transport accepts the URB.
    fn submit_tx(&self, ep: usize, frame: TxFrame) -> Result<()> {
        let queue = frame.queue();
        let mut q = self.tx[ep].lock();

        if !q.is_populated() || !self.state.accepts_tx() {
            return Err(DmaError::NotReady);
        }

        let id = match q.reserve() {
            Ok(e) => e.id,
            Err(e) => {
                error!("tx: ring {} full, queue {} not stopped", ep, queue);
                self.stats.tx_queue_full();
                return Err(e);
            }
        };

        if let Err(err) = self.transport.submit_tx(self.config.out_eps[ep], Urb::new(id, frame)) {
            self.stats.tx_submit_failed();
            // Often the first sign of an unplugged device.
            if self.transport.is_fatal(err.status) {
                self.state.mark_removed();
            } else if self.should_log(err.status) {
                error!("tx: urb submit failed: {}", err.status);
            }
            return Err(err.status.into());
        }

        q.advance_producer()?;
        self.stats.tx_submitted();

        if q.is_full() {
            self.mac.stop_queue(queue);
            self.stats.tx_stops();
        }
        Ok(())
    }

    /// TX URB completion on bulk-out endpoint address `ep_addr`.
    ///
    /// Called by the transport, possibly from interrupt context.
    pub fn complete_tx(&self, ep_addr: u8, urb: TxUrb) {
        let (id, frame, status, _) = urb.into_parts();

        if self.should_log(status) {
            error!("tx: urb {} failed: {}", id.0, status);
        }

        let Some(ep) = self.config.out_eps.iter().position(|&a| a == ep_addr) else {
            warn_once!(self.once, Warn::TX_URB_MISMATCH, "tx: completion on unknown ep {:#x}", ep_addr);
            self.stats.tx_urb_mismatch();
            return;
        };

        {
            let mut q = self.tx[ep].lock();

            // Teardown already released the ring.
            if !q.is_populated() {
                return;
            }

            let expected = q.consumer().map(|e| e.id);
            if q.is_empty() || expected != Some(id) {
                warn_once!(
                    self.once,
                    Warn::TX_URB_MISMATCH,
                    "tx: urb {} completed on ep {}, expected {:?}",
                    id.0,
                    ep,
                    expected.map(|e| e.0)
                );
                self.stats.tx_urb_mismatch();
                return;
            }

            if q.occupancy() == wake_watermark(q.capacity()) {
                self.mac.wake_queue(frame.queue());
                self.stats.tx_wakes();
            }
            let _ = q.advance_consumer();
            self.stats.tx_completed();

            if status.is_ok() {
                self.state.set_more_stats();
                if !self.state.test_and_set_reading_stats() {
                    self.mac.schedule_stats(self.config.stats_delay);
                }
            } else {
                self.stats.tx_urb_errors();
            }
        }

        self.mac.tx_status(frame, status);
    }

    /// Called by the MAC statistics worker when a refresh finishes.
    ///
    /// Reruns the refresh if TX completions arrived in the meantime,
    /// otherwise lets the next completion start one.
    pub fn finish_stats_refresh(&self) {
        if self.state.take_more_stats() && self.state.accepts_tx() {
            self.mac.schedule_stats(self.config.stats_requeue_delay);
        } else {
            self.state.clear_reading_stats();
        }
    }
}
