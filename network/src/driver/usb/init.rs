//! USB DMA bring-up and teardown.
//!
//! # Init order
//! 1. TX rings: one transfer handle per slot, every output endpoint
//! 2. RX ring: one buffer and one transfer handle per slot
//! 3. Post every RX buffer
//!
//! Any failure runs [`UsbDma::cleanup`] before the error is returned.
//!
//! # Cleanup order
//! 1. Lifecycle to `Dead`: nothing new is decoded, reposted or submitted
//! 2. Poison every RX handle
//! 3. Kill the RX bottom half, waiting for a running pass
//! 4. Release RX buffers and handles
//! 5. Poison and release TX handles

use log::{debug, error, warn};

use crate::dma::{RxBuf, N_RX_ENTRIES, N_TX_ENTRIES};
use crate::driver::traits::{MacLayer, Softirq, UsbTransport};
use crate::driver::urb::Urb;
use crate::error::{DmaError, Result};
use crate::sync::Lifecycle;
use super::driver::{RxEntry, TxEntry, UsbDma};

impl<T: UsbTransport, M: MacLayer, S: Softirq> UsbDma<T, M, S> {
    /// Allocate every ring and post the RX buffers. `Created` → `Running`.
    pub fn init(&self) -> Result<()> {
        if self.state.get() != Lifecycle::Created {
            return Err(DmaError::NotReady);
        }

        if let Err(e) = self.try_init() {
            error!("dma: init failed: {}", e);
            self.cleanup();
            return Err(e);
        }

        debug!(
            "dma: up, {} rx buffers of {} bytes posted on ep {:#x}",
            N_RX_ENTRIES, self.config.rx_urb_size, self.config.in_ep
        );
        Ok(())
    }

    fn try_init(&self) -> Result<()> {
        self.alloc_tx()?;
        self.alloc_rx()?;
        // Running before the first post: a completion may be decoded at once.
        if !self.state.start() {
            return Err(DmaError::NotReady);
        }
        self.submit_rx()
    }

    fn alloc_tx(&self) -> Result<()> {
        for ring in &self.tx {
            let mut q = ring.lock();
            q.alloc()?;
            for _ in 0..N_TX_ENTRIES {
                let id = self.transport.alloc_urb().ok_or(DmaError::OutOfMemory)?;
                if let Err(e) = q.push(TxEntry { id }) {
                    self.transport.free_urb(id);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn alloc_rx(&self) -> Result<()> {
        let mut rx = self.rx.lock();
        rx.alloc()?;
        for _ in 0..N_RX_ENTRIES {
            let buf = RxBuf::alloc(self.config.rx_urb_size)?;
            let id = self.transport.alloc_urb().ok_or(DmaError::OutOfMemory)?;
            if let Err(e) = rx.push(RxEntry::new(id, buf)) {
                self.transport.free_urb(id);
                return Err(e);
            }
        }
        Ok(())
    }

    fn submit_rx(&self) -> Result<()> {
        for idx in 0..N_RX_ENTRIES {
            let (id, buf) = {
                let mut rx = self.rx.lock();
                let e = rx.get_mut(idx).ok_or(DmaError::NotReady)?;
                (e.id, e.buf.take())
            };
            let Some(buf) = buf else {
                continue;
            };

            if let Err(err) = self.transport.submit_rx(self.config.in_ep, Urb::new(id, buf)) {
                if self.transport.is_fatal(err.status) {
                    self.state.mark_removed();
                }
                let status = err.status;
                let (_, buf, _, _) = err.urb.into_parts();
                self.park_at(idx, buf);
                return Err(status.into());
            }
        }
        Ok(())
    }

    /// Stop the data path and release everything `init` allocated.
    ///
    /// Safe to call more than once, and concurrently with completions.
    pub fn cleanup(&self) {
        self.state.kill();
        self.kill_rx();
        self.rx_tasklet.kill();
        self.free_rx();
        self.free_tx();
    }

    /// Poison every RX handle. The lock is dropped around each poison call;
    /// the transport may be delivering a completion that needs it.
    fn kill_rx(&self) {
        for idx in 0..N_RX_ENTRIES {
            let id = self.rx.lock().get(idx).map(|e| e.id);
            if let Some(id) = id {
                self.transport.poison(id);
            }
        }
    }

    fn free_rx(&self) {
        let mut rx = self.rx.lock();
        for e in rx.drain() {
            drop(e.buf);
            self.transport.free_urb(e.id);
        }
    }

    fn free_tx(&self) {
        for (ep, ring) in self.tx.iter().enumerate() {
            let used = ring.lock().occupancy();
            if used != 0 {
                warn!("tx: ring {} has {} urbs in flight at cleanup", ep, used);
            }

            for idx in 0..N_TX_ENTRIES {
                let id = ring.lock().get(idx).map(|e| e.id);
                if let Some(id) = id {
                    self.transport.poison(id);
                }
            }

            let mut q = ring.lock();
            for e in q.drain() {
                self.transport.free_urb(e.id);
            }
        }
    }
}
