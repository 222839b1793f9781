//! USB DMA engine.
//!
//! One RX ring feeding a single-flight bottom half, one TX ring per output
//! endpoint. The engine owns every ring; collaborators only see URBs moving
//! in and out through [`UsbTransport`], [`MacLayer`] and [`Softirq`].
//!
//! ```text
//!            complete_rx ──> RX ring ──tasklet──> rx_bottom_half ──> MacLayer
//!                 ▲                                    │
//!                 └───────────── submit_rx <───────────┘ (repost)
//!
//!   enqueue_tx ──> TX ring[ep] ──submit_tx──> transport ──> complete_tx ──> MacLayer
//! ```

use spin::Mutex;

use crate::dma::{Ring, RxBuf, N_OUT_EPS, N_RX_ENTRIES, N_TX_ENTRIES};
use crate::driver::traits::{MacLayer, Softirq, UsbTransport};
use crate::driver::urb::{UrbId, UrbStatus};
use crate::stats::{DmaStats, StatsSnapshot};
use crate::sync::{DeviceState, Lifecycle, LogOnce, Tasklet, Warn};
use super::config::DmaConfig;
use crate::error::Result;

/// RX ring slot: one transfer handle plus its buffer while software holds it.
#[derive(Debug)]
pub(crate) struct RxEntry {
    pub(crate) id: UrbId,
    /// `None` while the transport owns the buffer.
    pub(crate) buf: Option<RxBuf>,
    /// Outcome of the last completion.
    pub(crate) status: UrbStatus,
    /// Bytes reported by the last completion.
    pub(crate) len: usize,
}

impl RxEntry {
    pub(crate) fn new(id: UrbId, buf: RxBuf) -> Self {
        Self {
            id,
            buf: Some(buf),
            status: UrbStatus::Ok,
            len: 0,
        }
    }
}

/// TX ring slot. The frame itself travels inside the URB.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TxEntry {
    pub(crate) id: UrbId,
}

/// USB DMA data path for one device.
pub struct UsbDma<T: UsbTransport, M: MacLayer, S: Softirq> {
    pub(super) transport: T,
    pub(super) mac: M,
    pub(super) softirq: S,
    pub(super) config: DmaConfig,
    pub(super) state: DeviceState,
    /// Completed-but-undecoded buffers.
    pub(super) rx: Mutex<Ring<RxEntry>>,
    /// In-flight transfers, per output endpoint.
    pub(super) tx: [Mutex<Ring<TxEntry>>; N_OUT_EPS],
    pub(super) rx_tasklet: Tasklet,
    pub(super) stats: DmaStats,
    pub(super) once: LogOnce,
}

impl<T: UsbTransport, M: MacLayer, S: Softirq> UsbDma<T, M, S> {
    /// Create an engine in the `Created` state. Nothing is allocated until
    /// [`UsbDma::init`].
    pub fn new(transport: T, mac: M, softirq: S, config: DmaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            mac,
            softirq,
            config,
            state: DeviceState::new(),
            rx: Mutex::new(Ring::new(N_RX_ENTRIES)),
            tx: core::array::from_fn(|_| Mutex::new(Ring::new(N_TX_ENTRIES))),
            rx_tasklet: Tasklet::new(),
            stats: DmaStats::default(),
            once: LogOnce::new(),
        })
    }

    pub fn state(&self) -> Lifecycle {
        self.state.get()
    }

    /// Device-removed latch.
    pub fn is_removed(&self) -> bool {
        self.state.is_removed()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &DmaConfig {
        &self.config
    }

    /// Completed RX buffers waiting for the bottom half.
    pub fn rx_occupancy(&self) -> usize {
        self.rx.lock().occupancy()
    }

    /// In-flight transfers on output endpoint `ep`.
    pub fn tx_occupancy(&self, ep: usize) -> Option<usize> {
        self.tx.get(ep).map(|q| q.lock().occupancy())
    }

    /// Error kinds already reported.
    pub fn warned(&self) -> Warn {
        self.once.seen()
    }

    /// A "reading stats" refresh is outstanding.
    pub fn stats_refresh_pending(&self) -> bool {
        self.state.is_reading_stats()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn mac(&self) -> &M {
        &self.mac
    }

    pub fn softirq(&self) -> &S {
        &self.softirq
    }

    /// Whether an error status is worth a log line right now.
    pub(super) fn should_log(&self, status: UrbStatus) -> bool {
        status.has_error() && !self.state.is_removed()
    }
}
