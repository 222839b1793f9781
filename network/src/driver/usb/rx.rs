//! USB RX path.
//!
//! Completion context only files the buffer into the ring and schedules the
//! bottom half. Decoding and reposting run in [`UsbDma::rx_bottom_half`]
//! without the ring lock held.

use log::{error, trace};

use crate::dma::{Ring, RxBuf};
use crate::driver::traits::{MacLayer, RxUrb, RxVerdict, Softirq, UsbTransport};
use crate::driver::urb::{Urb, UrbId, UrbStatus};
use crate::sync::Warn;
use crate::warn_once;
use super::driver::{RxEntry, UsbDma};
use super::segment::{Segment, Segments};

impl<T: UsbTransport, M: MacLayer, S: Softirq> UsbDma<T, M, S> {
    // ═══════════════════════════════════════════════════════════════════════
    // COMPLETION
    // ═══════════════════════════════════════════════════════════════════════

    /// RX URB completion. Called by the transport, possibly from interrupt
    /// context. Never blocks beyond the RX lock and never decodes.
    pub fn complete_rx(&self, urb: RxUrb) {
        let (id, buf, status, len) = urb.into_parts();

        if self.should_log(status) {
            error!("rx: urb {} failed: {}", id.0, status);
        }

        {
            let mut rx = self.rx.lock();

            // Teardown already released the ring.
            if !rx.is_populated() {
                return;
            }

            let expected = rx.producer().map(|e| e.id);
            if expected != Some(id) || rx.is_full() {
                self.stats.rx_urb_mismatch();
                if rx.is_full() {
                    warn_once!(self.once, Warn::RX_RING_FULL, "rx: completion for urb {} on a full ring", id.0);
                } else {
                    warn_once!(
                        self.once,
                        Warn::RX_URB_MISMATCH,
                        "rx: urb {} completed, expected {:?}",
                        id.0,
                        expected.map(|e| e.0)
                    );
                }
                park(&mut rx, id, buf);
                return;
            }

            if let Some(e) = rx.producer_mut() {
                e.buf = Some(buf);
                e.status = status;
                e.len = len;
            }
            // Checked full above.
            let _ = rx.advance_producer();
        }

        self.stats.rx_urbs();
        if !status.is_ok() {
            self.stats.rx_urb_errors();
        }

        if self.rx_tasklet.schedule() {
            self.softirq.raise();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BOTTOM HALF
    // ═══════════════════════════════════════════════════════════════════════

    /// Drain completed RX buffers: decode each one, then hand it back to the
    /// transport. Concurrent callers never overlap; the loser returns at once.
    ///
    /// Returns `true` if this call did the draining.
    pub fn rx_bottom_half(&self) -> bool {
        self.rx_tasklet.run(|| self.drain_rx())
    }

    fn drain_rx(&self) {
        while let Some((idx, id, buf, status, len)) = self.pop_rx() {
            if status.is_ok() && self.state.accepts_rx() {
                self.process_entry(&buf, len);
            }
            self.repost(idx, id, buf);
        }
    }

    /// Retire the oldest completed entry, taking its buffer.
    fn pop_rx(&self) -> Option<(usize, UrbId, RxBuf, UrbStatus, usize)> {
        let mut rx = self.rx.lock();
        loop {
            let (idx, e) = rx.advance_consumer()?;
            match e.buf.take() {
                Some(buf) => return Some((idx, e.id, buf, e.status, e.len)),
                // Published without a buffer cannot happen; skip the slot.
                None => continue,
            }
        }
    }

    /// Decode every segment of one buffer.
    fn process_entry(&self, buf: &RxBuf, len: usize) {
        let mut segs = Segments::new(buf.filled(len));

        for seg in segs.by_ref() {
            match seg {
                Ok(seg) => self.process_seg(&seg),
                Err(e) => {
                    warn_once!(self.once, e.warn_kind(), "rx: bad segment length: {:?}", e);
                    self.stats.rx_bad_len();
                    break;
                }
            }
        }

        let cnt = segs.walked();
        self.stats.rx_segments_n(cnt as u64);
        if cnt > 1 {
            self.stats.rx_aggr();
            trace!("rx: {} segments in one buffer", cnt);
        }
    }

    fn process_seg(&self, seg: &Segment<'_>) {
        if let Err(reject) = seg.check() {
            warn_once!(self.once, reject.warn_kind(), "rx: segment rejected: {:?}", reject);
            self.stats.rx_bad_seg();
            return;
        }

        let frame = match seg.to_frame() {
            Ok(frame) => frame,
            Err(_) => {
                self.stats.rx_oom();
                return;
            }
        };

        match self.mac.rx_frame(frame, &seg.rxwi) {
            RxVerdict::Accepted => self.stats.rx_frames(),
            RxVerdict::Rejected => self.stats.rx_rejected(),
        }
    }

    /// Hand a drained buffer back to the device. On failure the buffer is
    /// parked in its slot so teardown frees it.
    fn repost(&self, idx: usize, id: UrbId, buf: RxBuf) {
        if !self.state.accepts_rx() {
            self.park_at(idx, buf);
            return;
        }

        let err = match self.transport.submit_rx(self.config.in_ep, Urb::new(id, buf)) {
            Ok(()) => return,
            Err(err) => err,
        };

        self.stats.rx_repost_failed();
        let first_removal = self.transport.is_fatal(err.status) && self.state.mark_removed();
        if first_removal || self.should_log(err.status) {
            error!("rx: repost of urb {} failed: {}", id.0, err.status);
        }

        let (_, buf, _, _) = err.urb.into_parts();
        self.park_at(idx, buf);
    }

    pub(super) fn park_at(&self, idx: usize, buf: RxBuf) {
        let mut rx = self.rx.lock();
        if let Some(e) = rx.get_mut(idx) {
            if e.buf.is_none() {
                e.buf = Some(buf);
            }
        }
    }
}

/// Return a buffer from a mismatched completion to the slot that owns its
/// handle, if that slot is empty. Otherwise it is dropped.
fn park(rx: &mut Ring<RxEntry>, id: UrbId, buf: RxBuf) {
    if let Some(idx) = rx.position(|e| e.id == id) {
        if let Some(e) = rx.get_mut(idx) {
            if e.buf.is_none() {
                e.buf = Some(buf);
            }
        }
    }
}
