//! Data-path counters.
//!
//! Relaxed atomics bumped from completion and bottom-half context. Read them
//! through [`DmaStats::snapshot`]; individual counters are not coherent with
//! each other.

use core::sync::atomic::{AtomicU64, Ordering};

macro_rules! counters {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        /// Live counters.
        #[derive(Default)]
        pub struct DmaStats {
            $($(#[$doc])* $name: AtomicU64,)*
        }

        /// Point-in-time copy of [`DmaStats`].
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct StatsSnapshot {
            $($(#[$doc])* pub $name: u64,)*
        }

        impl DmaStats {
            pub fn snapshot(&self) -> StatsSnapshot {
                StatsSnapshot {
                    $($name: self.$name.load(Ordering::Relaxed),)*
                }
            }

            $(
                #[inline]
                pub(crate) fn $name(&self) {
                    self.$name.fetch_add(1, Ordering::Relaxed);
                }
            )*
        }
    };
}

counters! {
    /// RX URBs completed into the ring.
    rx_urbs,
    /// RX URBs completed with an error status.
    rx_urb_errors,
    /// RX completions that did not match the producer slot.
    rx_urb_mismatch,
    /// Well-formed segments walked.
    rx_segments,
    /// Buffers that carried more than one segment.
    rx_aggr,
    /// Buffers whose segment walk stopped on a malformed length.
    rx_bad_len,
    /// Segments rejected for reserved bits or a non-packet type.
    rx_bad_seg,
    /// Frames dropped because no memory was available.
    rx_oom,
    /// Frames accepted by the MAC layer.
    rx_frames,
    /// Frames rejected by the MAC layer.
    rx_rejected,
    /// RX buffer reposts refused by the transport.
    rx_repost_failed,
    /// TX URBs submitted.
    tx_submitted,
    /// TX URBs completed.
    tx_completed,
    /// TX URBs completed with an error status.
    tx_urb_errors,
    /// TX completions that did not match the consumer slot.
    tx_urb_mismatch,
    /// Enqueue attempts on a full ring.
    tx_queue_full,
    /// TX submissions refused by the transport.
    tx_submit_failed,
    /// Stop-queue signals sent upstream.
    tx_stops,
    /// Wake-queue signals sent upstream.
    tx_wakes,
}

impl DmaStats {
    /// Account `n` segments found in one buffer.
    pub(crate) fn rx_segments_n(&self, n: u64) {
        self.rx_segments.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let stats = DmaStats::default();
        stats.rx_frames();
        stats.rx_frames();
        stats.rx_segments_n(5);
        stats.tx_stops();

        let snap = stats.snapshot();
        assert_eq!(snap.rx_frames, 2);
        assert_eq!(snap.rx_segments, 5);
        assert_eq!(snap.tx_stops, 1);
        assert_eq!(snap.tx_wakes, 0);
    }
}
