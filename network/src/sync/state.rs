//! Device lifecycle as seen by the DMA paths.
//!
//! ```text
//!   Created ──init()──> Running ──ENODEV──> Removed
//!      │                   │                   │
//!      └─────────────── cleanup() ─────────────┴──> Dead
//! ```
//!
//! The device-removed latch is set on the way into `Removed` and stays set
//! through `cleanup()`. It only silences error logging; RX decoding and TX
//! submission keep running until `Dead`.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created = 0,
    Running = 1,
    Removed = 2,
    Dead = 3,
}

impl Lifecycle {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Lifecycle::Created,
            1 => Lifecycle::Running,
            2 => Lifecycle::Removed,
            _ => Lifecycle::Dead,
        }
    }
}

/// Lifecycle state plus the TX statistics flags.
pub struct DeviceState {
    lifecycle: AtomicU8,
    /// Device-removed latch. Never cleared.
    removed: AtomicBool,
    /// TX completions arrived since the last statistics read.
    more_stats: AtomicBool,
    /// A statistics refresh is scheduled or running.
    reading_stats: AtomicBool,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            lifecycle: AtomicU8::new(Lifecycle::Created as u8),
            removed: AtomicBool::new(false),
            more_stats: AtomicBool::new(false),
            reading_stats: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    /// Created → Running. Returns `false` from any other state.
    pub fn start(&self) -> bool {
        self.transition(Lifecycle::Created, Lifecycle::Running)
    }

    /// Set the device-removed latch, moving Running → Removed. Returns `true`
    /// only for the first caller. A device never started cannot be removed.
    pub fn mark_removed(&self) -> bool {
        if self.get() == Lifecycle::Created {
            return false;
        }
        let _ = self.transition(Lifecycle::Running, Lifecycle::Removed);
        !self.removed.swap(true, Ordering::AcqRel)
    }

    /// Any state → Dead.
    pub fn kill(&self) {
        self.lifecycle.store(Lifecycle::Dead as u8, Ordering::Release);
    }

    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// RX buffers completed in this state are decoded.
    pub fn accepts_rx(&self) -> bool {
        matches!(self.get(), Lifecycle::Running | Lifecycle::Removed)
    }

    /// TX submissions are attempted in this state.
    pub fn accepts_tx(&self) -> bool {
        matches!(self.get(), Lifecycle::Running | Lifecycle::Removed)
    }

    fn transition(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.lifecycle
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STATISTICS FLAGS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_more_stats(&self) {
        self.more_stats.store(true, Ordering::Release);
    }

    /// Clear "more stats", returning whether it was set.
    pub fn take_more_stats(&self) -> bool {
        self.more_stats.swap(false, Ordering::AcqRel)
    }

    /// Set "reading stats", returning whether it was already set.
    pub fn test_and_set_reading_stats(&self) -> bool {
        self.reading_stats.swap(true, Ordering::AcqRel)
    }

    pub fn clear_reading_stats(&self) {
        self.reading_stats.store(false, Ordering::Release);
    }

    pub fn is_reading_stats(&self) -> bool {
        self.reading_stats.load(Ordering::Acquire)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
