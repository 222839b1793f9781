//! One log line per error kind.
//!
//! Sustained corruption on the RX path would otherwise flood the log with
//! identical lines from completion context.

use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    /// Error kinds that are logged at most once per engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Warn: u32 {
        const RX_URB_MISMATCH = 1 << 0;
        const TX_URB_MISMATCH = 1 << 1;
        const RXWI_ZERO       = 1 << 2;
        const NON_PKT         = 1 << 3;
        const SEG_LEN_ZERO    = 1 << 4;
        const SEG_MISALIGNED  = 1 << 5;
        const SEG_OVERRUN     = 1 << 6;
        const SEG_SHORT       = 1 << 7;
        const RX_RING_FULL    = 1 << 8;
    }
}

/// Latch set of [`Warn`] kinds already reported.
pub struct LogOnce {
    seen: AtomicU32,
}

impl LogOnce {
    pub const fn new() -> Self {
        Self {
            seen: AtomicU32::new(0),
        }
    }

    /// `true` the first time `kind` is reported, `false` afterwards.
    pub fn first(&self, kind: Warn) -> bool {
        let prev = self.seen.fetch_or(kind.bits(), Ordering::AcqRel);
        prev & kind.bits() == 0
    }

    pub fn seen(&self) -> Warn {
        Warn::from_bits_truncate(self.seen.load(Ordering::Acquire))
    }
}

impl Default for LogOnce {
    fn default() -> Self {
        Self::new()
    }
}

/// `log::warn!` at most once per [`Warn`] kind.
#[macro_export]
macro_rules! warn_once {
    ($once:expr, $kind:expr, $($arg:tt)+) => {
        if $once.first($kind) {
            $crate::__log::warn!($($arg)+);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_per_kind() {
        let once = LogOnce::new();
        assert!(once.first(Warn::NON_PKT));
        assert!(!once.first(Warn::NON_PKT));
        assert!(once.first(Warn::RXWI_ZERO));
        assert_eq!(once.seen(), Warn::NON_PKT | Warn::RXWI_ZERO);
    }
}
