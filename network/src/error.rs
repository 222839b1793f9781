//! DMA engine error types

use core::fmt;

use crate::driver::urb::UrbStatus;

pub type Result<T> = core::result::Result<T, DmaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaError {
    /// Buffer or transfer handle allocation failed.
    OutOfMemory,
    /// TX ring has no free slot. Flow control should have stopped the queue.
    QueueFull,
    /// Hardware queue does not map to an output endpoint.
    InvalidQueue(u8),
    /// Configuration rejected by [`DmaConfig::validate`](crate::DmaConfig::validate).
    InvalidConfig,
    /// Engine is not running (before `init` or after `cleanup`).
    NotReady,
    /// Device is gone.
    NoDevice,
    /// Transport refused the transfer.
    Submit(UrbStatus),
}

impl DmaError {
    /// Errno-style code, for callers bridging into C-shaped stacks.
    pub fn errno(&self) -> i32 {
        match self {
            Self::OutOfMemory => -12,
            Self::QueueFull => -28,
            Self::InvalidQueue(_) | Self::InvalidConfig => -22,
            Self::NotReady => -11,
            Self::NoDevice => -19,
            Self::Submit(status) => status.errno(),
        }
    }
}

impl From<UrbStatus> for DmaError {
    fn from(status: UrbStatus) -> Self {
        match status {
            s if s.is_fatal() => DmaError::NoDevice,
            other => DmaError::Submit(other),
        }
    }
}

impl fmt::Display for DmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Out of memory"),
            Self::QueueFull => write!(f, "TX queue full"),
            Self::InvalidQueue(q) => write!(f, "No output endpoint for hw queue {}", q),
            Self::InvalidConfig => write!(f, "Invalid DMA configuration"),
            Self::NotReady => write!(f, "DMA engine not running"),
            Self::NoDevice => write!(f, "Device removed"),
            Self::Submit(status) => write!(f, "URB submit failed: {}", status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_device_maps_distinctly() {
        assert_eq!(DmaError::from(UrbStatus::NoDevice), DmaError::NoDevice);
        assert_eq!(DmaError::from(UrbStatus::Shutdown), DmaError::NoDevice);
        assert_eq!(
            DmaError::from(UrbStatus::Io(-71)),
            DmaError::Submit(UrbStatus::Io(-71))
        );
    }

    #[test]
    fn test_errno() {
        assert_eq!(DmaError::QueueFull.errno(), -28);
        assert_eq!(DmaError::NoDevice.errno(), -19);
        assert_eq!(DmaError::Submit(UrbStatus::Io(-71)).errno(), -71);
    }
}
