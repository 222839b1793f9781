//! USB request blocks as seen by the DMA engine.
//!
//! An [`Urb`] pairs a transport-allocated handle id with the buffer it
//! moves. Submitting an URB moves it, buffer included, into the transport;
//! the transport hands it back through the completion entry points. While
//! the transport holds it nothing else can reach the buffer, so a buffer can
//! never be released under an in-flight transfer.

use core::fmt;

/// Transport-assigned identity of a transfer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrbId(pub u32);

/// Completion or submission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrbStatus {
    Ok,
    /// Device unplugged (ENODEV).
    NoDevice,
    /// Host controller or endpoint shut down (ESHUTDOWN).
    Shutdown,
    /// Killed or poisoned while in flight (ENOENT).
    Killed,
    /// Unlinked asynchronously (ECONNRESET).
    Unlinked,
    /// Handle is poisoned, submission refused (EPERM).
    Poisoned,
    /// Any other transport error, as a negative errno.
    Io(i32),
}

impl UrbStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, UrbStatus::Ok)
    }

    /// Status worth logging. Cancellation statuses are expected during
    /// teardown and are not errors.
    pub fn has_error(&self) -> bool {
        !matches!(
            self,
            UrbStatus::Ok | UrbStatus::Killed | UrbStatus::Unlinked | UrbStatus::Shutdown
        )
    }

    /// The device is gone for good.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UrbStatus::NoDevice | UrbStatus::Shutdown)
    }

    pub fn errno(&self) -> i32 {
        match self {
            UrbStatus::Ok => 0,
            UrbStatus::NoDevice => -19,
            UrbStatus::Shutdown => -108,
            UrbStatus::Killed => -2,
            UrbStatus::Unlinked => -104,
            UrbStatus::Poisoned => -1,
            UrbStatus::Io(e) => *e,
        }
    }
}

impl fmt::Display for UrbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrbStatus::Ok => write!(f, "ok"),
            UrbStatus::Io(e) => write!(f, "{}", e),
            other => write!(f, "{} ({:?})", other.errno(), other),
        }
    }
}

/// A transfer handle bound to its buffer.
#[derive(Debug)]
pub struct Urb<B> {
    id: UrbId,
    buf: B,
    status: UrbStatus,
    actual_length: usize,
}

impl<B> Urb<B> {
    pub fn new(id: UrbId, buf: B) -> Self {
        Self {
            id,
            buf,
            status: UrbStatus::Ok,
            actual_length: 0,
        }
    }

    pub fn id(&self) -> UrbId {
        self.id
    }

    pub fn status(&self) -> UrbStatus {
        self.status
    }

    /// Bytes the device transferred.
    pub fn actual_length(&self) -> usize {
        self.actual_length
    }

    pub fn buffer(&self) -> &B {
        &self.buf
    }

    /// Transport-side access, for filling an IN transfer.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buf
    }

    /// Record the outcome. Called by the transport before it hands the
    /// URB back.
    pub fn complete(&mut self, status: UrbStatus, actual_length: usize) {
        self.status = status;
        self.actual_length = actual_length;
    }

    pub fn into_parts(self) -> (UrbId, B, UrbStatus, usize) {
        (self.id, self.buf, self.status, self.actual_length)
    }
}

/// Refused submission. The URB comes back so its buffer is not lost.
#[derive(Debug)]
pub struct SubmitError<B> {
    pub urb: Urb<B>,
    pub status: UrbStatus,
}

impl<B> SubmitError<B> {
    pub fn new(urb: Urb<B>, status: UrbStatus) -> Self {
        Self { urb, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_statuses() {
        assert!(!UrbStatus::Ok.has_error());
        assert!(!UrbStatus::Killed.has_error());
        assert!(!UrbStatus::Unlinked.has_error());
        assert!(!UrbStatus::Shutdown.has_error());
        assert!(UrbStatus::NoDevice.has_error());
        assert!(UrbStatus::Io(-71).has_error());
    }

    #[test]
    fn test_fatal_statuses() {
        assert!(UrbStatus::NoDevice.is_fatal());
        assert!(UrbStatus::Shutdown.is_fatal());
        assert!(!UrbStatus::Io(-71).is_fatal());
    }

    #[test]
    fn test_complete_records_outcome() {
        let mut urb = Urb::new(UrbId(3), [0u8; 4]);
        urb.buffer_mut()[0] = 1;
        urb.complete(UrbStatus::Io(-32), 2);
        let (id, buf, status, len) = urb.into_parts();
        assert_eq!(id, UrbId(3));
        assert_eq!(buf[0], 1);
        assert_eq!(status.errno(), -32);
        assert_eq!(len, 2);
    }
}
