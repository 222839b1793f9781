//! Wire records and frame types shared by the RX and TX paths.
//!
//! Everything here is plain data: no locks, no transport calls.

pub mod frame;
pub mod ieee80211;
pub mod rxwi;
pub mod txinfo;

// Re-exports
pub use frame::TxFrame;
pub use rxwi::{FceInfo, RxInfo, Rxwi, DMA_HDRS, DMA_HDR_LEN, FCE_INFO_LEN, MIN_SEG_LEN, RXWI_LEN, RX_INFO_LEN};
pub use txinfo::{DmaPort, InfoType, Qsel, TxInfo, TXINFO_LEN, TX_TRAILER_LEN};
