//! 802.11 MAC header length from the frame control field.
//!
//! # Reference
//! IEEE 802.11-2020 §9.2.4.1

/// Frame control bits used for header sizing.
pub mod fc {
    pub const FTYPE: u16 = 0x000c;
    pub const STYPE: u16 = 0x00f0;
    pub const TODS: u16 = 0x0100;
    pub const FROMDS: u16 = 0x0200;
    pub const ORDER: u16 = 0x8000;

    pub const FTYPE_MGMT: u16 = 0x0000;
    pub const FTYPE_CTL: u16 = 0x0004;
    pub const FTYPE_DATA: u16 = 0x0008;
    pub const FTYPE_EXT: u16 = 0x000c;

    /// QoS bit of the data subtype.
    pub const STYPE_QOS_DATA: u16 = 0x0080;
    pub const STYPE_CTS: u16 = 0x00c0;
    pub const STYPE_ACK: u16 = 0x00d0;
}

/// Shortest frame for which the frame control field is trusted (ACK/CTS).
pub const MIN_HDR_LEN: usize = 10;

const QOS_CTL_LEN: usize = 2;
const HT_CTL_LEN: usize = 4;

/// MAC header length implied by `frame_control`.
pub fn hdrlen(frame_control: u16) -> usize {
    let ftype = frame_control & fc::FTYPE;

    match ftype {
        fc::FTYPE_EXT => 4,
        fc::FTYPE_DATA => {
            let mut len = if frame_control & (fc::TODS | fc::FROMDS) == fc::TODS | fc::FROMDS {
                30
            } else {
                24
            };
            if frame_control & fc::STYPE_QOS_DATA != 0 {
                len += QOS_CTL_LEN;
                if frame_control & fc::ORDER != 0 {
                    len += HT_CTL_LEN;
                }
            }
            len
        }
        fc::FTYPE_MGMT => {
            if frame_control & fc::ORDER != 0 {
                24 + HT_CTL_LEN
            } else {
                24
            }
        }
        // ACK and CTS differ from the rest only in the bits under 0xe0.
        _ => {
            if frame_control & 0x00e0 == fc::STYPE_CTS {
                10
            } else {
                16
            }
        }
    }
}

/// Header length of the frame at the front of `data`.
///
/// Returns 0 when `data` is too short to hold a frame control field worth
/// trusting, or shorter than the header it announces.
pub fn hdrlen_from_buf(data: &[u8]) -> usize {
    if data.len() < MIN_HDR_LEN {
        return 0;
    }
    let len = hdrlen(u16::from_le_bytes([data[0], data[1]]));
    if len > data.len() {
        return 0;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_headers() {
        assert_eq!(hdrlen(fc::FTYPE_DATA), 24);
        assert_eq!(hdrlen(fc::FTYPE_DATA | fc::STYPE_QOS_DATA), 26);
        assert_eq!(hdrlen(fc::FTYPE_DATA | fc::TODS | fc::FROMDS), 30);
        assert_eq!(hdrlen(fc::FTYPE_DATA | fc::TODS | fc::FROMDS | fc::STYPE_QOS_DATA), 32);
        assert_eq!(hdrlen(fc::FTYPE_DATA | fc::STYPE_QOS_DATA | fc::ORDER), 30);
        // Order without QoS does not add an HT control field to data frames.
        assert_eq!(hdrlen(fc::FTYPE_DATA | fc::ORDER), 24);
    }

    #[test]
    fn test_mgmt_and_ctl_headers() {
        assert_eq!(hdrlen(fc::FTYPE_MGMT | 0x0080), 24);
        assert_eq!(hdrlen(fc::FTYPE_MGMT | fc::ORDER), 28);
        assert_eq!(hdrlen(fc::FTYPE_CTL | fc::STYPE_ACK), 10);
        assert_eq!(hdrlen(fc::FTYPE_CTL | fc::STYPE_CTS), 10);
        assert_eq!(hdrlen(fc::FTYPE_CTL | 0x00b0), 16); // RTS
        assert_eq!(hdrlen(fc::FTYPE_EXT), 4);
    }

    #[test]
    fn test_hdrlen_from_buf_fails_closed() {
        assert_eq!(hdrlen_from_buf(&[0x08, 0x00]), 0);
        // Data header announces 24 bytes but only 16 are present.
        assert_eq!(hdrlen_from_buf(&[0x08u8; 16]), 0);
        let mut ack = [0u8; 10];
        ack[0] = 0xd4;
        assert_eq!(hdrlen_from_buf(&ack), 10);
    }
}
