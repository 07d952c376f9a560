use crate::MacAddr;
use thiserror::Error;

/// ARP operation codes (RFC 826 `ar$op`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

/// Number of bytes `ArpHeader::parse` needs: the 14 byte Ethernet II header followed by a
/// 46 byte minimum payload, i.e. the shortest legal Ethernet frame without its FCS.
pub const ARP_HEADER_LEN: usize = 60;

// 0           6           12      14            20       22                        60
// |-dest MAC--|-src MAC---|-type--|-htype/ptype-|-oper---|--addresses + padding----|
//                                   hlen/plen
const DEST_RANGE: (usize, usize) = (0, 6);
const SRC_RANGE: (usize, usize) = (6, 12);
const ETHER_TYPE_RANGE: (usize, usize) = (12, 14);
const OPCODE_RANGE: (usize, usize) = (20, 22);
const PAYLOAD_OFFSET: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is {len} bytes, shorter than the {ARP_HEADER_LEN} byte ARP header span")]
    Malformed { len: usize },
}

///
/// The fields of a captured frame needed to recognise an ARP request, read at fixed offsets.
/// Nothing past the operation code is interpreted; `payload` exposes the raw bytes after the
/// Ethernet header for callers that want more.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpHeader<'a> {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ether_type: u16,
    pub opcode: u16,
    pub payload: &'a [u8],
}

impl<'a> ArpHeader<'a> {
    /// Reads the header out of `frame`. Frames shorter than `ARP_HEADER_LEN` are rejected whole;
    /// no field is ever read from a truncated frame.
    pub fn parse(frame: &'a [u8]) -> Result<Self, FrameError> {
        if frame.len() < ARP_HEADER_LEN {
            return Err(FrameError::Malformed { len: frame.len() });
        }

        Ok(ArpHeader {
            destination: mac_at(frame, DEST_RANGE),
            source: mac_at(frame, SRC_RANGE),
            ether_type: u16_at(frame, ETHER_TYPE_RANGE),
            opcode: u16_at(frame, OPCODE_RANGE),
            payload: &frame[PAYLOAD_OFFSET..],
        })
    }

    pub fn is_request(&self) -> bool {
        self.opcode == ArpOp::Request as u16
    }
}

impl<'a> TryFrom<&'a [u8]> for ArpHeader<'a> {
    type Error = FrameError;

    fn try_from(frame: &'a [u8]) -> Result<Self, Self::Error> {
        ArpHeader::parse(frame)
    }
}

// Callers have already checked the frame length, so the ranges are in bounds.
fn mac_at(frame: &[u8], (start, end): (usize, usize)) -> MacAddr {
    let mut bytes = [0u8; 6];
    bytes.copy_from_slice(&frame[start..end]);
    MacAddr::new(bytes)
}

fn u16_at(frame: &[u8], (start, end): (usize, usize)) -> u16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&frame[start..end]);
    u16::from_be_bytes(bytes)
}
