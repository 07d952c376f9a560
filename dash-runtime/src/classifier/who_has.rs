use crate::classifier::Classifier;
use dash_packets::{ArpHeader, ArpOp, MacAddr, ARP_ETHER_TYPE};

/// The outcome of classifying one captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameClass {
    /// Shorter than the ARP header span; never looked at further.
    Malformed,
    /// Well formed, but not a broadcast ARP request.
    Ignored,
    /// A broadcast ARP "who-has" request sent by `source`.
    WhoHas { source: MacAddr },
}

impl FrameClass {
    pub fn is_who_has(&self) -> bool {
        matches!(self, FrameClass::WhoHas { .. })
    }
}

/// True iff the frame is addressed to ff:ff:ff:ff:ff:ff, carries the ARP EtherType and asks
/// "who-has" (opcode 1). Buttons broadcast exactly this when they join the network.
pub fn is_arp_who_has_broadcast(header: &ArpHeader<'_>) -> bool {
    header.destination.is_broadcast()
        && header.ether_type == ARP_ETHER_TYPE
        && header.opcode == ArpOp::Request as u16
}

/// Classifies raw frames as ARP who-has broadcasts.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhoHas {}

impl WhoHas {
    pub fn new() -> Self {
        WhoHas {}
    }
}

impl Classifier for WhoHas {
    type Packet = [u8];
    type Class = FrameClass;

    fn classify(&self, packet: &Self::Packet) -> Self::Class {
        match ArpHeader::parse(packet) {
            Err(_) => FrameClass::Malformed,
            Ok(header) if is_arp_who_has_broadcast(&header) => FrameClass::WhoHas {
                source: header.source,
            },
            Ok(_) => FrameClass::Ignored,
        }
    }
}
