//! Link-layer types needed to recognise ARP "who-has" broadcasts: hardware addresses and the
//! fixed-offset header view over a captured frame.

mod mac;
pub use self::mac::*;

mod arp;
pub use self::arp::*;

/// EtherType carried by ARP frames.
pub const ARP_ETHER_TYPE: u16 = 0x0806;
