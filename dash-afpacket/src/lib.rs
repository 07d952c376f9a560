//! This crate feeds frames from the `afpacket` crate into the dash-runtime capture loop.
#![cfg(target_os = "linux")]
#![deny(missing_docs)]

mod input;

pub use input::AfPacketSource;
