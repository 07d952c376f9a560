//! Thin, safe wrappers over Linux `AF_PACKET` raw sockets.
#![cfg(target_os = "linux")]
mod sockets;

#[cfg(feature = "tokio-support")]
mod tokio_sockets;

pub use sockets::{BoundSocket, Socket, ETH_P_ALL, ETH_P_ARP};
#[cfg(feature = "tokio-support")]
pub use tokio_sockets::AsyncBoundSocket;
