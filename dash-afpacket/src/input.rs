use afpacket::{AsyncBoundSocket, ETH_P_ARP};
use dash_runtime::capture::MAX_FRAME_LEN;
use futures::{
    self, ready,
    task::{Context, Poll},
};
use std::{ffi::CString, io, pin::Pin};
use tracing::info;

/// A capture source reading ARP frames from one network interface.
///
/// The socket is opened with `ETH_P_ARP`, so the kernel drops every other protocol before it
/// reaches us. Each item of the stream is one received frame; a read error is passed through
/// as-is and the stream never ends on its own. Dropping the source closes the socket.
pub struct AfPacketSource {
    iface: String,
    ingress: AsyncBoundSocket,
    in_buf: Vec<u8>,
}

impl AfPacketSource {
    /// Opens a raw socket on `iface`. Needs `CAP_NET_RAW` and a running tokio runtime.
    pub fn open(iface: &str) -> io::Result<Self> {
        let name = CString::new(iface)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let ingress = AsyncBoundSocket::from_interface_with_protocol(&name, ETH_P_ARP)?;
        info!(interface = iface, "listening for ARP frames");
        Ok(Self::with_socket(iface, ingress))
    }

    /// Wraps an already bound socket.
    pub fn with_socket(iface: impl Into<String>, ingress: AsyncBoundSocket) -> Self {
        Self {
            iface: iface.into(),
            ingress,
            in_buf: vec![0; MAX_FRAME_LEN],
        }
    }

    /// The interface this source reads from.
    pub fn interface(&self) -> &str {
        &self.iface
    }
}

impl Unpin for AfPacketSource {}

impl futures::Stream for AfPacketSource {
    type Item = io::Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let me = self.get_mut();
        match ready!(me.ingress.poll_recv(cx, &mut me.in_buf)) {
            Ok(sz) => Poll::Ready(Some(Ok(me.in_buf[..sz].to_vec()))),
            Err(e) => Poll::Ready(Some(Err(e))),
        }
    }
}
