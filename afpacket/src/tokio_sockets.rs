use crate::sockets;
use futures::{
    ready,
    task::{Context, Poll},
    Future,
};
use std::{ffi::CStr, io, pin::Pin};
use tokio::io::unix::AsyncFd;

/// Represents a bound `AF_PACKET` socket for use with Tokio. At this phase in a
/// socket's lifecycle, it can be read and written from.
///
/// Dropping it deregisters the descriptor from the reactor and closes the socket.
pub struct AsyncBoundSocket {
    sock: AsyncFd<sockets::BoundSocket>,
}

impl AsyncBoundSocket {
    /// Constructs an `AsyncBoundSocket` from a network interface name, receiving every protocol.
    pub fn from_interface(iface: impl AsRef<CStr>) -> io::Result<Self> {
        Self::from_interface_with_protocol(iface, sockets::ETH_P_ALL)
    }

    /// Constructs an `AsyncBoundSocket` bound to `iface` that only receives frames of the given
    /// EtherType.
    pub fn from_interface_with_protocol(iface: impl AsRef<CStr>, protocol: u16) -> io::Result<Self> {
        let mut sock = sockets::Socket::with_protocol(protocol)?;
        sock.set_nonblocking(true)?;
        let sock = sock.bind(iface)?;
        // on failure the socket comes back with the error and is closed on drop
        let sock = AsyncFd::try_new(sock).map_err(|e| e.into_parts().1)?;
        Ok(Self { sock })
    }

    /// Receives a frame from the socket asynchronously.
    /// Returns `Poll::Pending` if the socket cannot be read from.
    pub fn poll_recv(&mut self, cx: &mut Context<'_>, frame: &mut [u8]) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.sock.poll_read_ready_mut(cx))?;
            match guard.try_io(|inner| inner.get_mut().recv(frame)) {
                Ok(result) => return Poll::Ready(result),
                // readiness was stale; the guard cleared it, poll again
                Err(_would_block) => continue,
            }
        }
    }

    /// Sends a frame to the socket asynchronously.
    /// Returns `Poll::Pending` if the socket cannot be sent to.
    pub fn poll_send(&mut self, cx: &mut Context<'_>, frame: &[u8]) -> Poll<io::Result<usize>> {
        loop {
            let mut guard = ready!(self.sock.poll_write_ready_mut(cx))?;
            match guard.try_io(|inner| inner.get_mut().send(frame)) {
                Ok(result) => return Poll::Ready(result),
                Err(_would_block) => continue,
            }
        }
    }

    /// Tries to receive a frame. Will return `WouldBlock` if no frame is
    /// available.
    pub fn try_recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        self.sock.get_mut().recv(frame)
    }

    /// Returns a `Future` that calls [`poll_send`](Self::poll_send), enabling use of async/await.
    pub fn send<'a>(&'a mut self, frame: &'a [u8]) -> impl Future<Output = io::Result<usize>> + 'a {
        SendFuture { sock: self, frame }
    }

    /// Returns a `Future` that calls [`poll_recv`](Self::poll_recv), enabling use of async/await.
    pub fn recv<'a>(
        &'a mut self,
        frame: &'a mut [u8],
    ) -> impl Future<Output = io::Result<usize>> + 'a {
        RecvFuture { sock: self, frame }
    }
}

struct SendFuture<'a> {
    sock: &'a mut AsyncBoundSocket,
    frame: &'a [u8],
}

impl Unpin for SendFuture<'_> {}

impl Future for SendFuture<'_> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        me.sock.poll_send(cx, me.frame)
    }
}

struct RecvFuture<'a> {
    sock: &'a mut AsyncBoundSocket,
    frame: &'a mut [u8],
}

impl Unpin for RecvFuture<'_> {}

impl Future for RecvFuture<'_> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        me.sock.poll_recv(cx, me.frame)
    }
}
