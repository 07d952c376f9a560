#![deny(missing_docs)]

use libc;
use std::{
    ffi::CStr,
    io,
    mem::{self, MaybeUninit},
    os::unix::io::{AsRawFd, RawFd},
};

/// Every protocol. Binding with this receives all link-layer traffic on the interface.
pub const ETH_P_ALL: u16 = 0x0003;
/// Address Resolution Protocol. The kernel only hands ARP frames to sockets opened with it.
pub const ETH_P_ARP: u16 = 0x0806;

/// Represents an unbound `AF_PACKET` socket.  At this phase of a socket's lifecycle, it can be
/// configured.
pub struct Socket {
    fd: libc::c_int,
    protocol: u16,
}

/// Represents a bound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be read
/// to/written from.
pub struct BoundSocket {
    fd: libc::c_int,
    send_addr: libc::sockaddr_ll,
}

impl Socket {
    /// Creates a new unbound socket that sees every protocol.
    pub fn new() -> io::Result<Self> {
        Self::with_protocol(ETH_P_ALL)
    }

    /// Creates a new unbound socket that only receives frames whose EtherType is `protocol`.
    /// The filtering happens in the kernel, so unrelated traffic never reaches user space.
    pub fn with_protocol(protocol: u16) -> io::Result<Self> {
        // This block must be marked as unsafe because it uses FFI with C code. We believe the code
        // in this block to be safe because it does not interact with any memory owned by Rust
        // code, nor does it violate the invariant of the Socket type -- namely, that it return an
        // Err if it fails to initialize.
        let fd = unsafe {
            // Resources:
            // man 7 packet
            let fd = libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                protocol.to_be() as libc::c_int,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        Ok(Self { fd, protocol })
    }

    /// The EtherType this socket was opened for.
    pub fn protocol(&self) -> u16 {
        self.protocol
    }

    /// Binds the socket to a network interface. This function consumes the `Socket` instance, as
    /// no more configuration options may be safely changed.
    pub fn bind(self, iface: impl AsRef<CStr>) -> io::Result<BoundSocket> {
        // This block is marked as unsafe because it uses FFI, however, we believe it to be safe
        // because it handles FFI failures in accordance with the bound API's conventions and
        // only borrows the &CStr passed in for the duration of the call.
        let send_addr = unsafe {
            // Resources:
            // man 3 if_nametoindex
            let ifindex = libc::if_nametoindex(iface.as_ref().as_ptr());
            if ifindex == 0 {
                return Err(io::Error::last_os_error());
            }

            // Resources:
            // man 7 packet regarding sockaddr_ll
            let mut ll: libc::sockaddr_ll = MaybeUninit::zeroed().assume_init();
            ll.sll_family = libc::AF_PACKET as libc::c_ushort;
            ll.sll_protocol = self.protocol.to_be();
            ll.sll_ifindex = ifindex as libc::c_int;
            let err = libc::bind(
                self.fd,
                &ll as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            ll
        };
        let fd = self.fd;
        // This ensures that `self` does not attempt to close the file descriptor, as the file
        // descriptor is transferred to the BoundSocket we're returning.
        mem::forget(self);
        Ok(BoundSocket { fd, send_addr })
    }

    /// Configures the socket's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        // This block is marked as unsafe because it uses FFI, however, we assume this code to be
        // safe because we handle fcntl's failures properly. Additionally, we do not borrow any
        // Rust-owned memory.
        // Resources used to write syscall code:
        // man 2 fcntl
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            let new_flags = if nonblocking {
                flags | libc::O_NONBLOCK
            } else {
                flags & (!libc::O_NONBLOCK)
            };
            let err = libc::fcntl(self.fd, libc::F_SETFL, new_flags);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Returns true if the socket is configured not to block, false otherwise.
    pub fn is_nonblocking(&self) -> io::Result<bool> {
        // See comments on block above (in set_nonblocking).
        let flags = unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            flags
        };
        Ok(flags & libc::O_NONBLOCK == libc::O_NONBLOCK)
    }
}

impl BoundSocket {
    /// Sends a frame to the NIC.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. We believe this code to be safe,
        // because it safely borrows the Rust-owned frame and passes the length of the frame to the
        // libc function, so it should not exhibit any C-side undefined behaviour.
        let bytes = unsafe {
            libc::sendto(
                self.fd,
                frame.as_ptr() as *const _,
                frame.len(),
                0,
                &self.send_addr as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }

    /// Receives a frame from the NIC. Frames longer than `frame` are truncated to fit.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        // Note comment in `send` call.
        let bytes =
            unsafe { libc::recv(self.fd, frame.as_mut_ptr() as *mut _, frame.len(), 0) };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }
}

impl AsRawFd for BoundSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
