//! Helpers for exercising the capture loop without a socket: frame builders, in-memory
//! capture sources, and a writer whose output can be inspected.

pub mod sources;

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A `Write` that appends to a buffer shared between clones, so a test can keep one clone and
/// hand the other to a trigger.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer::default()
    }

    /// Drains everything written so far.
    pub fn take_string(&self) -> String {
        let bytes = std::mem::take(&mut *self.inner.lock().unwrap_or_else(|e| e.into_inner()));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
