use crate::classifier::{Classifier, FrameClass, WhoHas};
use crate::registry::DeviceRegistry;
use futures::{Stream, StreamExt};
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

mod error;
pub use self::error::*;

/// Largest frame a capture source is expected to hand over.
pub const MAX_FRAME_LEN: usize = 65536;

/// Anything that yields raw link-layer frames. Each item is one frame or the error the
/// underlying read produced. The stream ending means the source has nothing more to give.
pub trait CaptureSource: Stream<Item = io::Result<Vec<u8>>> + Unpin + Send {}

impl<S> CaptureSource for S where S: Stream<Item = io::Result<Vec<u8>>> + Unpin + Send {}

/// Why a capture loop stopped without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired.
    Cancelled,
    /// The source stream ended.
    SourceExhausted,
}

/// Running totals kept by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames received, whatever their class.
    pub frames: u64,
    pub malformed: u64,
    pub ignored: u64,
    pub who_has: u64,
    /// Device actions run. A who-has from an unregistered address adds nothing here.
    pub dispatched: u64,
    /// Reads that failed in a way worth retrying.
    pub read_errors: u64,
    pub timeouts: u64,
}

/// What is left when a loop stops cleanly: the devices with their final counts, and the totals.
#[derive(Debug)]
pub struct CaptureReport {
    pub registry: DeviceRegistry,
    pub stats: CaptureStats,
    pub reason: StopReason,
}

enum Next {
    Frame(Vec<u8>),
    Failed(io::Error),
    TimedOut,
    Closed,
}

/// Reads frames from a source one at a time, in arrival order, and runs the matching device
/// actions for every ARP who-has broadcast before reading the next frame.
///
/// The loop owns its source. `run` consumes the loop, so the source (and the socket behind
/// it) is dropped on every way out: cancellation, a fatal read error, or the stream ending.
pub struct CaptureLoop<S> {
    source: S,
    registry: DeviceRegistry,
    classifier: WhoHas,
    cancel: CancellationToken,
    read_timeout: Option<Duration>,
    stats: CaptureStats,
}

impl<S: CaptureSource> CaptureLoop<S> {
    pub fn new(source: S, registry: DeviceRegistry) -> Self {
        CaptureLoop {
            source,
            registry,
            classifier: WhoHas::new(),
            cancel: CancellationToken::new(),
            read_timeout: None,
            stats: CaptureStats::default(),
        }
    }

    /// Stops the loop when `cancel` fires instead of the loop's own token.
    pub fn cancellation(self, cancel: CancellationToken) -> Self {
        CaptureLoop { cancel, ..self }
    }

    /// Gives up on a read after `timeout` and tries again. A timeout never stops the loop.
    pub fn read_timeout(self, timeout: Duration) -> Self {
        CaptureLoop {
            read_timeout: Some(timeout),
            ..self
        }
    }

    /// A handle that stops the loop when cancelled, even while it waits for a frame.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Classifies one frame and, for a who-has broadcast, fires every device registered under
    /// its source address.
    pub fn handle_frame(&mut self, frame: &[u8]) -> FrameClass {
        self.stats.frames += 1;
        let class = self.classifier.classify(frame);
        match class {
            FrameClass::Malformed => {
                self.stats.malformed += 1;
                trace!(len = frame.len(), "dropping malformed frame");
            }
            FrameClass::Ignored => {
                self.stats.ignored += 1;
            }
            FrameClass::WhoHas { source } => {
                self.stats.who_has += 1;
                let fired = self.registry.dispatch(&source);
                self.stats.dispatched += fired as u64;
                if fired == 0 {
                    debug!(source = %source, "who-has from unregistered address");
                } else {
                    debug!(source = %source, devices = fired, "who-has dispatched");
                }
            }
        }
        class
    }

    /// Runs until cancelled, until the source ends, or until the source fails in a way that
    /// cannot be retried. Only the last of these is an error.
    pub async fn run(mut self) -> Result<CaptureReport, CaptureError> {
        info!(devices = self.registry.len(), "capture loop running");

        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break StopReason::Cancelled,
                next = next_frame(&mut self.source, self.read_timeout) => next,
            };

            match next {
                Next::Frame(frame) => {
                    self.handle_frame(&frame);
                }
                Next::TimedOut => {
                    self.stats.timeouts += 1;
                    trace!("no frame before read timeout");
                }
                Next::Closed => break StopReason::SourceExhausted,
                Next::Failed(e) if is_transient(&e) => {
                    self.stats.read_errors += 1;
                    warn!("retrying after capture read error: {}", e);
                }
                Next::Failed(e) => {
                    error!("capture source failed: {}", e);
                    return Err(CaptureError::Source {
                        source: e,
                        stats: self.stats,
                    });
                }
            }
        };

        info!(
            ?reason,
            frames = self.stats.frames,
            who_has = self.stats.who_has,
            dispatched = self.stats.dispatched,
            "capture loop stopped"
        );
        Ok(CaptureReport {
            registry: self.registry,
            stats: self.stats,
            reason,
        })
    }
}

async fn next_frame<S: CaptureSource>(source: &mut S, timeout: Option<Duration>) -> Next {
    let item = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, source.next()).await {
            Ok(item) => item,
            Err(_) => return Next::TimedOut,
        },
        None => source.next().await,
    };
    match item {
        Some(Ok(frame)) => Next::Frame(frame),
        Some(Err(e)) => Next::Failed(e),
        None => Next::Closed,
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;
    use crate::utils::test::frames::{arp_frame, who_has_frame};
    use crate::utils::test::sources::immediate_source;
    use dash_packets::{ArpOp, MacAddr, ARP_ETHER_TYPE};

    const BUTTON: MacAddr = MacAddr::new([0xac, 0x63, 0xbe, 0xb2, 0xa2, 0x05]);

    fn one_button() -> DeviceRegistry {
        DeviceRegistry::try_from_devices(vec![Device::silent(
            "button",
            "AC:63:BE:B2:A2:05".parse().unwrap(),
        )])
        .unwrap()
    }

    #[test]
    fn handle_frame_counts_each_class() {
        let mut capture = CaptureLoop::new(immediate_source(vec![]), one_button());

        assert_eq!(capture.handle_frame(&[0u8; 12]), FrameClass::Malformed);
        assert_eq!(
            capture.handle_frame(&arp_frame(MacAddr::BROADCAST, BUTTON, ARP_ETHER_TYPE, ArpOp::Reply as u16)),
            FrameClass::Ignored
        );
        assert_eq!(
            capture.handle_frame(&who_has_frame(BUTTON)),
            FrameClass::WhoHas { source: BUTTON }
        );
        assert_eq!(
            capture.handle_frame(&who_has_frame(MacAddr::new([1, 2, 3, 4, 5, 6]))),
            FrameClass::WhoHas {
                source: MacAddr::new([1, 2, 3, 4, 5, 6])
            }
        );

        assert_eq!(
            capture.stats(),
            CaptureStats {
                frames: 4,
                malformed: 1,
                ignored: 1,
                who_has: 2,
                dispatched: 1,
                ..CaptureStats::default()
            }
        );
        assert_eq!(capture.registry().iter().next().unwrap().trigger_count(), 1);
    }

    #[test]
    fn transient_error_kinds() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!is_transient(&io::Error::new(io::ErrorKind::Other, "network is down")));
    }
}
