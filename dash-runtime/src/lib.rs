/// Classifiers look at a captured frame by reference and decide what kind of frame it is. The
/// capture loop only acts on frames classified as ARP "who-has" broadcasts; everything else is
/// counted and dropped.
pub mod classifier;

/// Devices are the buttons being listened for. Each one owns its trigger counter and a
/// `Trigger` that performs the side effect of a press, so the counting contract is enforced in
/// one place no matter what the press does.
pub mod device;

/// The registry is the ordered set of devices the loop dispatches to, looked up by the source
/// hardware address of a who-has frame.
pub mod registry;

/// The capture loop ties a frame source, the classifier and the registry together and runs
/// until it is cancelled or the source fails.
pub mod capture;

/// Frame builders and in-memory sources for tests. Not part of the public API.
#[doc(hidden)]
pub mod utils;

pub use dash_packets::{MacAddr, ARP_ETHER_TYPE};
