use crate::capture::CaptureStats;
use std::io;
use thiserror::Error;

/// A failure that stops the capture loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture source returned an error that retrying will not fix. `stats` holds the
    /// loop's totals up to the failure.
    #[error("capture source failed: {source}")]
    Source {
        #[source]
        source: io::Error,
        stats: CaptureStats,
    },
}

impl CaptureError {
    pub fn stats(&self) -> CaptureStats {
        match self {
            CaptureError::Source { stats, .. } => *stats,
        }
    }
}
