use dash_packets::MacAddr;
use std::io;
use thiserror::Error;

/// What a trigger is told about a press. `count` already includes this press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Press<'a> {
    pub name: &'a str,
    pub address: MacAddr,
    pub count: u64,
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to write notification: {0}")]
    Io(#[from] io::Error),

    #[error("no tokio runtime to run `{program}` on")]
    NoRuntime { program: String },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// The side effect of a button press.
///
/// Implementations must not block for long: they run inline on the capture loop, between two
/// frame reads.
pub trait Trigger: Send {
    fn fire(&mut self, press: &Press<'_>) -> Result<(), TriggerError>;
}

impl<F> Trigger for F
where
    F: FnMut(&Press<'_>) -> Result<(), TriggerError> + Send,
{
    fn fire(&mut self, press: &Press<'_>) -> Result<(), TriggerError> {
        self(press)
    }
}

/// Does nothing; the device's counter is the only effect of a press.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Trigger for Silent {
    fn fire(&mut self, _press: &Press<'_>) -> Result<(), TriggerError> {
        Ok(())
    }
}
