use crate::device::{Press, Trigger, TriggerError};
use std::process::Stdio;
use tokio::{process::Command, runtime::Handle};
use tracing::{debug, warn};

pub const ENV_NAME: &str = "DASH_BUTTON_NAME";
pub const ENV_ADDRESS: &str = "DASH_BUTTON_ADDRESS";
pub const ENV_COUNT: &str = "DASH_BUTTON_COUNT";

/// Runs an external program for every press.
///
/// The program gets the press in its environment (`DASH_BUTTON_NAME`, `DASH_BUTTON_ADDRESS`,
/// `DASH_BUTTON_COUNT`) and is awaited on a separate task, so a slow program never holds up
/// the capture loop. Its exit status is only logged. A program still running when the runtime
/// shuts down is killed.
#[derive(Clone, Debug)]
pub struct Exec {
    program: String,
    args: Vec<String>,
}

impl Exec {
    pub fn new(program: impl Into<String>) -> Self {
        Exec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Trigger for Exec {
    fn fire(&mut self, press: &Press<'_>) -> Result<(), TriggerError> {
        let handle = Handle::try_current().map_err(|_| TriggerError::NoRuntime {
            program: self.program.clone(),
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(ENV_NAME, press.name)
            .env(ENV_ADDRESS, press.address.to_string())
            .env(ENV_COUNT, press.count.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TriggerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let program = self.program.clone();
        let device = press.name.to_string();
        handle.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(device = %device, "`{}` finished", program)
                }
                Ok(status) => warn!(device = %device, "`{}` exited with {}", program, status),
                Err(e) => warn!(device = %device, "failed to wait for `{}`: {}", program, e),
            }
        });
        Ok(())
    }
}
