use dash_packets::MacAddr;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

mod trigger;
pub use self::trigger::*;

mod announce;
pub use self::announce::*;

mod exec;
pub use self::exec::*;

/// Who a device is: the name shown to people and the hardware address it is recognised by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub address: MacAddr,
}

/// One physical button.
///
/// `action` is the only way the trigger counter moves: it adds exactly one and then hands the
/// press to the device's `Trigger`. Whatever the trigger does, including failing or panicking,
/// stays inside `action`.
pub struct Device {
    identity: Identity,
    triggered: u64,
    trigger: Box<dyn Trigger>,
}

impl Device {
    pub fn new(name: impl Into<String>, address: MacAddr, trigger: impl Trigger + 'static) -> Self {
        Device {
            identity: Identity {
                name: name.into(),
                address,
            },
            triggered: 0,
            trigger: Box::new(trigger),
        }
    }

    /// A device that only counts its presses.
    pub fn silent(name: impl Into<String>, address: MacAddr) -> Self {
        Device::new(name, address, Silent)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn address(&self) -> MacAddr {
        self.identity.address
    }

    pub fn trigger_count(&self) -> u64 {
        self.triggered
    }

    pub fn action(&mut self) {
        self.triggered += 1;

        let press = Press {
            name: &self.identity.name,
            address: self.identity.address,
            count: self.triggered,
        };
        info!(device = press.name, address = %press.address, count = press.count, "button pressed");

        let trigger = &mut self.trigger;
        match panic::catch_unwind(AssertUnwindSafe(|| trigger.fire(&press))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(device = press.name, "trigger failed: {}", e),
            Err(_) => error!(device = press.name, "trigger panicked"),
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("identity", &self.identity)
            .field("triggered", &self.triggered)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const BUTTON: MacAddr = MacAddr::new([0xac, 0x63, 0xbe, 0xb2, 0xa2, 0x05]);

    #[test]
    fn new_device_has_not_triggered() {
        let device = Device::silent("Gillette button #2", BUTTON);
        assert_eq!(device.trigger_count(), 0);
        assert_eq!(device.name(), "Gillette button #2");
        assert_eq!(device.address(), BUTTON);
        assert_eq!(device.identity().address.to_string(), "ac63beb2a205");
    }

    #[test]
    fn action_counts_once_per_call() {
        let mut device = Device::silent("button", BUTTON);
        for expected in 1..=5 {
            device.action();
            assert_eq!(device.trigger_count(), expected);
        }
    }

    #[test]
    fn trigger_sees_the_incremented_count() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut device = Device::new("button", BUTTON, move |press: &Press<'_>| -> Result<(), TriggerError> {
            log.lock().unwrap().push((press.name.to_string(), press.address, press.count));
            Ok(())
        });

        device.action();
        device.action();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("button".to_string(), BUTTON, 1),
                ("button".to_string(), BUTTON, 2)
            ]
        );
    }

    #[test]
    fn failing_trigger_still_counts() {
        let mut device = Device::new("button", BUTTON, |_: &Press<'_>| -> Result<(), TriggerError> {
            Err(TriggerError::Other("webhook unreachable".into()))
        });
        device.action();
        device.action();
        assert_eq!(device.trigger_count(), 2);
    }

    #[test]
    fn panicking_trigger_is_contained() {
        let mut device = Device::new("button", BUTTON, |_: &Press<'_>| -> Result<(), TriggerError> {
            panic!("side effect blew up")
        });
        device.action();
        assert_eq!(device.trigger_count(), 1);
    }
}
