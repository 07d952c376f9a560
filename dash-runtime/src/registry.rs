use crate::device::Device;
use dash_packets::MacAddr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("devices {first:?} and {second:?} share hardware address {address}")]
    DuplicateAddress {
        address: MacAddr,
        first: String,
        second: String,
    },
}

/// The devices the capture loop dispatches to, in registration order.
///
/// Two devices with the same address is a configuration mistake. `register` does not stop it
/// (both devices then fire on every press); `try_from_devices` refuses it.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        DeviceRegistry {
            devices: Vec::new(),
        }
    }

    /// Builds a registry, rejecting any address that appears more than once.
    pub fn try_from_devices<I>(devices: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Device>,
    {
        let mut registry = DeviceRegistry::new();
        for device in devices {
            if let Some(existing) = registry.find_by_address(&device.address()).next() {
                return Err(RegistryError::DuplicateAddress {
                    address: device.address(),
                    first: existing.name().to_string(),
                    second: device.name().to_string(),
                });
            }
            registry.register(device);
        }
        Ok(registry)
    }

    /// Appends a device. Duplicate addresses are not checked.
    pub fn register(&mut self, device: Device) {
        self.devices.push(device);
    }

    /// Every device registered under `address`, in registration order.
    pub fn find_by_address(&self, address: &MacAddr) -> impl Iterator<Item = &Device> + '_ {
        let address = *address;
        self.devices
            .iter()
            .filter(move |device| device.address() == address)
    }

    /// Runs `action` on every device registered under `address`, in registration order, and
    /// returns how many devices fired.
    pub fn dispatch(&mut self, address: &MacAddr) -> usize {
        let mut fired = 0;
        for device in self
            .devices
            .iter_mut()
            .filter(|device| device.address() == *address)
        {
            device.action();
            fired += 1;
        }
        fired
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<Device> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        DeviceRegistry {
            devices: iter.into_iter().collect(),
        }
    }
}
