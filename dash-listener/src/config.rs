//! Device configuration: a YAML file plus `--device` arguments, turned into the registry the
//! capture loop runs with.
//!
//! ```yaml
//! interface: wlan0
//! read_timeout_ms: 5000
//! devices:
//!   - name: "Gillette button #2"
//!     address: "AC:63:BE:B2:A2:05"
//!     action: announce
//!     message: "Razors needed!"
//!   - name: Coffee
//!     address: ac-63-be-00-11-22
//!     action: exec
//!     program: /usr/local/bin/brew
//!     args: ["--strong"]
//! ```

use dash_packets::{AddrParseError, MacAddr};
use dash_runtime::{
    device::{Announce, Device, Exec, Silent},
    registry::{DeviceRegistry, RegistryError},
};
use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("device {name:?} has invalid address {address:?}: {source}")]
    Address {
        name: String,
        address: String,
        source: AddrParseError,
    },

    #[error("invalid device {0:?}, expected NAME=ADDRESS")]
    DeviceArg(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("no devices configured")]
    NoDevices,

    #[error("no interface given; pass --interface or set `interface` in the config file")]
    NoInterface,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Settings passed on the command line. Each one that is set wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub interface: Option<String>,
    pub read_timeout_ms: Option<u64>,
    /// `NAME=ADDRESS` devices, registered after the ones from the file.
    pub devices: Vec<String>,
}

/// Everything the listener needs to start capturing.
#[derive(Debug)]
pub struct Settings {
    pub interface: String,
    pub read_timeout: Option<Duration>,
    pub registry: DeviceRegistry,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub action: ActionConfig,
}

/// What a device does when pressed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Count presses and nothing else.
    Silent,
    /// Print a notice with the running press count.
    Announce {
        #[serde(default)]
        message: String,
    },
    /// Run a program with the press in its environment.
    Exec {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Builds every configured device, in file order, and checks that no two share an
    /// address.
    pub fn build_registry(&self) -> Result<DeviceRegistry, ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        let devices = self
            .devices
            .iter()
            .map(DeviceConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DeviceRegistry::try_from_devices(devices)?)
    }

    /// Applies command line settings on top of this config and builds the registry.
    pub fn merge(mut self, overrides: Overrides) -> Result<Settings, ConfigError> {
        for arg in &overrides.devices {
            self.devices.push(DeviceConfig::parse_arg(arg)?);
        }
        let interface = overrides
            .interface
            .or(self.interface.take())
            .ok_or(ConfigError::NoInterface)?;
        let read_timeout = overrides
            .read_timeout_ms
            .or(self.read_timeout_ms)
            .map(Duration::from_millis);
        let registry = self.build_registry()?;
        Ok(Settings {
            interface,
            read_timeout,
            registry,
        })
    }
}

impl DeviceConfig {
    /// Parses a `NAME=ADDRESS` command line device. Such devices announce their presses.
    pub fn parse_arg(arg: &str) -> Result<DeviceConfig, ConfigError> {
        match arg.rsplit_once('=') {
            Some((name, address)) if !name.trim().is_empty() && !address.trim().is_empty() => {
                Ok(DeviceConfig {
                    name: name.trim().to_string(),
                    address: address.trim().to_string(),
                    action: ActionConfig::Announce {
                        message: String::new(),
                    },
                })
            }
            _ => Err(ConfigError::DeviceArg(arg.to_string())),
        }
    }

    pub fn mac_addr(&self) -> Result<MacAddr, ConfigError> {
        self.address
            .parse()
            .map_err(|source| ConfigError::Address {
                name: self.name.clone(),
                address: self.address.clone(),
                source,
            })
    }

    pub fn build(&self) -> Result<Device, ConfigError> {
        let address = self.mac_addr()?;
        let device = match &self.action {
            ActionConfig::Silent => Device::new(self.name.clone(), address, Silent),
            ActionConfig::Announce { message } => {
                Device::new(self.name.clone(), address, Announce::stdout(message.clone()))
            }
            ActionConfig::Exec { program, args } => Device::new(
                self.name.clone(),
                address,
                Exec::new(program.clone()).args(args.iter().cloned()),
            ),
        };
        Ok(device)
    }
}
