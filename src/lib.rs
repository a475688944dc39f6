#![warn(clippy::all)]

//! Decide which devices may wake the machine from sleep, then suspend it.
//!
//! The [`WakeEngine`] owns the device universe discovered at startup and talks to the OS only
//! through a [`CommandExecutor`], so every decision it makes can be observed with a fake.

pub mod config;
mod device;
mod engine;
mod executor;
mod policy;
mod powercfg;

pub use config::Config;
pub use device::{parse_device_list, ArmedSet, DeviceSet, ProtectedDevices};
pub use engine::{list_wake_programmable_devices, Diagnostics, WakeEngine};
pub use executor::{CommandExecutor, CommandOutput, ShellExecutor, NOT_STARTED};
pub use policy::{choose, ApplyReport, Choice, Outcome, Policy, Response, Skipped, SkipReason};
pub use powercfg::PowerCfg;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("unable to read config file {path}: {source}")]
  ConfigRead {
    path: std::path::PathBuf,
    source: std::io::Error,
  },
  #[error("invalid config file {path}: {source}")]
  ConfigParse {
    path: std::path::PathBuf,
    source: toml::de::Error,
  },
  #[error("unable to read selection: {0}")]
  Input(#[from] std::io::Error),
}
