//! On-disk configuration.
//!
//! Lives in `<config dir>/wakeguard/config.toml` unless a path is given on the command line. Every
//! field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, PowerCfg, ProtectedDevices};

const CONFIG_DIR: &str = "wakeguard";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub protection: ProtectionConfig,
  pub commands: CommandsConfig,
  pub log: LogConfig,
}

/// Devices that keep their wake permission when everything is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
  /// Case-insensitive substrings of device names.
  pub markers: Vec<String>,
}

impl ProtectionConfig {
  pub fn protected_devices(&self) -> ProtectedDevices {
    ProtectedDevices::new(&self.markers)
  }
}

impl Default for ProtectionConfig {
  fn default() -> Self {
    Self {
      markers: vec![ProtectedDevices::DEFAULT_MARKER.to_owned()],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
  pub utility: String,
  pub suspend: String,
}

impl CommandsConfig {
  pub fn power_cfg(&self) -> PowerCfg {
    PowerCfg::new(&self.utility, &self.suspend)
  }
}

impl Default for CommandsConfig {
  fn default() -> Self {
    Self {
      utility: PowerCfg::UTILITY.to_owned(),
      suspend: PowerCfg::SUSPEND.to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Any `tracing` filter directive, e.g. `warn` or `wakeguard=debug`.
  pub level: String,
}

impl LogConfig {
  /// Picks the filter directive: `env` (usually `RUST_LOG`) wins, then the `-v` count, then the
  /// configured level.
  pub fn directive(&self, env: Option<&str>, verbose: u8) -> String {
    match (env.map(str::trim).filter(|e| !e.is_empty()), verbose) {
      (Some(env), _) => env.to_owned(),
      (None, 0) => self.level.clone(),
      (None, 1) => "debug".to_owned(),
      (None, _) => "trace".to_owned(),
    }
  }
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "warn".to_owned(),
    }
  }
}

impl Config {
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
  }

  /// The file [`Config::load`] reads: `path` itself, or the default location if a file exists
  /// there.
  pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    match path {
      Some(path) => Some(path.to_owned()),
      None => Self::default_path().filter(|path| path.exists()),
    }
  }

  /// Loads `path`, or the default location when `None`.
  ///
  /// A missing file at the default location yields the defaults. A missing explicit path is an
  /// error.
  pub fn load(path: Option<&Path>) -> Result<Self, Error> {
    match Self::resolve_path(path) {
      Some(path) => Self::from_file(&path),
      None => Ok(Self::default()),
    }
  }

  pub fn from_file(path: &Path) -> Result<Self, Error> {
    let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
      path: path.to_owned(),
      source,
    })?;
    let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
      path: path.to_owned(),
      source,
    })?;
    Ok(config)
  }
}
