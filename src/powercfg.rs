/// Builds the command lines understood by the power configuration utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCfg {
  utility: String,
  suspend: String,
}

impl PowerCfg {
  pub const UTILITY: &'static str = "powercfg";
  pub const SUSPEND: &'static str = "rundll32.exe powrprof.dll,SetSuspendState 0,1,0";

  pub fn new(utility: impl Into<String>, suspend: impl Into<String>) -> Self {
    Self {
      utility: utility.into(),
      suspend: suspend.into(),
    }
  }

  pub fn query_wake_programmable(&self) -> String {
    format!("{} -devicequery wake_programmable", self.utility)
  }

  pub fn query_wake_armed(&self) -> String {
    format!("{} -devicequery wake_armed", self.utility)
  }

  pub fn enable_wake(&self, device: &str) -> String {
    format!("{} -deviceenablewake {}", self.utility, quote(device))
  }

  pub fn disable_wake(&self, device: &str) -> String {
    format!("{} -devicedisablewake {}", self.utility, quote(device))
  }

  pub fn last_wake(&self) -> String {
    format!("{} /lastwake", self.utility)
  }

  pub fn wake_timers(&self) -> String {
    format!("{} /waketimers", self.utility)
  }

  /// Fire-and-forget; control is not expected back once the machine sleeps.
  pub fn suspend(&self) -> &str {
    &self.suspend
  }
}

impl Default for PowerCfg {
  fn default() -> Self {
    Self::new(Self::UTILITY, Self::SUSPEND)
  }
}

// Device names come from utility output and end up inside a shell command line.
#[cfg(windows)]
fn quote(device: &str) -> String {
  format!("\"{}\"", device)
}

#[cfg(not(windows))]
fn quote(device: &str) -> String {
  let mut quoted = String::with_capacity(device.len() + 2);
  quoted.push('"');
  for c in device.chars() {
    if matches!(c, '"' | '\\' | '$' | '`') {
      quoted.push('\\');
    }
    quoted.push(c);
  }
  quoted.push('"');
  quoted
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_command_lines() {
    let cfg = PowerCfg::default();
    assert_eq!(cfg.query_wake_programmable(), "powercfg -devicequery wake_programmable");
    assert_eq!(cfg.query_wake_armed(), "powercfg -devicequery wake_armed");
    assert_eq!(
      cfg.disable_wake("HID Keyboard Device"),
      "powercfg -devicedisablewake \"HID Keyboard Device\""
    );
    assert_eq!(cfg.enable_wake("Mouse1"), "powercfg -deviceenablewake \"Mouse1\"");
    assert_eq!(cfg.last_wake(), "powercfg /lastwake");
    assert_eq!(cfg.wake_timers(), "powercfg /waketimers");
    assert_eq!(cfg.suspend(), "rundll32.exe powrprof.dll,SetSuspendState 0,1,0");
  }

  #[cfg(unix)]
  #[test]
  fn shell_expansions_in_device_names_are_escaped() {
    let cfg = PowerCfg::default();
    assert_eq!(
      cfg.disable_wake("a$(reboot)`id`\"b\\"),
      "powercfg -devicedisablewake \"a\\$(reboot)\\`id\\`\\\"b\\\\\""
    );
  }
}
