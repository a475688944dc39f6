use std::fmt;

use tracing::{debug, info, warn};

use crate::{
  choose, ApplyReport, ArmedSet, Choice, CommandExecutor, Config, DeviceSet, Outcome, Policy,
  PowerCfg, ProtectedDevices, Response, SkipReason, Skipped,
};

/// Lists the devices that can be programmed to wake the machine.
///
/// When the utility reports none, the currently armed devices are used instead. An empty set means
/// there is nothing to manage.
pub fn list_wake_programmable_devices<E>(executor: &E, commands: &PowerCfg) -> DeviceSet
where
  E: CommandExecutor + ?Sized,
{
  let output = executor.run_with_output(&commands.query_wake_programmable());
  let devices = DeviceSet::parse(&output.stdout);
  if !devices.is_empty() {
    debug!("{} wake-programmable devices", devices.len());
    return devices;
  }

  debug!("no wake-programmable devices reported, falling back to armed devices");
  let output = executor.run_with_output(&commands.query_wake_armed());
  DeviceSet::parse(&output.stdout)
}

pub struct WakeEngine<E> {
  devices: DeviceSet,
  executor: E,
  commands: PowerCfg,
  protected: ProtectedDevices,
}

impl<E: CommandExecutor> WakeEngine<E> {
  pub fn new(
    devices: DeviceSet,
    executor: E,
    commands: PowerCfg,
    protected: ProtectedDevices,
  ) -> Self {
    Self {
      devices,
      executor,
      commands,
      protected,
    }
  }

  /// Enumerates the device universe and builds an engine over it.
  pub fn discover(executor: E, config: &Config) -> Self {
    let commands = config.commands.power_cfg();
    let devices = list_wake_programmable_devices(&executor, &commands);
    Self::new(devices, executor, commands, config.protection.protected_devices())
  }

  pub fn devices(&self) -> &DeviceSet {
    &self.devices
  }

  pub fn executor(&self) -> &E {
    &self.executor
  }

  /// Asks the OS which devices may wake the machine right now.
  pub fn armed_devices(&self) -> ArmedSet {
    let output = self
      .executor
      .run_with_output(&self.commands.query_wake_armed());
    ArmedSet::parse(&output.stdout)
  }

  pub fn any_wake_enabled(&self) -> bool {
    self.armed_devices().intersects(&self.devices)
  }

  pub fn troubleshooting_info(&self) -> Diagnostics {
    let last_wake = self.executor.run_with_output(&self.commands.last_wake());
    let wake_timers = self.executor.run_with_output(&self.commands.wake_timers());
    Diagnostics {
      last_wake: or_placeholder(&last_wake.stdout, Diagnostics::NO_OUTPUT),
      wake_timers: or_placeholder(&wake_timers.stdout, Diagnostics::NO_WAKE_TIMERS),
    }
  }

  /// Handles one line of menu input. Aborted and rejected input issue no commands.
  ///
  /// `announce` sees the chosen policy before any command is issued for it.
  pub fn respond<F>(&self, input: &str, announce: F) -> Response
  where
    F: FnOnce(&Policy),
  {
    match choose(input, &self.devices) {
      Choice::Abort => Response::Aborted,
      Choice::Invalid(input) => Response::Rejected(input),
      Choice::Apply(policy) => {
        announce(&policy);
        Response::Applied(self.apply(&policy))
      }
    }
  }

  /// Applies `policy` to every device in the universe, then suspends unless enabling.
  ///
  /// Each device gets one command. A command that fails is recorded and the sweep continues.
  pub fn apply(&self, policy: &Policy) -> ApplyReport {
    let mut report = ApplyReport::new();

    match policy {
      Policy::EnableAll => {
        for device in self.devices.iter() {
          self.toggle(device, true, &mut report);
        }
      }
      Policy::DisableAll => {
        for device in self.devices.iter() {
          if self.protected.is_protected(device) {
            info!("{} is protected and stays armed", device);
            report.skipped.push(Skipped {
              device: device.to_owned(),
              reason: SkipReason::Protected,
            });
            continue;
          }
          self.toggle(device, false, &mut report);
        }
      }
      Policy::DisableAllExcept { device: survivor, .. } => {
        let survivor = survivor.to_lowercase();
        for device in self.devices.iter() {
          if device.to_lowercase() == survivor {
            info!("{} stays armed", device);
            report.skipped.push(Skipped {
              device: device.to_owned(),
              reason: SkipReason::Survivor,
            });
            continue;
          }
          self.toggle(device, false, &mut report);
        }
      }
      Policy::NoChangeSleepNow => {}
    }

    if policy.suspends() {
      self.suspend();
      report.outcome = Outcome::SuspendTriggered;
    }
    report
  }

  fn toggle(&self, device: &str, enable: bool, report: &mut ApplyReport) {
    let command = if enable {
      self.commands.enable_wake(device)
    } else {
      self.commands.disable_wake(device)
    };
    debug!("{}", command);
    let code = self.executor.run(&command);
    if code != 0 {
      warn!("`{}` exited with {}", command, code);
      report.failed.push((device.to_owned(), code));
    }
    report.commanded.push(device.to_owned());
  }

  fn suspend(&self) {
    info!("suspending");
    let code = self.executor.run(self.commands.suspend());
    if code != 0 {
      warn!("suspend command exited with {}", code);
    }
  }
}

fn or_placeholder(output: &str, placeholder: &str) -> String {
  if output.trim().is_empty() {
    placeholder.to_owned()
  } else {
    output.trim_end().to_owned()
  }
}

/// Why the machine last woke up and what may wake it next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
  pub last_wake: String,
  pub wake_timers: String,
}

impl Diagnostics {
  pub const NO_OUTPUT: &'static str = "(no output)";
  pub const NO_WAKE_TIMERS: &'static str = "(no wake timers)";
}

impl fmt::Display for Diagnostics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "--- Troubleshooting ---")?;
    writeln!(f, "powercfg /lastwake:")?;
    writeln!(f, "{}", self.last_wake)?;
    writeln!(f)?;
    writeln!(f, "powercfg /waketimers:")?;
    writeln!(f, "{}", self.wake_timers)?;
    write!(f, "-----------------------")
  }
}
