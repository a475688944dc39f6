use crate::DeviceSet;

/// The bulk action the operator picked for this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
  /// Arm every device. Never sleeps.
  EnableAll,
  /// Disarm every device except protected input devices, then sleep.
  DisableAll,
  /// Disarm every device except the one picked by its 1-based menu index, then sleep.
  DisableAllExcept { index: usize, device: String },
  /// Sleep with the current wake settings.
  NoChangeSleepNow,
}

impl Policy {
  pub fn suspends(&self) -> bool {
    !matches!(self, Policy::EnableAll)
  }
}

/// What a line of operator input maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
  Apply(Policy),
  Abort,
  Invalid(String),
}

/// Maps one line of menu input onto a [`Policy`].
///
/// Accepts `E`, `D` or `S` in either case, or a device number as shown in the menu. Blank input
/// aborts.
pub fn choose(input: &str, devices: &DeviceSet) -> Choice {
  let input = input.trim();
  if input.is_empty() {
    return Choice::Abort;
  }

  match input.to_ascii_uppercase().as_str() {
    "E" => Choice::Apply(Policy::EnableAll),
    "D" => Choice::Apply(Policy::DisableAll),
    "S" => Choice::Apply(Policy::NoChangeSleepNow),
    _ => match input.parse::<usize>().ok().and_then(|index| {
      devices.get(index).map(|device| Policy::DisableAllExcept {
        index,
        device: device.to_owned(),
      })
    }) {
      Some(policy) => Choice::Apply(policy),
      None => Choice::Invalid(input.to_owned()),
    },
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Matched a protected-device marker.
  Protected,
  /// The device the operator chose to keep armed.
  Survivor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
  pub device: String,
  pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Device commands were issued and the machine stays awake.
  Applied,
  /// The suspend command was issued. The caller is expected to end the process.
  SuspendTriggered,
}

/// Everything a policy sweep did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
  pub outcome: Outcome,
  /// Devices that were sent an enable or disable command, in order.
  pub commanded: Vec<String>,
  pub skipped: Vec<Skipped>,
  /// Devices whose command exited non-zero. The sweep carried on regardless.
  pub failed: Vec<(String, i32)>,
}

impl ApplyReport {
  pub(crate) fn new() -> Self {
    Self {
      outcome: Outcome::Applied,
      commanded: Vec::new(),
      skipped: Vec::new(),
      failed: Vec::new(),
    }
  }
}

/// The result of handling one line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
  Aborted,
  Rejected(String),
  Applied(ApplyReport),
}

#[cfg(test)]
mod tests {
  use super::*;

  fn devices() -> DeviceSet {
    ["Mouse1", "Mouse2", "Mouse3"].into_iter().collect()
  }

  #[test]
  fn letters_in_either_case() {
    assert_eq!(choose("e", &devices()), Choice::Apply(Policy::EnableAll));
    assert_eq!(choose(" D ", &devices()), Choice::Apply(Policy::DisableAll));
    assert_eq!(choose("s", &devices()), Choice::Apply(Policy::NoChangeSleepNow));
  }

  #[test]
  fn number_picks_the_survivor() {
    assert_eq!(
      choose("2", &devices()),
      Choice::Apply(Policy::DisableAllExcept {
        index: 2,
        device: "Mouse2".to_owned()
      })
    );
  }

  #[test]
  fn blank_aborts() {
    assert_eq!(choose("", &devices()), Choice::Abort);
    assert_eq!(choose("  \r\n", &devices()), Choice::Abort);
  }

  #[test]
  fn out_of_range_and_garbage_are_invalid() {
    for input in ["0", "4", "-1", "x", "ED", "1.5"] {
      assert_eq!(choose(input, &devices()), Choice::Invalid(input.to_owned()));
    }
  }

  #[test]
  fn only_enable_all_stays_awake() {
    assert!(!Policy::EnableAll.suspends());
    assert!(Policy::DisableAll.suspends());
    assert!(Policy::NoChangeSleepNow.suspends());
  }
}
