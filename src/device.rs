use std::collections::HashSet;

/// Splits raw utility output into device names.
///
/// Lines are trimmed and blank lines dropped. Names that differ only by case collapse onto the
/// first spelling seen, and first-seen order is kept.
pub fn parse_device_list(output: &str) -> Vec<String> {
  let mut seen = HashSet::new();
  output
    .split(['\r', '\n'])
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .filter(|line| seen.insert(fold(line)))
    .map(str::to_owned)
    .collect()
}

// case-insensitive comparison key
fn fold(name: &str) -> String {
  name.to_lowercase()
}

/// The ordered universe of wake-programmable devices for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSet {
  names: Vec<String>,
}

impl DeviceSet {
  pub fn parse(output: &str) -> Self {
    Self {
      names: parse_device_list(output),
    }
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }

  /// Looks up a device by the 1-based index shown to the operator.
  pub fn get(&self, index: usize) -> Option<&str> {
    index
      .checked_sub(1)
      .and_then(|i| self.names.get(i))
      .map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    let key = fold(name.trim());
    self.names.iter().any(|n| fold(n) == key)
  }
}

impl<S: AsRef<str>> FromIterator<S> for DeviceSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let mut seen = HashSet::new();
    let names = iter
      .into_iter()
      .map(|s| s.as_ref().trim().to_owned())
      .filter(|s| !s.is_empty() && seen.insert(fold(s)))
      .collect();
    Self { names }
  }
}

/// Snapshot of the devices currently allowed to wake the machine.
#[derive(Debug, Clone, Default)]
pub struct ArmedSet {
  names: Vec<String>,
  keys: HashSet<String>,
}

impl ArmedSet {
  pub fn parse(output: &str) -> Self {
    let names = parse_device_list(output);
    let keys = names.iter().map(|n| fold(n)).collect();
    Self { names, keys }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.keys.contains(&fold(name.trim()))
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Names in the order the utility reported them.
  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }

  pub fn intersects(&self, universe: &DeviceSet) -> bool {
    universe.iter().any(|d| self.contains(d))
  }
}

/// Markers identifying input devices that keep their wake permission during a bulk disable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedDevices {
  markers: Vec<String>,
}

impl ProtectedDevices {
  pub const DEFAULT_MARKER: &'static str = "Microsoft Ergonomic";

  pub fn new<I, S>(markers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let markers = markers
      .into_iter()
      .map(|m| fold(m.as_ref().trim()))
      .filter(|m| !m.is_empty())
      .collect();
    Self { markers }
  }

  /// Protects nothing.
  pub fn none() -> Self {
    Self {
      markers: Vec::new(),
    }
  }

  pub fn is_protected(&self, name: &str) -> bool {
    let name = fold(name);
    self.markers.iter().any(|m| name.contains(m.as_str()))
  }
}

impl Default for ProtectedDevices {
  fn default() -> Self {
    Self::new([Self::DEFAULT_MARKER])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn dedup_keeps_first_spelling_and_order() {
    let parsed = parse_device_list("DeviceA\ndevicea\nDeviceB\n");
    assert_eq!(parsed, vec!["DeviceA", "DeviceB"]);
  }

  #[test]
  fn crlf_and_padding_are_stripped() {
    let parsed = parse_device_list("  HID Keyboard Device \r\n\r\n\tIntel(R) Ethernet\r\n   \r\n");
    assert_eq!(parsed, vec!["HID Keyboard Device", "Intel(R) Ethernet"]);
  }

  #[test]
  fn blank_output_parses_to_nothing() {
    assert!(parse_device_list("").is_empty());
    assert!(parse_device_list(" \r\n \n\t").is_empty());
  }

  #[test]
  fn one_based_lookup() {
    let devices: DeviceSet = ["Mouse1", "Mouse2"].into_iter().collect();
    assert_eq!(devices.get(0), None);
    assert_eq!(devices.get(1), Some("Mouse1"));
    assert_eq!(devices.get(2), Some("Mouse2"));
    assert_eq!(devices.get(3), None);
  }

  #[test]
  fn collected_sets_are_deduplicated() {
    let devices: DeviceSet = ["X", " x ", "Y", ""].into_iter().collect();
    assert_eq!(devices.iter().collect::<Vec<_>>(), vec!["X", "Y"]);
    assert!(devices.contains("y"));
  }

  #[test]
  fn armed_set_intersects_case_insensitively() {
    let universe: DeviceSet = ["X", "Y"].into_iter().collect();
    assert!(ArmedSet::parse("y\n").intersects(&universe));
    assert!(!ArmedSet::parse("Z\n").intersects(&universe));
    assert!(!ArmedSet::parse("").intersects(&universe));
  }

  #[test]
  fn default_marker_matches_substring_in_any_case() {
    let protected = ProtectedDevices::default();
    assert!(protected.is_protected("Kbd (Microsoft Ergonomic)"));
    assert!(protected.is_protected("MICROSOFT ERGONOMIC KEYBOARD"));
    assert!(!protected.is_protected("Mouse1"));
  }

  #[test]
  fn custom_markers_replace_the_default() {
    let protected = ProtectedDevices::new(["logitech", ""]);
    assert!(protected.is_protected("Logitech USB Receiver"));
    assert!(!protected.is_protected("Kbd (Microsoft Ergonomic)"));
    assert!(!ProtectedDevices::none().is_protected("Kbd (Microsoft Ergonomic)"));
  }

  #[test]
  fn blank_markers_protect_nothing() {
    let protected = ProtectedDevices::new([" ", "\t"]);
    assert_eq!(protected, ProtectedDevices::none());
    assert!(!protected.is_protected("Mouse Two"));
    assert!(ProtectedDevices::new([" Ergonomic "]).is_protected("Microsoft Ergonomic Keyboard"));
  }

  proptest! {
    #[test]
    fn parsing_is_idempotent(lines in prop::collection::vec("[ a-cA-C\t]{0,6}", 0..12)) {
      let raw = lines.join("\r\n");
      let once = parse_device_list(&raw);
      let twice = parse_device_list(&once.join("\n"));
      prop_assert_eq!(once, twice);
    }
  }
}
