use std::process::{Command, Stdio};

use tracing::{trace, warn};

/// Exit code reported when a command could not be started, or ended without one.
pub const NOT_STARTED: i32 = -1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  pub exit_code: i32,
  pub stdout: String,
}

impl CommandOutput {
  pub fn not_started() -> Self {
    Self {
      exit_code: NOT_STARTED,
      stdout: String::new(),
    }
  }
}

/// Runs a system command line to completion.
///
/// Implementations never fail: anything that goes wrong while launching the command is reported
/// through [`NOT_STARTED`] and empty output so callers can treat it like a failed command.
pub trait CommandExecutor {
  /// Runs `command_line` without capturing its output and returns the exit code.
  fn run(&self, command_line: &str) -> i32;

  /// Runs `command_line`, blocking until it exits, and captures its stdout.
  fn run_with_output(&self, command_line: &str) -> CommandOutput;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
  fn run(&self, command_line: &str) -> i32 {
    (**self).run(command_line)
  }

  fn run_with_output(&self, command_line: &str) -> CommandOutput {
    (**self).run_with_output(command_line)
  }
}

/// Hands command lines to the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
  fn command(command_line: &str) -> Command {
    #[cfg(windows)]
    let mut command = {
      use std::os::windows::process::CommandExt;
      // cmd.exe does its own quote parsing, so the line must reach it unescaped
      let mut command = Command::new("cmd.exe");
      command.arg("/c").raw_arg(command_line);
      command
    };
    #[cfg(not(windows))]
    let mut command = {
      let mut command = Command::new("sh");
      command.arg("-c").arg(command_line);
      command
    };
    command.stdin(Stdio::null());
    command
  }
}

impl CommandExecutor for ShellExecutor {
  fn run(&self, command_line: &str) -> i32 {
    match Self::command(command_line).status() {
      Ok(status) => status.code().unwrap_or(NOT_STARTED),
      Err(err) => {
        warn!("unable to start `{}`: {}", command_line, err);
        NOT_STARTED
      }
    }
  }

  fn run_with_output(&self, command_line: &str) -> CommandOutput {
    let output = Self::command(command_line)
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .output();
    match output {
      Ok(output) => {
        trace!(
          "`{}` exited with {:?}, {} bytes of output",
          command_line,
          output.status.code(),
          output.stdout.len()
        );
        CommandOutput {
          exit_code: output.status.code().unwrap_or(NOT_STARTED),
          stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        }
      }
      Err(err) => {
        warn!("unable to start `{}`: {}", command_line, err);
        CommandOutput::not_started()
      }
    }
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  #[test]
  fn captures_stdout_and_exit_code() {
    let output = ShellExecutor.run_with_output("printf 'a\\nb\\n'; exit 3");
    assert_eq!(output.exit_code, 3);
    assert_eq!(output.stdout, "a\nb\n");
  }

  #[test]
  fn run_reports_exit_code() {
    assert_eq!(ShellExecutor.run("exit 0"), 0);
    assert_eq!(ShellExecutor.run("exit 7"), 7);
  }

  #[test]
  fn killed_process_reports_not_started() {
    assert_eq!(ShellExecutor.run("kill -9 $$"), NOT_STARTED);

    let output = ShellExecutor.run_with_output("kill -9 $$");
    assert_eq!(output, CommandOutput::not_started());
  }
}
