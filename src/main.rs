#![forbid(unsafe_code)]
#![warn(clippy::all)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use wakeguard::{
  ApplyReport, Config, Outcome, Policy, Response, ShellExecutor, SkipReason, WakeEngine,
};

// time to read the last message before the console window closes
const PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(name = "wakeguard", version)]
#[command(about = "Choose which devices may wake this machine, then put it to sleep")]
struct Cli {
  /// Configuration file (defaults to <config dir>/wakeguard/config.toml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Answer the menu without prompting: E, D, S or a device number
  #[arg(short, long)]
  select: Option<String>,

  /// Log more (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn init_logging(cli: &Cli, config: &Config) {
  let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
  let directive = config.log.directive(env.as_deref(), cli.verbose);
  let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let config = match Config::load(cli.config.as_deref()) {
    Ok(config) => config,
    Err(err) => {
      eprintln!("Error: {}", err);
      return ExitCode::FAILURE;
    }
  };
  init_logging(&cli, &config);
  match Config::resolve_path(cli.config.as_deref()) {
    Some(path) => debug!("loaded config from {}", path.display()),
    None => debug!("no config file, using defaults"),
  }

  match run(&cli, &config) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      error!("{}", err);
      eprintln!("Error: {}", err);
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli, config: &Config) -> Result<(), wakeguard::Error> {
  println!("wakeguard");

  let engine = WakeEngine::discover(ShellExecutor, config);
  if engine.devices().is_empty() {
    println!("No wake-capable devices were found.");
    return Ok(());
  }

  println!();
  println!("{}", engine.troubleshooting_info());
  println!();

  println!("Currently wake-enabled devices:");
  let armed = engine.armed_devices();
  for device in armed.iter() {
    println!(" - {}", device);
  }
  if !armed.intersects(engine.devices()) {
    println!("None of the wake-programmable devices is armed. Nothing to do.");
    return Ok(());
  }

  println!();
  println!("Wake-programmable devices:");
  for (i, device) in engine.devices().iter().enumerate() {
    println!("{}. - {}", i + 1, device);
  }
  print_menu();

  let input = match &cli.select {
    Some(select) => {
      println!("{}", select);
      select.clone()
    }
    None => read_line()?,
  };
  debug!("selection {:?}", input);

  match engine.respond(&input, announce) {
    Response::Aborted => println!("Aborting..."),
    Response::Rejected(input) => println!("Invalid selection '{}'. Aborting...", input),
    Response::Applied(report) => {
      print_report(&report);
      if report.outcome == Outcome::SuspendTriggered {
        // the machine has been asked to sleep; nothing left for this process to do
        std::process::exit(0);
      }
    }
  }
  thread::sleep(PAUSE);
  Ok(())
}

fn print_menu() {
  println!();
  println!("Options:");
  println!("  E - ENABLE wake for all devices (no sleep)");
  println!("  D - DISABLE wake for all devices, then Sleep");
  println!("  S - Sleep NOW with current wake settings (no changes)");
  println!("  n - Leave only device #n enabled, disable the rest, then Sleep");
  println!("  Enter with no input to abort");
  print!("Selection [E/D/S/n]: ");
  // a failed flush only loses the prompt
  let _ = io::stdout().flush();
}

fn read_line() -> Result<String, wakeguard::Error> {
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line)
}

fn print_report(report: &ApplyReport) {
  for skipped in &report.skipped {
    match skipped.reason {
      SkipReason::Protected => println!(
        "The following device is protected and will remain armed to awaken the machine:\n {}",
        skipped.device
      ),
      SkipReason::Survivor => println!(
        "The following device will remain armed to awaken the machine:\n {}",
        skipped.device
      ),
    }
  }
  for (device, code) in &report.failed {
    println!("Could not change wake setting for {} (exit code {})", device, code);
  }
  match report.outcome {
    Outcome::SuspendTriggered => println!("Putting the machine to sleep..."),
    Outcome::Applied => println!("Wake permissions updated for {} devices.", report.commanded.len()),
  }
}

fn announce(policy: &Policy) {
  match policy {
    Policy::EnableAll => println!("Enabling wake permissions for all devices..."),
    Policy::DisableAll => println!("Disabling wake permissions for devices..."),
    Policy::DisableAllExcept { index, device } => println!(
      "Disabling wake permissions for devices except #{}. {}",
      index, device
    ),
    Policy::NoChangeSleepNow => {
      println!("Sleeping now with current wake-enabled devices (no changes)...")
    }
  }
}
