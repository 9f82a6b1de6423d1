mod audio;
mod cli;
mod controller;

use std::env;
use std::process::ExitCode;

use controller::VolumeControl;

fn main() -> ExitCode {
    // Diagnostics are opt-in via RUST_LOG; the normal surface stays at
    // one status line per invocation
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let control = VolumeControl::new(audio::platform::SystemBackend);

    ExitCode::from(cli::run(&args, &control))
}
