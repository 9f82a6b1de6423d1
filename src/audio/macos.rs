// macOS audio backend using osascript
// The system "volume settings" expose output mute and a 0-100 output volume

use super::{AudioBackend, AudioError};
use std::process::Command;

pub struct SystemBackend;

impl AudioBackend for SystemBackend {
    fn read_mute(&self) -> Result<bool, AudioError> {
        let out = run_osascript("output muted of (get volume settings)")
            .map_err(AudioError::MuteRead)?;
        match out.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(AudioError::MuteRead(format!(
                "unexpected osascript output: {other:?}"
            ))),
        }
    }

    fn write_mute(&self, mute: bool) -> Result<(), AudioError> {
        run_osascript(&format!("set volume output muted {mute}"))
            .map(|_| ())
            .map_err(AudioError::MuteWrite)
    }

    fn write_volume(&self, scalar: f32) -> Result<(), AudioError> {
        let percent = (scalar * 100.0).round() as i32;
        run_osascript(&format!("set volume output volume {percent}"))
            .map(|_| ())
            .map_err(AudioError::VolumeWrite)
    }
}

fn run_osascript(script: &str) -> Result<String, String> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| format!("failed to run osascript: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("osascript exited with {}: {}", output.status, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
