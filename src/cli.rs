// Command dispatch: argument handling, status output, exit codes

use crate::audio::AudioBackend;
use crate::controller::VolumeControl;
use std::io::Write;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dispatch one invocation against the process's stdout/stderr.
///
/// Returns the process exit code: 0 on success, 1 when the platform
/// operation failed.
pub fn run<B: AudioBackend>(args: &[String], control: &VolumeControl<B>) -> u8 {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    dispatch(args, control, &mut stdout.lock(), &mut stderr.lock())
}

/// Dispatch one invocation, writing status lines to `out` and failure
/// lines to `err`. Arguments past the first are ignored.
fn dispatch<B: AudioBackend>(
    args: &[String],
    control: &VolumeControl<B>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> u8 {
    let arg = match args.first() {
        None => return toggle_mute(control, out, err),
        Some(arg) => arg,
    };

    if is_help_flag(arg) {
        print_usage(out);
        return 0;
    }

    set_volume(control, arg, out, err)
}

fn toggle_mute<B: AudioBackend>(
    control: &VolumeControl<B>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> u8 {
    if control.toggle_mute() {
        let _ = writeln!(out, "Volume mute toggled successfully.");
        0
    } else {
        let _ = writeln!(err, "Failed to toggle volume mute.");
        1
    }
}

fn set_volume<B: AudioBackend>(
    control: &VolumeControl<B>,
    arg: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> u8 {
    // A muted device is unmuted first so the new level is audible
    if control.is_muted() {
        if !control.toggle_mute() {
            let _ = writeln!(err, "Failed to unmute volume.");
            return 1;
        }
        let _ = writeln!(out, "Volume unmuted.");
    }

    let percent = parse_percent(arg);
    if control.set_volume(percent) {
        // The requested value is echoed, not the clamped one
        let _ = writeln!(out, "Volume set to {percent}%");
        0
    } else {
        let _ = writeln!(err, "Failed to set volume.");
        1
    }
}

fn is_help_flag(arg: &str) -> bool {
    matches!(arg, "/?" | "-h" | "--help")
}

fn print_usage(out: &mut dyn Write) {
    let _ = writeln!(out, "volctl (v{VERSION}) - command line volume control");
    let _ = writeln!(out);
    let _ = writeln!(out, "Usage:");
    let _ = writeln!(out, "  volctl          toggle mute on the default output device");
    let _ = writeln!(
        out,
        "  volctl <N>      unmute if muted, then set volume to N percent (0-100)"
    );
    let _ = writeln!(out, "  volctl -h       show this help (also /? and --help)");
}

/// Best-effort numeric parse with C `atoi` semantics: leading whitespace
/// is skipped, an optional sign and the longest digit prefix are taken,
/// and anything unparsable yields 0.
pub fn parse_percent(arg: &str) -> i32 {
    let trimmed = arg.trim_start();
    let mut digits_end = 0;
    for (i, c) in trimmed.char_indices() {
        if i == 0 && (c == '+' || c == '-') {
            digits_end = 1;
            continue;
        }
        if c.is_ascii_digit() {
            digits_end = i + 1;
        } else {
            break;
        }
    }

    let mut value: i64 = 0;
    let prefix = &trimmed[..digits_end];
    let (negative, digits) = match prefix.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, prefix.strip_prefix('+').unwrap_or(prefix)),
    };
    for c in digits.bytes() {
        value = value
            .saturating_mul(10)
            .saturating_add((c - b'0') as i64);
    }
    if negative {
        value = -value;
    }

    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
